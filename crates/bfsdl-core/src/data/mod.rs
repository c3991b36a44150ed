//! Higher-level value types built on the bit-addressable primitives:
//! flexible numbers and the string builder (C7, C8).

mod flex_number;
mod sign;
mod string_machine;

pub use flex_number::{Component, FlexNumber};
pub use sign::Sign;
pub use string_machine::StringMachine;
