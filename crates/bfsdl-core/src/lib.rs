//! Bit-addressable data model for BFSDL: bit math, buffers, streams,
//! digit streams, flexible numbers, string building, and byte codecs.
//!
//! This crate covers components C1 through C8 of the BFSDL core: the
//! pieces that do not depend on a finite state machine or a byte source.
//! See `bfsdl-lexer` for the tokenizer built on top of it.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

pub mod bitmanip;
pub mod data;
pub mod error;
pub mod unicode;

/// Re-exports of the types most crates consuming `bfsdl-core` will reach
/// for.
pub mod prelude {
    pub use crate::bitmanip::{BitBuffer, BitStream, DigitStream};
    pub use crate::data::{Component, FlexNumber, Sign, StringMachine};
    pub use crate::error::{BfsdlCoreError, CoreResult, Severity};
    pub use crate::unicode::{lookup_codec, Ascii, Codec, CodePoint, Ms1252, Utf8};
}
