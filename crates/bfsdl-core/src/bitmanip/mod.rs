//! Bit-addressable primitives: bit math, buffers, streams, digit streams
//! (C1, C4, C5, C6).

mod bit_buffer;
mod bit_stream;
mod digit_stream;
mod mask;

pub use bit_buffer::BitBuffer;
pub use bit_stream::BitStream;
pub use digit_stream::{DigitIter, DigitStream};
pub use mask::{
    bits_to_bytes, bytes_to_bits, calc_bit_pos, create_mask, extract_bits, replace_bits,
    try_create_mask, UnsignedInt, MAX_BITS, MAX_BYTES,
};
