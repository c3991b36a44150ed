//! Code points and byte ↔ code-point codecs (C2, C3).

mod code_point;
mod codec;

pub use code_point::{CodePoint, MAX_CODE_POINT};
pub use codec::{lookup_codec, Ascii, Codec, Ms1252, Utf8};
