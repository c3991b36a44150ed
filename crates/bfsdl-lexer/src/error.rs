//! Unified error type for `bfsdl-lexer`.
//!
//! Mirrors `bfsdl_core::error`'s three-severity taxonomy (internal,
//! misuse, run-time), routed through the `log` facade under the `trace`
//! feature instead of a mutable global error-reporter hook.

use core::fmt;

/// Failures raised by the symbolizer, literal sub-parsers, tokenizer,
/// stream reader, and numeric value builder. Under the `diagnostics`
/// feature this derives [`thiserror::Error`]; without it, a hand-rolled
/// `Display` below covers builds that don't pull in `thiserror`.
#[cfg_attr(feature = "diagnostics", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Run-time: the byte codec reported a malformed multi-byte sequence.
    #[cfg_attr(feature = "diagnostics", error("invalid multi-byte sequence at offset {offset}"))]
    InvalidByteSequence {
        /// Byte offset, relative to the call that detected it, where the
        /// failure occurred.
        offset: usize,
    },
    /// Run-time: a multi-byte sequence was still incomplete at the end of
    /// the supplied bytes, and the caller indicated no more bytes follow.
    #[cfg_attr(
        feature = "diagnostics",
        error("incomplete multi-byte sequence at offset {offset}")
    )]
    IncompleteByteSequence {
        /// Byte offset where the incomplete sequence began.
        offset: usize,
    },
    /// Run-time: a symbol run exceeded the tokenizer's fixed-capacity
    /// symbol buffer.
    #[cfg_attr(feature = "diagnostics", error("symbol exceeds the tokenizer's buffer capacity"))]
    SymbolTooBig,
    /// Run-time: a numeric literal redefined its radix, sign, or period,
    /// or closed without a defined significand.
    #[cfg_attr(feature = "diagnostics", error("malformed numeric literal: {detail}"))]
    MalformedNumericLiteral {
        /// Human-readable detail.
        detail: &'static str,
    },
    /// Run-time: a string literal escape was malformed (bad digit count,
    /// invalid digit, or unrepresentable code point).
    #[cfg_attr(feature = "diagnostics", error("malformed string escape: {detail}"))]
    MalformedEscape {
        /// Human-readable detail.
        detail: &'static str,
    },
    /// Run-time: whitespace or an unexpected symbol appeared where the
    /// tokenizer's grammar forbids it.
    #[cfg_attr(feature = "diagnostics", error("unexpected symbol: {detail}"))]
    UnexpectedSymbol {
        /// Human-readable detail.
        detail: &'static str,
    },
    /// Run-time: the input ended with an open numeric or string literal.
    #[cfg_attr(feature = "diagnostics", error("input ended inside an open literal"))]
    UnterminatedLiteral,
    /// Internal: the stream reader's observer reported a position behind
    /// where it started, which can never happen under the windowed-read
    /// contract.
    #[cfg_attr(
        feature = "diagnostics",
        error("stream observer reported a position behind where it started")
    )]
    StreamPositionWentBackward,
    /// Misuse: the stream reader's buffer is too small to hold one chunk
    /// once the unprocessed window is accounted for.
    #[cfg_attr(feature = "diagnostics", error("stream buffer overflow"))]
    StreamBufferOverflow,
    /// Run-time: the stream ended with buffered-but-unread data and the
    /// last control code did not justify stopping.
    #[cfg_attr(feature = "diagnostics", error("stream ended with unread buffered data"))]
    UnreadStreamData,
    /// Run-time: a stream observer returned the `Error` control code.
    #[cfg_attr(feature = "diagnostics", error("stream observer reported an error"))]
    StreamObserverError,
    /// Run-time: the underlying byte source's `read` returned an I/O
    /// error.
    #[cfg_attr(feature = "diagnostics", error("stream source read failed"))]
    StreamSourceFault,
    /// Misuse: `NumericValueBuilder::set_field_properties` received a
    /// shape that cannot hold a valid value (zero total bits, more than
    /// 64 bits, or a signed field with no room for a sign bit).
    #[cfg_attr(feature = "diagnostics", error("invalid numeric field properties"))]
    InvalidFieldProperties,
    /// Misuse: `NumericValueBuilder::parse_bits` was asked for more bits
    /// than remain before the value is complete.
    #[cfg_attr(
        feature = "diagnostics",
        error("parse_bits: n_bits exceeds bits_till_complete")
    )]
    TooManyBitsRequested,
}

#[cfg(not(feature = "diagnostics"))]
impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidByteSequence { offset } => {
                write!(f, "invalid multi-byte sequence at offset {offset}")
            }
            Self::IncompleteByteSequence { offset } => {
                write!(f, "incomplete multi-byte sequence at offset {offset}")
            }
            Self::SymbolTooBig => write!(f, "symbol exceeds the tokenizer's buffer capacity"),
            Self::MalformedNumericLiteral { detail } => {
                write!(f, "malformed numeric literal: {detail}")
            }
            Self::MalformedEscape { detail } => write!(f, "malformed string escape: {detail}"),
            Self::UnexpectedSymbol { detail } => write!(f, "unexpected symbol: {detail}"),
            Self::UnterminatedLiteral => write!(f, "input ended inside an open literal"),
            Self::StreamPositionWentBackward => {
                write!(f, "stream observer reported a position behind where it started")
            }
            Self::StreamBufferOverflow => write!(f, "stream buffer overflow"),
            Self::UnreadStreamData => write!(f, "stream ended with unread buffered data"),
            Self::StreamObserverError => write!(f, "stream observer reported an error"),
            Self::StreamSourceFault => write!(f, "stream source read failed"),
            Self::InvalidFieldProperties => write!(f, "invalid numeric field properties"),
            Self::TooManyBitsRequested => write!(f, "parse_bits: n_bits exceeds bits_till_complete"),
        }
    }
}

#[cfg(all(feature = "std", not(feature = "diagnostics")))]
impl std::error::Error for LexError {}

/// Crate-wide `Result` alias.
pub type LexResult<T> = Result<T, LexError>;

/// Emits `message`, tagged with `module`, through the `log` facade when the
/// `trace` feature is enabled. A no-op otherwise.
pub fn trace(module: &str, message: &str) {
    #[cfg(feature = "trace")]
    log::debug!(target: "bfsdl_lexer", "[{module}] {message}");
    #[cfg(not(feature = "trace"))]
    {
        let _ = (module, message);
    }
}
