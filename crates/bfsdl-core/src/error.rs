//! Unified error type for `bfsdl-core`.
//!
//! The original design reports failures through three severities —
//! internal, misuse, and run-time — via a process-wide error-reporter
//! indirection. This port keeps the three-way taxonomy as error variants
//! but routes the same signal through the `log` facade (see
//! [`report`]) instead of a mutable global hook, so the severity travels
//! with the returned value rather than through a side channel.

use core::fmt;

/// Failures raised by the bit-math, buffer, stream, digit-stream, codec,
/// and string-machine operations in this crate.
///
/// Each variant's doc comment notes which of the three original severities
/// it corresponds to. Under the `std` feature this derives
/// [`thiserror::Error`]; without it, a hand-rolled `Display` below covers
/// `no_std` builds, which cannot depend on `thiserror`'s `std::error::Error`
/// bound.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsdlCoreError {
    /// Misuse: a bit-width/offset combination exceeds what the target
    /// integer type or buffer can represent.
    #[cfg_attr(
        feature = "std",
        error("bit range overflow: width {width} at offset {offset} exceeds representable range")
    )]
    BitRangeOverflow {
        /// Requested width in bits.
        width: usize,
        /// Requested offset in bits.
        offset: usize,
    },
    /// Misuse: a `BitBuffer` resize or allocation request could not be
    /// satisfied.
    #[cfg_attr(feature = "std", error("failed to allocate a buffer of {requested_bits} bits"))]
    AllocationFailed {
        /// Bits requested.
        requested_bits: usize,
    },
    /// Misuse: an operation addressed bits outside `0..=data_bits`.
    #[cfg_attr(
        feature = "std",
        error("position {pos_bits} is out of range for a buffer of {data_bits} data bits")
    )]
    OutOfRange {
        /// Position requested.
        pos_bits: usize,
        /// Bits actually available.
        data_bits: usize,
    },
    /// Misuse: a `DigitStream` radix was outside `2..=36`.
    #[cfg_attr(feature = "std", error("invalid radix {radix}, expected 2..=36"))]
    InvalidRadix {
        /// The rejected radix.
        radix: u32,
    },
    /// Run-time: a digit character did not belong to the stream's radix
    /// alphabet.
    #[cfg_attr(feature = "std", error("character '{ch}' is not a valid digit in radix {radix}"))]
    InvalidDigit {
        /// The offending character.
        ch: char,
        /// The radix it was checked against.
        radix: u32,
    },
    /// Misuse: accumulating digits would exceed `u64::MAX`.
    #[cfg_attr(feature = "std", error("digit accumulation overflowed u64"))]
    NumericOverflow,
    /// Run-time: a codec could not decode or encode the given data.
    #[cfg_attr(feature = "std", error("codec '{codec}' failed to convert"))]
    CodecFailure {
        /// Name of the codec that failed.
        codec: &'static str,
    },
    /// Run-time: `StringMachine` could not represent its contents through
    /// the requested codec.
    #[cfg_attr(feature = "std", error("string is not representable in codec '{codec}'"))]
    UnrepresentableString {
        /// Name of the codec that failed.
        codec: &'static str,
    },
}

#[cfg(not(feature = "std"))]
impl fmt::Display for BfsdlCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitRangeOverflow { width, offset } => write!(
                f,
                "bit range overflow: width {width} at offset {offset} exceeds representable range"
            ),
            Self::AllocationFailed { requested_bits } => {
                write!(f, "failed to allocate a buffer of {requested_bits} bits")
            }
            Self::OutOfRange { pos_bits, data_bits } => write!(
                f,
                "position {pos_bits} is out of range for a buffer of {data_bits} data bits"
            ),
            Self::InvalidRadix { radix } => write!(f, "invalid radix {radix}, expected 2..=36"),
            Self::InvalidDigit { ch, radix } => {
                write!(f, "character '{ch}' is not a valid digit in radix {radix}")
            }
            Self::NumericOverflow => write!(f, "digit accumulation overflowed u64"),
            Self::CodecFailure { codec } => write!(f, "codec '{codec}' failed to convert"),
            Self::UnrepresentableString { codec } => {
                write!(f, "string is not representable in codec '{codec}'")
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type CoreResult<T> = Result<T, BfsdlCoreError>;

/// The original three error severities, preserved as a classification for
/// diagnostics routing (see [`report`]) even though Rust callers mostly
/// interact with [`BfsdlCoreError`] directly through `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The component itself violated an invariant it should have upheld.
    Internal,
    /// The caller supplied arguments the API contract forbids.
    Misuse,
    /// Malformed input was encountered; recoverable by the caller.
    RunTime,
}

/// Emits `message`, tagged with `module` and `severity`, through the `log`
/// facade when the `diagnostics` feature is enabled. A no-op otherwise, so
/// call sites can report unconditionally without feature-gating each call.
pub fn report(severity: Severity, module: &str, message: &str) {
    #[cfg(feature = "diagnostics")]
    {
        match severity {
            Severity::Internal => log::error!(target: "bfsdl_core", "[{module}] {message}"),
            Severity::Misuse => log::warn!(target: "bfsdl_core", "[{module}] {message}"),
            Severity::RunTime => log::debug!(target: "bfsdl_core", "[{module}] {message}"),
        }
    }
    #[cfg(not(feature = "diagnostics"))]
    {
        let _ = (severity, module, message);
    }
}
