//! Incrementally builds a [`FlexNumber`] from the symbol runs a
//! [`crate::tokenizer::Tokenizer`] forwards while inside a numeric literal
//! (`#...#`).
//!
//! Grounded on `Bfdp::Lexer::NumericLiteralParser`.

use alloc::string::String;

use bfsdl_core::data::{FlexNumber, Sign};

use crate::error::{trace, LexError, LexResult};
use crate::symbol_kind::RunKind;

/// Whether a literal is still accumulating, or has seen its closing `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// More runs are expected.
    NotComplete,
    /// The closing `#` was consumed; [`NumericLiteralParser::number`] is
    /// final.
    Complete,
}

/// Drives one numeric literal's worth of symbol runs into a [`FlexNumber`].
pub struct NumericLiteralParser {
    radix: u32,
    radix_set: bool,
    has_period: bool,
    unparsed_text: String,
    number: FlexNumber,
}

impl Default for NumericLiteralParser {
    fn default() -> Self {
        Self {
            radix: 10,
            radix_set: false,
            has_period: false,
            unparsed_text: String::new(),
            number: FlexNumber::new(),
        }
    }
}

impl NumericLiteralParser {
    /// A fresh parser, ready for a new literal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number accumulated so far (final once a run returns
    /// [`ParseOutcome::Complete`]).
    #[must_use]
    pub fn number(&self) -> &FlexNumber {
        &self.number
    }

    /// Clears all state for reuse.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn radix_for_marker(ch: char) -> Option<u32> {
        match ch {
            'b' => Some(2),
            'o' => Some(8),
            'd' => Some(10),
            'x' => Some(16),
            _ => None,
        }
    }

    fn default_sign(sign: &mut Sign) {
        if *sign == Sign::Unspecified {
            *sign = Sign::Positive;
        }
    }

    /// Flushes `unparsed_text` into whichever component is next
    /// undefined: significand integral, then (once `.` has been seen)
    /// significand fractional, then (once a base is present) exponent
    /// integral.
    fn flush_unparsed(&mut self) -> LexResult<()> {
        if self.unparsed_text.is_empty() {
            return Ok(());
        }
        let text = core::mem::take(&mut self.unparsed_text);
        let radix = self.radix;
        if !self.number.significand.integral.is_defined() {
            Self::default_sign(&mut self.number.significand.sign);
            self.number.significand.integral.set(&text, radix).map_err(|_| {
                LexError::MalformedNumericLiteral { detail: "invalid significand integral digits" }
            })?;
        } else if self.has_period && !self.number.significand.fractional.is_defined() {
            self.number.significand.fractional.set(&text, radix).map_err(|_| {
                LexError::MalformedNumericLiteral { detail: "invalid significand fractional digits" }
            })?;
        } else if self.number.base.is_defined() && !self.number.exponent.is_defined() {
            Self::default_sign(&mut self.number.exponent.sign);
            self.number.exponent.integral.set(&text, 10).map_err(|_| {
                LexError::MalformedNumericLiteral { detail: "invalid exponent digits" }
            })?;
        } else {
            trace("literal_numeric", "digit group with no undefined component to fill");
            return Err(LexError::MalformedNumericLiteral { detail: "unexpected digit group" });
        }
        Ok(())
    }

    /// Feeds one classified symbol run into the parser.
    pub fn parse_run(&mut self, kind: RunKind, text: &str) -> LexResult<ParseOutcome> {
        match kind {
            RunKind::DecimalDigits | RunKind::Letters => {
                self.unparsed_text.push_str(text);
                Ok(ParseOutcome::NotComplete)
            }
            RunKind::Control => {
                if self.radix_set {
                    trace("literal_numeric", "radix redefined");
                    return Err(LexError::MalformedNumericLiteral { detail: "radix redefined" });
                }
                let mut chars = self.unparsed_text.chars();
                let marker = chars.next();
                if chars.next().is_some() {
                    return Err(LexError::MalformedNumericLiteral {
                        detail: "radix marker must be a single letter",
                    });
                }
                let Some(new_radix) = marker.and_then(Self::radix_for_marker) else {
                    trace("literal_numeric", "invalid radix marker");
                    return Err(LexError::MalformedNumericLiteral { detail: "invalid radix marker" });
                };
                self.unparsed_text.clear();
                self.radix = new_radix;
                self.radix_set = true;
                Ok(ParseOutcome::NotComplete)
            }
            RunKind::Operator => {
                if !self.unparsed_text.is_empty() {
                    return Err(LexError::MalformedNumericLiteral {
                        detail: "sign must precede its digit group",
                    });
                }
                let sign = match text.chars().next() {
                    Some('+') => Sign::Positive,
                    Some('-') => Sign::Negative,
                    _ => {
                        return Err(LexError::MalformedNumericLiteral { detail: "malformed sign" })
                    }
                };
                let target = if self.number.base.is_defined() {
                    &mut self.number.exponent.sign
                } else {
                    &mut self.number.significand.sign
                };
                if *target != Sign::Unspecified {
                    trace("literal_numeric", "sign redefined");
                    return Err(LexError::MalformedNumericLiteral { detail: "sign redefined" });
                }
                *target = sign;
                Ok(ParseOutcome::NotComplete)
            }
            RunKind::Period => {
                self.flush_unparsed()?;
                if self.has_period {
                    return Err(LexError::MalformedNumericLiteral {
                        detail: "duplicate decimal point",
                    });
                }
                if self.number.base.is_defined() {
                    return Err(LexError::MalformedNumericLiteral {
                        detail: "decimal point after exponent started",
                    });
                }
                self.has_period = true;
                Ok(ParseOutcome::NotComplete)
            }
            RunKind::Tilde => {
                self.flush_unparsed()?;
                if self.number.base.is_defined() {
                    return Err(LexError::MalformedNumericLiteral { detail: "exponent redefined" });
                }
                let base_text = if self.radix == 2 { "2" } else { "10" };
                self.number.base.sign = Sign::Positive;
                self.number.base.integral.set(base_text, 10).expect("fixed base text is valid");
                Ok(ParseOutcome::NotComplete)
            }
            RunKind::Hash => {
                self.flush_unparsed()?;
                if !self.number.significand.is_defined() {
                    return Err(LexError::MalformedNumericLiteral { detail: "empty significand" });
                }
                if self.number.base.is_defined() != self.number.exponent.is_defined() {
                    return Err(LexError::MalformedNumericLiteral {
                        detail: "exponent base without exponent value, or vice versa",
                    });
                }
                Ok(ParseOutcome::Complete)
            }
            RunKind::Whitespace => {
                Err(LexError::UnexpectedSymbol { detail: "whitespace inside numeric literal" })
            }
            RunKind::DoubleQuotes | RunKind::Backslash => {
                Err(LexError::UnexpectedSymbol { detail: "unexpected symbol in numeric literal" })
            }
        }
    }
}
