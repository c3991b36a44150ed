//! Consumes symbol runs after an opening `"` and builds a
//! [`StringMachine`], interpreting backslash escapes.
//!
//! Grounded on `Bfdp::Lexer::StringLiteralParser`. Driven by a
//! [`bfsdl_fsm::Engine`] over three states (`Text`, `Backslash`,
//! `EscapeDigits`); because an escape designator or its digit run can
//! share one symbolizer-flushed run with unrelated trailing text (nothing
//! forces `\n` and following plain letters into separate runs), the
//! per-character splitting logic lives in this module rather than in the
//! engine's per-tick `Actions` hooks, which fire once per call and cannot
//! themselves peel a prefix off a run.

use alloc::string::String;

use bfsdl_core::data::StringMachine;
use bfsdl_core::unicode::{Ascii, Codec, CodePoint, Ms1252};
use bfsdl_fsm::{Actions, Engine};

use crate::error::{trace, LexError, LexResult};
use crate::symbol_kind::RunKind;

const TEXT: usize = 0;
const BACKSLASH: usize = 1;
const ESCAPE_DIGITS: usize = 2;
const NUM_STATES: usize = 3;

/// Whether the literal is done (closing `"` consumed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// More runs are expected.
    NotComplete,
    /// The closing quote was consumed.
    Complete,
}

#[derive(Debug, Clone, Copy)]
enum EscapeCodec {
    Ascii,
    Ms1252,
}

#[derive(Debug, Clone, Copy)]
struct EscapeSpec {
    radix: u32,
    default_digits: u32,
    max_digits: u32,
    fixed: bool,
    codec: Option<EscapeCodec>,
}

fn escape_spec(ch: char) -> Option<EscapeSpec> {
    match ch {
        'a' => Some(EscapeSpec { radix: 16, default_digits: 2, max_digits: 2, fixed: true, codec: Some(EscapeCodec::Ascii) }),
        'b' => Some(EscapeSpec { radix: 2, default_digits: 8, max_digits: 32, fixed: false, codec: None }),
        'x' => Some(EscapeSpec { radix: 16, default_digits: 2, max_digits: 8, fixed: false, codec: None }),
        'u' => Some(EscapeSpec { radix: 16, default_digits: 4, max_digits: 8, fixed: false, codec: None }),
        'w' => Some(EscapeSpec { radix: 16, default_digits: 2, max_digits: 2, fixed: true, codec: Some(EscapeCodec::Ms1252) }),
        _ => None,
    }
}

struct NoActions;
impl Actions for NoActions {}

/// Drives one string literal's worth of symbol runs into a
/// [`StringMachine`].
pub struct StringLiteralParser {
    engine: Engine,
    started: bool,
    pending_count: Option<u32>,
    escape_radix: u32,
    escape_digits_needed: u32,
    escape_codec: Option<EscapeCodec>,
    escape_collected: String,
    output: StringMachine,
}

impl Default for StringLiteralParser {
    fn default() -> Self {
        Self {
            engine: Engine::new(NUM_STATES),
            started: false,
            pending_count: None,
            escape_radix: 10,
            escape_digits_needed: 0,
            escape_codec: None,
            escape_collected: String::new(),
            output: StringMachine::new(),
        }
    }
}

impl StringLiteralParser {
    /// A fresh parser, ready for a new literal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The string accumulated so far (final once a run returns
    /// [`ParseOutcome::Complete`]).
    #[must_use]
    pub fn output(&self) -> &StringMachine {
        &self.output
    }

    /// Clears all state for reuse.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn ensure_started(&mut self) {
        if !self.started {
            self.engine.transition(TEXT);
            self.engine.do_transition(&mut NoActions);
            self.started = true;
        }
    }

    /// Feeds one classified symbol run into the parser. Loops internally
    /// because a single run may straddle an escape boundary (the
    /// designator/digits consume a prefix; any remainder re-enters as the
    /// same kind in the new state).
    pub fn parse_run(&mut self, kind: RunKind, text: &str) -> LexResult<ParseOutcome> {
        self.ensure_started();
        let mut remaining = text;
        let mut outcome = ParseOutcome::NotComplete;
        loop {
            let (consumed, step_outcome) = match self.engine.cur_state() {
                BACKSLASH => self.step_backslash(kind, remaining)?,
                ESCAPE_DIGITS => self.step_escape_digits(remaining)?,
                _ => (remaining.len(), self.step_text(kind, remaining)?),
            };
            outcome = step_outcome;
            remaining = &remaining[consumed..];
            if remaining.is_empty() || outcome == ParseOutcome::Complete {
                break;
            }
        }
        Ok(outcome)
    }

    fn step_text(&mut self, kind: RunKind, text: &str) -> LexResult<ParseOutcome> {
        match kind {
            RunKind::DoubleQuotes => Ok(ParseOutcome::Complete),
            RunKind::Backslash => {
                self.engine.transition(BACKSLASH);
                self.engine.do_transition(&mut NoActions);
                Ok(ParseOutcome::NotComplete)
            }
            _ => {
                self.output.append_utf8(text);
                Ok(ParseOutcome::NotComplete)
            }
        }
    }

    fn step_backslash(&mut self, kind: RunKind, text: &str) -> LexResult<(usize, ParseOutcome)> {
        if kind == RunKind::DecimalDigits {
            if self.pending_count.is_some() {
                trace("literal_string", "explicit digit count given twice");
                return Err(LexError::MalformedEscape { detail: "digit count given twice" });
            }
            if text.len() > 2 || text.is_empty() {
                return Err(LexError::MalformedEscape { detail: "digit count prefix must be 1-2 digits" });
            }
            let value: u32 = text
                .parse()
                .map_err(|_| LexError::MalformedEscape { detail: "digit count prefix is not a number" })?;
            if !(1..=32).contains(&value) {
                return Err(LexError::MalformedEscape { detail: "digit count prefix out of range 1..=32" });
            }
            self.pending_count = Some(value);
            return Ok((text.len(), ParseOutcome::NotComplete));
        }

        let Some(ch) = text.chars().next() else {
            return Err(LexError::MalformedEscape { detail: "empty escape designator" });
        };
        let consumed = ch.len_utf8();

        let direct = match ch {
            '"' => Some(0x22u32),
            '\\' => Some(0x5C),
            'n' => Some(0x0A),
            'r' => Some(0x0D),
            't' => Some(0x08), // historical quirk: \t is BS, not HT.
            _ => None,
        };
        if let Some(cp) = direct {
            if self.pending_count.take().is_some() {
                return Err(LexError::MalformedEscape { detail: "digit count prefix on a fixed escape" });
            }
            self.output
                .append_unicode(CodePoint::new(cp))
                .map_err(|_| LexError::MalformedEscape { detail: "unrepresentable escape code point" })?;
            self.engine.transition(TEXT);
            self.engine.do_transition(&mut NoActions);
            return Ok((consumed, ParseOutcome::NotComplete));
        }

        let Some(spec) = escape_spec(ch) else {
            trace("literal_string", "unknown escape designator");
            return Err(LexError::MalformedEscape { detail: "unknown escape designator" });
        };
        let explicit = self.pending_count.take();
        if spec.fixed && explicit.is_some() {
            return Err(LexError::MalformedEscape { detail: "digit count prefix on a fixed-width escape" });
        }
        let digits = explicit.unwrap_or(spec.default_digits);
        if digits == 0 || digits > spec.max_digits {
            return Err(LexError::MalformedEscape { detail: "digit count exceeds escape's maximum" });
        }

        self.escape_radix = spec.radix;
        self.escape_digits_needed = digits;
        self.escape_codec = spec.codec;
        self.escape_collected.clear();
        self.engine.transition(ESCAPE_DIGITS);
        self.engine.do_transition(&mut NoActions);
        Ok((consumed, ParseOutcome::NotComplete))
    }

    fn step_escape_digits(&mut self, text: &str) -> LexResult<(usize, ParseOutcome)> {
        let need = (self.escape_digits_needed as usize).saturating_sub(self.escape_collected.chars().count());
        let take: String = text.chars().take(need).collect();
        let consumed = take.len();
        self.escape_collected.push_str(&take);

        if self.escape_collected.chars().count() < self.escape_digits_needed as usize {
            return Ok((consumed, ParseOutcome::NotComplete));
        }

        let number = u32::from_str_radix(&self.escape_collected, self.escape_radix)
            .map_err(|_| LexError::MalformedEscape { detail: "invalid digit in escape sequence" })?;

        let cp = match self.escape_codec {
            None => CodePoint::new(number),
            Some(EscapeCodec::Ascii) => {
                let byte = u8::try_from(number)
                    .map_err(|_| LexError::MalformedEscape { detail: "ascii escape byte out of range" })?;
                let mut out = CodePoint::new(0);
                if Ascii.convert_bytes(&[byte], &mut out) == 0 {
                    return Err(LexError::MalformedEscape { detail: "ascii escape byte not representable" });
                }
                out
            }
            Some(EscapeCodec::Ms1252) => {
                let byte = u8::try_from(number)
                    .map_err(|_| LexError::MalformedEscape { detail: "ms-1252 escape byte out of range" })?;
                let mut out = CodePoint::new(0);
                if !Ms1252::get_unicode(byte, &mut out) {
                    return Err(LexError::MalformedEscape { detail: "ms-1252 escape byte not representable" });
                }
                out
            }
        };

        self.output
            .append_unicode(cp)
            .map_err(|_| LexError::MalformedEscape { detail: "unrepresentable escape code point" })?;
        self.escape_collected.clear();
        self.engine.transition(TEXT);
        self.engine.do_transition(&mut NoActions);
        Ok((consumed, ParseOutcome::NotComplete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(parser: &mut StringLiteralParser, runs: &[(RunKind, &str)]) -> ParseOutcome {
        let mut last = ParseOutcome::NotComplete;
        for &(kind, text) in runs {
            last = parser.parse_run(kind, text).unwrap();
        }
        last
    }

    #[test]
    fn plain_text_runs_through_unescaped() {
        let mut p = StringLiteralParser::new();
        let outcome = parse_str(&mut p, &[(RunKind::Letters, "abc"), (RunKind::DoubleQuotes, "\"")]);
        assert_eq!(outcome, ParseOutcome::Complete);
        assert_eq!(p.output().get_utf8_string(), "abc");
    }

    #[test]
    fn s3_single_char_escapes() {
        let mut p = StringLiteralParser::new();
        parse_str(
            &mut p,
            &[
                (RunKind::Backslash, "\\"),
                (RunKind::Letters, "r"),
                (RunKind::Backslash, "\\"),
                (RunKind::Letters, "n"),
                (RunKind::Backslash, "\\"),
                (RunKind::Letters, "t"),
            ],
        );
        assert_eq!(p.output().as_bytes(), &[0x0d, 0x0a, 0x08]);
    }

    #[test]
    fn unicode_escape_default_four_digits_then_trailing_text() {
        let mut p = StringLiteralParser::new();
        parse_str(
            &mut p,
            &[(RunKind::Backslash, "\\"), (RunKind::Letters, "u"), (RunKind::Letters, "1f91"), (RunKind::Letters, "3")],
        );
        // Default \u takes exactly 4 hex digits ("1f91" = U+1F91); the
        // trailing "3" from the next run is plain text appended after.
        assert_eq!(p.output().as_bytes(), &[0xe1, 0xbe, 0x91, 0x33]);
    }

    #[test]
    fn s4_unicode_escape_eight_digit_prefix_overrides_default() {
        let mut p = StringLiteralParser::new();
        parse_str(
            &mut p,
            &[
                (RunKind::Backslash, "\\"),
                (RunKind::DecimalDigits, "8"),
                (RunKind::Letters, "u"),
                (RunKind::Letters, "0001f913"),
            ],
        );
        assert_eq!(p.output().as_bytes(), &[0xf0, 0x9f, 0xa4, 0x93]);
    }

    #[test]
    fn ascii_escape_rejects_explicit_count() {
        let mut p = StringLiteralParser::new();
        p.parse_run(RunKind::Backslash, "\\").unwrap();
        p.parse_run(RunKind::DecimalDigits, "4").unwrap();
        assert!(p.parse_run(RunKind::Letters, "a").is_err());
    }

    #[test]
    fn excess_digits_in_one_run_defer_as_plain_text() {
        let mut p = StringLiteralParser::new();
        p.parse_run(RunKind::Backslash, "\\").unwrap();
        p.parse_run(RunKind::Letters, "x").unwrap();
        // Default \x takes 2 hex digits; "41ab" leaves "ab" as plain text.
        p.parse_run(RunKind::Letters, "41ab").unwrap();
        assert_eq!(p.output().get_utf8_string(), "Aab");
    }
}
