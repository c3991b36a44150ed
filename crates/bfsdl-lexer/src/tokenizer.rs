//! Top-level finite state machine that partitions BFSDL source text into
//! control characters, numeric literals, and string literals.
//!
//! Grounded on `Bfdp::Lexer::Tokenizer`. Owns an ASCII-codec
//! [`Symbolizer`], the category predicates BFSDL source uses, and the two
//! literal sub-parsers. The three top-level states (main sequence, numeric
//! literal, string literal) are tracked with [`bfsdl_fsm::Engine`], the
//! same engine [`crate::literal_string::StringLiteralParser`] uses for its
//! own nested states.

use bfsdl_core::data::{FlexNumber, StringMachine};
use bfsdl_core::unicode::{Ascii, CodePoint};
use bfsdl_fsm::{Actions, Engine};

use crate::error::{LexError, LexResult};
use crate::literal_numeric::{self, NumericLiteralParser};
use crate::literal_string::{self, StringLiteralParser};
use crate::symbol_kind::RunKind;
use crate::symbolizer::{ParseProgress, StaticSymbolBuffer, SymbolCategory, SymbolObserver, Symbolizer};

/// Maximum symbol run length the tokenizer's buffer can hold at once.
pub const MAX_TOKEN_LENGTH: usize = 256;

/// Receives tokens the [`Tokenizer`] emits. Each callback returns whether
/// parsing should continue.
pub trait TokenObserver {
    /// A lone control character: one of `: ; [ ] , ( )`.
    fn on_control_character(&mut self, ch: char) -> bool;
    /// A complete numeric literal.
    fn on_numeric_literal(&mut self, number: &FlexNumber) -> bool;
    /// A complete string literal.
    fn on_string_literal(&mut self, text: &StringMachine) -> bool;
}

const MAIN_SEQUENCE: usize = 0;
const NUMERIC_LITERAL: usize = 1;
const STRING_LITERAL: usize = 2;
const NUM_STATES: usize = 3;

struct NoActions;
impl Actions for NoActions {}

macro_rules! category {
    ($name:ident, $id:expr, $concat:expr, |$c:ident| $test:expr) => {
        struct $name;
        impl SymbolCategory for $name {
            fn id(&self) -> i32 {
                $id
            }
            fn contains(&self, cp: CodePoint) -> bool {
                match char::try_from(cp) {
                    Ok($c) => $test,
                    Err(_) => false,
                }
            }
            fn should_concatenate(&self) -> bool {
                $concat
            }
        }
    };
}

category!(ControlCat, 0, false, |c| matches!(c, ':' | ';' | '[' | ']' | ',' | '(' | ')'));
category!(DecimalDigitsCat, 1, true, |c| c.is_ascii_digit());
category!(LettersCat, 2, true, |c| c.is_ascii_alphabetic());
category!(HashCat, 3, false, |c| c == '#');
category!(OperatorsCat, 4, false, |c| c == '+' || c == '-');
category!(PeriodCat, 5, false, |c| c == '.');
category!(TildeCat, 6, false, |c| c == '~');
category!(WhitespaceCat, 7, true, |c| c.is_ascii_whitespace());
category!(DoubleQuotesCat, 8, false, |c| c == '"');
category!(BackslashCat, 9, false, |c| c == '\\');

static ASCII: Ascii = Ascii;
static CONTROL: ControlCat = ControlCat;
static DECIMAL_DIGITS: DecimalDigitsCat = DecimalDigitsCat;
static LETTERS: LettersCat = LettersCat;
static HASH: HashCat = HashCat;
static OPERATORS: OperatorsCat = OperatorsCat;
static PERIOD: PeriodCat = PeriodCat;
static TILDE: TildeCat = TildeCat;
static WHITESPACE: WhitespaceCat = WhitespaceCat;
static DOUBLE_QUOTES: DoubleQuotesCat = DoubleQuotesCat;
static BACKSLASH: BackslashCat = BackslashCat;

static CATEGORIES: [&dyn SymbolCategory; 10] = [
    &CONTROL,
    &DECIMAL_DIGITS,
    &LETTERS,
    &HASH,
    &OPERATORS,
    &PERIOD,
    &TILDE,
    &WHITESPACE,
    &DOUBLE_QUOTES,
    &BACKSLASH,
];

fn run_kind_for(category: i32) -> Option<RunKind> {
    match category {
        0 => Some(RunKind::Control),
        1 => Some(RunKind::DecimalDigits),
        2 => Some(RunKind::Letters),
        3 => Some(RunKind::Hash),
        4 => Some(RunKind::Operator),
        5 => Some(RunKind::Period),
        6 => Some(RunKind::Tilde),
        7 => Some(RunKind::Whitespace),
        8 => Some(RunKind::DoubleQuotes),
        9 => Some(RunKind::Backslash),
        _ => None,
    }
}

/// Partitions ASCII BFSDL source bytes into tokens, dispatched to a
/// [`TokenObserver`].
pub struct Tokenizer<OBS> {
    symbolizer: Symbolizer<'static, StaticSymbolBuffer<MAX_TOKEN_LENGTH>>,
    engine: Engine,
    numeric: NumericLiteralParser,
    string: StringLiteralParser,
    observer: OBS,
}

struct Bridge<'a, OBS> {
    engine: &'a mut Engine,
    numeric: &'a mut NumericLiteralParser,
    string: &'a mut StringLiteralParser,
    observer: &'a mut OBS,
    error: &'a mut Option<LexError>,
}

impl<OBS: TokenObserver> SymbolObserver for Bridge<'_, OBS> {
    fn on_mapped_symbols(&mut self, category: i32, text: &str, _count: usize) -> bool {
        let Some(kind) = run_kind_for(category) else {
            *self.error = Some(LexError::UnexpectedSymbol { detail: "category with no known run kind" });
            return false;
        };
        self.dispatch(kind, text)
    }

    fn on_unmapped_symbols(&mut self, _text: &str, _count: usize) -> bool {
        *self.error = Some(LexError::UnexpectedSymbol { detail: "unrecognized symbol" });
        false
    }
}

impl<OBS: TokenObserver> Bridge<'_, OBS> {
    fn transition_to(&mut self, state: usize) {
        self.engine.transition(state);
        self.engine.do_transition(&mut NoActions);
    }

    fn dispatch(&mut self, kind: RunKind, text: &str) -> bool {
        match self.engine.cur_state() {
            NUMERIC_LITERAL => self.in_numeric(kind, text),
            STRING_LITERAL => self.in_string(kind, text),
            _ => self.main_sequence(kind, text),
        }
    }

    fn main_sequence(&mut self, kind: RunKind, text: &str) -> bool {
        match kind {
            RunKind::Whitespace => true,
            RunKind::Control => {
                for ch in text.chars() {
                    if !self.observer.on_control_character(ch) {
                        return false;
                    }
                }
                true
            }
            RunKind::Hash => {
                self.numeric.reset();
                self.transition_to(NUMERIC_LITERAL);
                true
            }
            RunKind::DoubleQuotes => {
                self.string.reset();
                self.transition_to(STRING_LITERAL);
                true
            }
            _ => {
                *self.error = Some(LexError::UnexpectedSymbol { detail: "unexpected symbol outside a literal" });
                false
            }
        }
    }

    fn in_numeric(&mut self, kind: RunKind, text: &str) -> bool {
        match self.numeric.parse_run(kind, text) {
            Ok(literal_numeric::ParseOutcome::Complete) => {
                let keep = self.observer.on_numeric_literal(self.numeric.number());
                self.transition_to(MAIN_SEQUENCE);
                keep
            }
            Ok(literal_numeric::ParseOutcome::NotComplete) => true,
            Err(e) => {
                *self.error = Some(e);
                false
            }
        }
    }

    fn in_string(&mut self, kind: RunKind, text: &str) -> bool {
        match self.string.parse_run(kind, text) {
            Ok(literal_string::ParseOutcome::Complete) => {
                let keep = self.observer.on_string_literal(self.string.output());
                self.transition_to(MAIN_SEQUENCE);
                keep
            }
            Ok(literal_string::ParseOutcome::NotComplete) => true,
            Err(e) => {
                *self.error = Some(e);
                false
            }
        }
    }
}

impl<OBS: TokenObserver> Tokenizer<OBS> {
    /// Builds a tokenizer dispatching complete tokens to `observer`.
    #[must_use]
    pub fn new(observer: OBS) -> Self {
        let mut engine = Engine::new(NUM_STATES);
        engine.transition(MAIN_SEQUENCE);
        engine.do_transition(&mut NoActions);
        Self {
            symbolizer: Symbolizer::new(&ASCII, &CATEGORIES),
            engine,
            numeric: NumericLiteralParser::new(),
            string: StringLiteralParser::new(),
            observer,
        }
    }

    /// Consumes as much of `bytes` as forms complete symbol runs,
    /// dispatching tokens along the way.
    pub fn parse(&mut self, bytes: &[u8]) -> LexResult<ParseProgress> {
        let mut error = None;
        let (bytes_read, sym_result) = {
            let mut bridge = Bridge {
                engine: &mut self.engine,
                numeric: &mut self.numeric,
                string: &mut self.string,
                observer: &mut self.observer,
                error: &mut error,
            };
            self.symbolizer.parse(bytes, &mut bridge)
        };
        if let Some(e) = error {
            return Err(e);
        }
        let keep_parsing = sym_result?;
        Ok(ParseProgress { bytes_read, keep_parsing })
    }

    /// Flushes the symbolizer's trailing run. Requires the tokenizer to
    /// have returned to the main-sequence state — a still-open numeric or
    /// string literal at end of input is an error.
    pub fn end_parsing(&mut self) -> LexResult<()> {
        let mut error = None;
        {
            let mut bridge = Bridge {
                engine: &mut self.engine,
                numeric: &mut self.numeric,
                string: &mut self.string,
                observer: &mut self.observer,
                error: &mut error,
            };
            self.symbolizer.end_parsing(&mut bridge);
        }
        if let Some(e) = error {
            return Err(e);
        }
        if self.engine.cur_state() != MAIN_SEQUENCE {
            return Err(LexError::UnterminatedLiteral);
        }
        Ok(())
    }

    /// Consumes the observer, returning it.
    pub fn into_observer(self) -> OBS {
        self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Collector {
        controls: Vec<char>,
        numbers: Vec<std::string::String>,
        strings: Vec<std::string::String>,
    }

    impl TokenObserver for Collector {
        fn on_control_character(&mut self, ch: char) -> bool {
            self.controls.push(ch);
            true
        }
        fn on_numeric_literal(&mut self, number: &FlexNumber) -> bool {
            self.numbers.push(number.get_str(false));
            true
        }
        fn on_string_literal(&mut self, text: &StringMachine) -> bool {
            self.strings.push(text.get_utf8_string().into());
            true
        }
    }

    fn run_to_end(tok: &mut Tokenizer<Collector>, input: &[u8]) {
        let mut cursor = 0;
        while cursor < input.len() {
            let progress = tok.parse(&input[cursor..]).unwrap();
            cursor += progress.bytes_read;
            if !progress.keep_parsing {
                break;
            }
            if progress.bytes_read == 0 {
                break;
            }
        }
        tok.end_parsing().unwrap();
    }

    #[test]
    fn s1_control_characters_reported_individually() {
        let mut tok = Tokenizer::new(Collector::default());
        run_to_end(&mut tok, b"[:,]");
        assert_eq!(tok.into_observer().controls, std::vec!['[', ':', ',', ']']);
    }

    #[test]
    fn whitespace_between_tokens_is_ignored() {
        let mut tok = Tokenizer::new(Collector::default());
        run_to_end(&mut tok, b"  [ \t\n: ]");
        assert_eq!(tok.into_observer().controls, std::vec!['[', ':', ']']);
    }

    #[test]
    fn decimal_numeric_literal_end_to_end() {
        let mut tok = Tokenizer::new(Collector::default());
        run_to_end(&mut tok, b"#123#");
        assert_eq!(tok.into_observer().numbers, std::vec!["123".to_string()]);
    }

    #[test]
    fn string_literal_with_escape_end_to_end() {
        let mut tok = Tokenizer::new(Collector::default());
        run_to_end(&mut tok, b"\"ab\\ncd\"");
        let observer = tok.into_observer();
        assert_eq!(observer.strings.len(), 1);
        assert_eq!(observer.strings[0].as_bytes(), b"ab\ncd");
    }

    #[test]
    fn unterminated_numeric_literal_is_an_error() {
        let mut tok = Tokenizer::new(Collector::default());
        tok.parse(b"#123").unwrap();
        assert!(tok.end_parsing().is_err());
    }

    #[test]
    fn stray_symbol_in_main_sequence_is_an_error() {
        let mut tok = Tokenizer::new(Collector::default());
        assert!(tok.parse(b"@").is_err());
    }
}
