//! Streams bytes through a codec into code points, classifies each against
//! an ordered list of categories, and emits maximal same-category runs.
//!
//! Grounded on `Bfdp::Lexer::Symbolizer`, including its cached
//! last-matching-category optimization and the "Unknown run fills the
//! buffer, flush and retry" recovery path.

use alloc::string::String;

use bfsdl_core::unicode::{CodePoint, Codec, Utf8};

use crate::error::{trace, LexError, LexResult};

/// Reserved category id for a code point that matched no registered
/// category.
pub const UNKNOWN_CATEGORY: i32 = -2;

/// A predicate-and-policy pair a [`Symbolizer`] classifies code points
/// against.
///
/// Grounded on `Bfdp::Lexer::ISymbolCategory`.
pub trait SymbolCategory {
    /// This category's id. Must be `>= 0`; the symbolizer reserves
    /// negative ids for [`UNKNOWN_CATEGORY`] and its own "no run buffered
    /// yet" bookkeeping.
    fn id(&self) -> i32;

    /// Whether `cp` belongs to this category.
    fn contains(&self, cp: CodePoint) -> bool;

    /// Whether consecutive symbols in this category should be buffered
    /// into one run (`true`), or flushed as singletons immediately
    /// (`false`, e.g. BFSDL control characters).
    fn should_concatenate(&self) -> bool;
}

/// A bounded sequence of code points a [`Symbolizer`] accumulates one run
/// into before flushing to an observer.
///
/// Grounded on `Bfdp::Lexer::ISymbolBuffer` / `StaticSymbolBuffer`.
pub trait SymbolBuffer {
    /// Appends `cp`. Returns `false` once capacity is exhausted without
    /// growing (a fixed-capacity contract, not a dynamic one).
    fn add(&mut self, cp: CodePoint) -> bool;

    /// Empties the buffer without affecting its capacity.
    fn clear(&mut self);

    /// Number of code points currently buffered.
    fn len(&self) -> usize;

    /// `true` iff [`SymbolBuffer::len`] is zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The code point at `index`, or [`CodePoint::INVALID`] if out of
    /// range.
    fn get(&self, index: usize) -> CodePoint;
}

/// A fixed-capacity [`SymbolBuffer`] of `N` code points.
///
/// Grounded on `Bfdp::Lexer::StaticSymbolBuffer<MAX_SYMBOL_LENGTH>`.
#[derive(Debug, Clone)]
pub struct StaticSymbolBuffer<const N: usize> {
    buf: [CodePoint; N],
    len: usize,
}

impl<const N: usize> Default for StaticSymbolBuffer<N> {
    fn default() -> Self {
        Self { buf: [CodePoint::INVALID; N], len: 0 }
    }
}

impl<const N: usize> SymbolBuffer for StaticSymbolBuffer<N> {
    fn add(&mut self, cp: CodePoint) -> bool {
        if self.len >= N {
            return false;
        }
        self.buf[self.len] = cp;
        self.len += 1;
        true
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> CodePoint {
        if index >= self.len {
            CodePoint::INVALID
        } else {
            self.buf[index]
        }
    }
}

/// Receives symbol runs flushed by a [`Symbolizer`]. Each callback returns
/// whether parsing should continue.
pub trait SymbolObserver {
    /// A run of `count` code points, all in `category`, rendered as UTF-8
    /// in `text`.
    fn on_mapped_symbols(&mut self, category: i32, text: &str, count: usize) -> bool;

    /// A run of `count` code points that matched no category.
    fn on_unmapped_symbols(&mut self, text: &str, count: usize) -> bool;
}

/// The outcome of one [`Symbolizer::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseProgress {
    /// Number of input bytes consumed.
    pub bytes_read: usize,
    /// `false` if an observer callback asked to stop; `true` otherwise.
    pub keep_parsing: bool,
}

/// Converts a byte stream into categorized symbol runs.
pub struct Symbolizer<'a, B: SymbolBuffer> {
    codec: &'a dyn Codec,
    categories: &'a [&'a dyn SymbolCategory],
    buffer: B,
    last_match: usize,
    saved_category: Option<i32>,
}

impl<'a, B: SymbolBuffer + Default> Symbolizer<'a, B> {
    /// Builds a symbolizer over `codec`, classifying against `categories`
    /// in order (first match wins — put common categories first).
    #[must_use]
    pub fn new(codec: &'a dyn Codec, categories: &'a [&'a dyn SymbolCategory]) -> Self {
        Self { codec, categories, buffer: B::default(), last_match: 0, saved_category: None }
    }
}

impl<'a, B: SymbolBuffer> Symbolizer<'a, B> {
    fn lookup_category(&mut self, cp: CodePoint) -> (i32, bool) {
        if let Some(&cat) = self.categories.get(self.last_match) {
            if cat.contains(cp) {
                return (cat.id(), cat.should_concatenate());
            }
        }
        for (i, &cat) in self.categories.iter().enumerate() {
            if cat.contains(cp) {
                self.last_match = i;
                return (cat.id(), cat.should_concatenate());
            }
        }
        (UNKNOWN_CATEGORY, true)
    }

    fn flush<O: SymbolObserver>(&mut self, category: i32, observer: &mut O) -> bool {
        let mut text = String::new();
        for i in 0..self.buffer.len() {
            let cp = self.buffer.get(i);
            let mut bytes = [0u8; 6];
            let n = Utf8.convert_symbol(cp, &mut bytes);
            if n > 0 {
                text.push_str(core::str::from_utf8(&bytes[..n]).expect("valid UTF-8"));
            }
        }
        let count = self.buffer.len();
        self.buffer.clear();
        if category == UNKNOWN_CATEGORY {
            observer.on_unmapped_symbols(&text, count)
        } else {
            observer.on_mapped_symbols(category, &text, count)
        }
    }

    /// Consumes bytes from the front of `bytes`, dispatching flushed runs
    /// to `observer`. Stops early (success) if an observer callback
    /// returns `false`. A trailing incomplete multi-byte sequence at the
    /// end of `bytes` is left unconsumed for the next call, rather than
    /// reported as an error.
    pub fn parse<O: SymbolObserver>(
        &mut self,
        bytes: &[u8],
        observer: &mut O,
    ) -> (usize, LexResult<bool>) {
        let max_bytes = self.codec.max_bytes();
        let mut cursor = 0;

        while cursor < bytes.len() {
            let window_end = (cursor + max_bytes).min(bytes.len());
            let window = &bytes[cursor..window_end];
            let mut cp = CodePoint::INVALID;
            let consumed = self.codec.convert_bytes(window, &mut cp);

            if consumed == 0 {
                if self.codec.is_truncated(window) {
                    if window_end == bytes.len() {
                        // Might complete once more bytes arrive.
                        return (cursor, Ok(true));
                    }
                    trace("symbolizer", "incomplete multi-byte sequence mid-stream");
                    return (cursor, Err(LexError::IncompleteByteSequence { offset: cursor }));
                }
                trace("symbolizer", "invalid multi-byte sequence");
                return (cursor, Err(LexError::InvalidByteSequence { offset: cursor }));
            }
            cursor += consumed;

            let (category, should_concatenate) = self.lookup_category(cp);

            if let Some(saved) = self.saved_category {
                if category != saved && !self.buffer.is_empty() {
                    if !self.flush(saved, observer) {
                        return (cursor, Ok(false));
                    }
                }
            }
            self.saved_category = Some(category);

            if !self.buffer.add(cp) {
                if category == UNKNOWN_CATEGORY {
                    if !self.flush(category, observer) {
                        return (cursor, Ok(false));
                    }
                    if !self.buffer.add(cp) {
                        trace("symbolizer", "symbol too big even after flush");
                        return (cursor, Err(LexError::SymbolTooBig));
                    }
                } else {
                    trace("symbolizer", "symbol too big");
                    return (cursor, Err(LexError::SymbolTooBig));
                }
            }

            if !should_concatenate && !self.flush(category, observer) {
                return (cursor, Ok(false));
            }
        }

        if self.saved_category == Some(UNKNOWN_CATEGORY) && !self.buffer.is_empty() {
            self.flush(UNKNOWN_CATEGORY, observer);
        }

        (cursor, Ok(true))
    }

    /// Flushes any remaining buffered run (dispatched by its saved
    /// category) and resets.
    pub fn end_parsing<O: SymbolObserver>(&mut self, observer: &mut O) -> bool {
        let keep = if self.buffer.is_empty() {
            true
        } else {
            let cat = self.saved_category.unwrap_or(UNKNOWN_CATEGORY);
            self.flush(cat, observer)
        };
        self.reset();
        keep
    }

    /// Clears the buffer and saved category. The cached last-matching
    /// category entry is preserved, matching the original's `Reset`.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.saved_category = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfsdl_core::unicode::Ascii;

    struct IsAlpha;
    impl SymbolCategory for IsAlpha {
        fn id(&self) -> i32 {
            0
        }
        fn contains(&self, cp: CodePoint) -> bool {
            char::try_from(cp).is_ok_and(|c| c.is_ascii_alphabetic())
        }
        fn should_concatenate(&self) -> bool {
            true
        }
    }

    struct IsControl;
    impl SymbolCategory for IsControl {
        fn id(&self) -> i32 {
            1
        }
        fn contains(&self, cp: CodePoint) -> bool {
            char::try_from(cp).is_ok_and(|c| c == ':')
        }
        fn should_concatenate(&self) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Collector {
        mapped: std::vec::Vec<(i32, std::string::String, usize)>,
        unmapped: std::vec::Vec<(std::string::String, usize)>,
    }

    impl SymbolObserver for Collector {
        fn on_mapped_symbols(&mut self, category: i32, text: &str, count: usize) -> bool {
            self.mapped.push((category, text.into(), count));
            true
        }
        fn on_unmapped_symbols(&mut self, text: &str, count: usize) -> bool {
            self.unmapped.push((text.into(), count));
            true
        }
    }

    #[test]
    fn runs_flush_at_category_boundary() {
        let categories: [&dyn SymbolCategory; 2] = [&IsAlpha, &IsControl];
        let mut sym: Symbolizer<StaticSymbolBuffer<16>> = Symbolizer::new(&Ascii, &categories);
        let mut observer = Collector::default();
        let (read, result) = sym.parse(b"abc::def", &mut observer);
        assert_eq!(read, 8);
        assert!(result.unwrap());
        sym.end_parsing(&mut observer);
        assert_eq!(observer.mapped, alloc_vec(vec![(0, "abc".into(), 3), (0, "def".into(), 3)]));
        assert_eq!(observer.unmapped, std::vec::Vec::new());
    }

    fn alloc_vec<T>(v: std::vec::Vec<T>) -> std::vec::Vec<T> {
        v
    }

    #[test]
    fn control_category_flushes_each_symbol_singly() {
        let categories: [&dyn SymbolCategory; 2] = [&IsAlpha, &IsControl];
        let mut sym: Symbolizer<StaticSymbolBuffer<16>> = Symbolizer::new(&Ascii, &categories);
        let mut observer = Collector::default();
        sym.parse(b"::", &mut observer);
        assert_eq!(observer.mapped.len(), 2);
        assert!(observer.mapped.iter().all(|(cat, text, count)| *cat == 1 && text == ":" && *count == 1));
    }

    #[test]
    fn unknown_run_flushes_when_buffer_fills_and_retries() {
        let categories: [&dyn SymbolCategory; 1] = [&IsAlpha];
        let mut sym: Symbolizer<StaticSymbolBuffer<2>> = Symbolizer::new(&Ascii, &categories);
        let mut observer = Collector::default();
        // '1','2','3' are all Unknown (not alphabetic); buffer capacity 2.
        let (read, result) = sym.parse(b"123", &mut observer);
        assert_eq!(read, 3);
        assert!(result.unwrap());
        sym.end_parsing(&mut observer);
        assert_eq!(observer.unmapped, alloc_vec(vec![("12".into(), 2), ("3".into(), 1)]));
    }

    #[test]
    fn invalid_byte_sequence_is_reported() {
        let categories: [&dyn SymbolCategory; 1] = [&IsAlpha];
        let mut sym: Symbolizer<StaticSymbolBuffer<16>> = Symbolizer::new(&Ascii, &categories);
        let mut observer = Collector::default();
        let (read, result) = sym.parse(&[0x80], &mut observer);
        assert_eq!(read, 0);
        assert!(result.is_err());
    }
}
