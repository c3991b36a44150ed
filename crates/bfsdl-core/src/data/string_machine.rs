//! A mutable string builder whose canonical storage is UTF-8 but which
//! accepts input from, and renders output through, any [`Codec`].
//!
//! Grounded on `Bfdp::Data::StringMachine`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{report, BfsdlCoreError, CoreResult, Severity};
use crate::unicode::{CodePoint, Codec, Utf8};

/// A UTF-8 string builder with an explicit "has anything been appended
/// yet" flag, independent of emptiness (appending the empty string still
/// marks the machine as defined).
#[derive(Debug, Clone, Default)]
pub struct StringMachine {
    text: String,
    defined: bool,
}

impl StringMachine {
    /// A fresh, undefined machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff at least one append has happened (including of the empty
    /// string).
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// The accumulated UTF-8 text.
    #[must_use]
    pub fn get_utf8_string(&self) -> &str {
        &self.text
    }

    /// The accumulated bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Appends `s` verbatim (it must already be UTF-8, guaranteed by
    /// `&str`) and marks the machine defined.
    pub fn append_utf8(&mut self, s: &str) {
        self.text.push_str(s);
        self.defined = true;
    }

    /// Encodes `cp` as UTF-8 and appends it.
    pub fn append_unicode(&mut self, cp: CodePoint) -> CoreResult<()> {
        let mut buf = [0u8; 6];
        let n = Utf8.convert_symbol(cp, &mut buf);
        if n == 0 {
            report(Severity::RunTime, "data::string_machine", "append_unicode: unrepresentable code point");
            return Err(BfsdlCoreError::UnrepresentableString { codec: "UTF8" });
        }
        let decoded = core::str::from_utf8(&buf[..n]).expect("Utf8::convert_symbol yields valid UTF-8");
        self.append_utf8(decoded);
        Ok(())
    }

    /// Decodes `s` through `codec` one code point at a time, re-encoding
    /// each as UTF-8 before appending. On any undecodable sequence, leaves
    /// `self` unchanged and returns an error.
    pub fn append_string(&mut self, codec: &dyn Codec, s: &[u8]) -> CoreResult<()> {
        let mut decoded = String::new();
        let mut cursor = 0;
        while cursor < s.len() {
            let mut cp = CodePoint::INVALID;
            let consumed = codec.convert_bytes(&s[cursor..], &mut cp);
            if consumed == 0 {
                report(Severity::RunTime, "data::string_machine", "append_string: codec decode failed");
                return Err(BfsdlCoreError::CodecFailure { codec: codec.name() });
            }
            let mut buf = [0u8; 6];
            let n = Utf8.convert_symbol(cp, &mut buf);
            if n == 0 {
                report(Severity::RunTime, "data::string_machine", "append_string: unrepresentable code point");
                return Err(BfsdlCoreError::UnrepresentableString { codec: "UTF8" });
            }
            decoded.push_str(core::str::from_utf8(&buf[..n]).expect("valid UTF-8"));
            cursor += consumed;
        }
        self.text.push_str(&decoded);
        self.defined = true;
        Ok(())
    }

    /// Encodes the accumulated text through `codec` into `out`. Fails if
    /// any code point cannot be represented in `codec`.
    pub fn get_string(&self, codec: &dyn Codec, out: &mut Vec<u8>) -> CoreResult<()> {
        let mut buf = [0u8; 6];
        for ch in self.text.chars() {
            let n = codec.convert_symbol(CodePoint::from(ch), &mut buf);
            if n == 0 {
                report(Severity::RunTime, "data::string_machine", "get_string: unrepresentable code point");
                return Err(BfsdlCoreError::UnrepresentableString { codec: codec.name() });
            }
            out.extend_from_slice(&buf[..n]);
        }
        Ok(())
    }

    /// A hex dump of the accumulated UTF-8 bytes: two lowercase hex digits
    /// per byte, `prefix` before each, `sep` between consecutive bytes.
    #[must_use]
    pub fn get_utf8_hex_string(&self, sep: &str, prefix: &str) -> String {
        self.text
            .bytes()
            .map(|b| format!("{prefix}{b:02x}"))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Clears content and the `defined` flag.
    pub fn reset(&mut self) {
        self.text.clear();
        self.defined = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::Ascii;

    #[test]
    fn append_empty_sets_defined() {
        let mut sm = StringMachine::new();
        assert!(!sm.is_defined());
        sm.append_utf8("");
        assert!(sm.is_defined());
        assert!(sm.get_utf8_string().is_empty());
    }

    #[test]
    fn hex_dump_separators_are_between_bytes_only() {
        let mut sm = StringMachine::new();
        sm.append_utf8("AB");
        assert_eq!(sm.get_utf8_hex_string(" ", ""), "41 42");
        assert_eq!(sm.get_utf8_hex_string("", "0x"), "0x410x42");
    }

    #[test]
    fn s3_string_literal_escapes_utf8_bytes() {
        let mut sm = StringMachine::new();
        sm.append_utf8("\"");
        sm.append_unicode(CodePoint::new(0x08)).unwrap();
        sm.append_utf8("\r\n\\t");
        assert_eq!(sm.as_bytes(), &[0x22, 0x08, 0x0d, 0x0a, 0x5c, 0x74]);
    }

    #[test]
    fn s4_unicode_escape_utf8_bytes() {
        let mut sm = StringMachine::new();
        sm.append_unicode(CodePoint::new(0x1F913)).unwrap();
        assert_eq!(sm.as_bytes(), &[0xf0, 0x9f, 0xa4, 0x93]);
    }

    #[test]
    fn append_string_through_ascii_rejects_high_bytes() {
        let mut sm = StringMachine::new();
        assert!(sm.append_string(&Ascii, b"ok").is_ok());
        assert_eq!(sm.get_utf8_string(), "ok");
        let mut sm2 = StringMachine::new();
        assert!(sm2.append_string(&Ascii, &[0x80]).is_err());
    }
}
