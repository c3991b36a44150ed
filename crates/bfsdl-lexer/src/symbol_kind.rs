//! The vocabulary of symbol-run kinds the tokenizer's categories resolve
//! to, shared by the numeric and string literal sub-parsers so they never
//! need to know the category ids themselves.

/// What kind of symbol run a category resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// One of `:` `;` `[` `]` `,` `(` `)`.
    Control,
    /// One or more ASCII `0`-`9`.
    DecimalDigits,
    /// One or more ASCII letters.
    Letters,
    /// `#`.
    Hash,
    /// `+` or `-`.
    Operator,
    /// `.`.
    Period,
    /// `~`.
    Tilde,
    /// Space, tab, newline, and friends.
    Whitespace,
    /// `"`.
    DoubleQuotes,
    /// `\`.
    Backslash,
}
