//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Every token produced by the tokenizer is a [`CSSToken`] (kind and lexeme)
//! paired with the [`SourcePosition`] it started at, so that recovered
//! syntax errors can be reported against the source text.

use core::fmt;

use serde::Serialize;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HashType {
    /// The hash token's value is a valid identifier.
    Id,
    /// The hash token's value is not a valid identifier (e.g. `#123`).
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<number-token>` has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericType {
    /// No decimal point and no exponent.
    Integer,
    /// A decimal point or exponent was present.
    Number,
}

/// Line and column (both 1-based, counted in code points) of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl SourcePosition {
    /// Position of the first code point of the input.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Create a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// CSS token kinds as defined by the CSS Syntax Module Level 3.
///
/// Comments never appear here; whitespace runs collapse into a single
/// [`CSSToken::Whitespace`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CSSToken {
    /// `<ident-token>`, escapes already resolved.
    Ident(String),

    /// `<function-token>`: an identifier immediately followed by `(`.
    Function(String),

    /// `<at-keyword-token>`, without the `@`.
    AtKeyword(String),

    /// `<hash-token>`, without the `#`.
    Hash {
        /// The code points after `#`.
        value: String,
        /// Whether the value would start an identifier.
        hash_type: HashType,
    },

    /// `<string-token>`, without the quotes.
    String(String),

    /// `<bad-string-token>`: a string interrupted by a newline.
    BadString,

    /// `<url-token>` from an unquoted `url(...)`.
    Url(String),

    /// `<bad-url-token>`: a malformed unquoted `url(...)`.
    BadUrl,

    /// `<delim-token>`: any single code point without a token of its own.
    Delim(char),

    /// `<number-token>`.
    Number {
        /// The numeric value.
        value: f64,
        /// Integer or number.
        numeric_type: NumericType,
    },

    /// `<percentage-token>`.
    Percentage {
        /// The numeric value, without the `%`.
        value: f64,
        /// Integer or number.
        numeric_type: NumericType,
    },

    /// `<dimension-token>`: a number followed by a unit identifier.
    Dimension {
        /// The numeric value.
        value: f64,
        /// Integer or number.
        numeric_type: NumericType,
        /// The unit, as written.
        unit: String,
    },

    /// `<whitespace-token>`: one or more whitespace code points.
    Whitespace,

    /// `<CDO-token>`: `<!--`.
    CDO,

    /// `<CDC-token>`: `-->`.
    CDC,

    /// `:`
    Colon,

    /// `;`
    Semicolon,

    /// `,`
    Comma,

    /// `[`
    LeftBracket,

    /// `]`
    RightBracket,

    /// `(`
    LeftParen,

    /// `)`
    RightParen,

    /// `{`
    LeftBrace,

    /// `}`
    RightBrace,

    /// End of input.
    EOF,
}

impl CSSToken {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Returns true for tokens that signal a lexical error the parser has
    /// to recover from.
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        matches!(self, Self::BadString | Self::BadUrl | Self::Delim('\\'))
    }

    /// The closing token matching an opening `{`, `[`, `(` or function token.
    #[must_use]
    pub const fn mirror(&self) -> Option<Self> {
        match self {
            Self::LeftBrace => Some(Self::RightBrace),
            Self::LeftBracket => Some(Self::RightBracket),
            Self::LeftParen | Self::Function(_) => Some(Self::RightParen),
            _ => None,
        }
    }

    /// Returns true if this token is an identifier matching `name`
    /// ASCII case-insensitively.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Self::Ident(value) if value.eq_ignore_ascii_case(name))
    }
}

/// Serializes the token back to (approximate) CSS source text.
impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "{v}"),
            Self::Function(v) => write!(f, "{v}("),
            Self::AtKeyword(v) => write!(f, "@{v}"),
            Self::Hash { value, .. } => write!(f, "#{value}"),
            Self::String(v) => write!(f, "\"{}\"", v.replace('"', "\\\"")),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(v) => write!(f, "url({v})"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number { value, .. } => write!(f, "{value}"),
            Self::Percentage { value, .. } => write!(f, "{value}%"),
            Self::Dimension { value, unit, .. } => write!(f, "{value}{unit}"),
            Self::Whitespace => write!(f, " "),
            Self::CDO => write!(f, "<!--"),
            Self::CDC => write!(f, "-->"),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBrace => write!(f, "{{"),
            Self::RightBrace => write!(f, "}}"),
            Self::EOF => Ok(()),
        }
    }
}

/// A token together with the position of its first code point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Kind and lexeme.
    pub kind: CSSToken,
    /// Where the token starts.
    pub position: SourcePosition,
}

impl Token {
    /// Pair a token kind with its position.
    #[must_use]
    pub const fn new(kind: CSSToken, position: SourcePosition) -> Self {
        Self { kind, position }
    }
}
