//! Error types of the parsing pipeline.
//!
//! Lexical and grammar errors confined to one rule are recovered inside the
//! parser and only logged ([`SyntaxError`]). Stream-level failures surface as
//! [`ParseError`], which the pipeline wraps into a [`CssError`] carrying a
//! message that names the kind of source. Failures while expanding an
//! `@import` are [`ImportError`]s; they are logged and never reach the
//! caller.

use lantern_common::{FetchError, UrlError};
use thiserror::Error;

use crate::tokenizer::SourcePosition;

/// A malformed token that the tokenizer cannot recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// `/*` without a closing `*/`.
    #[error("{location}:{position}: unterminated comment")]
    UnterminatedComment {
        /// Base location of the input.
        location: String,
        /// Where the comment started.
        position: SourcePosition,
    },

    /// A quoted string reaching the end of the input.
    #[error("{location}:{position}: unterminated string")]
    UnterminatedString {
        /// Base location of the input.
        location: String,
        /// Where the string started.
        position: SourcePosition,
    },

    /// A backslash as the very last code point of the input.
    #[error("{location}:{position}: escape sequence at end of input")]
    EofInEscape {
        /// Base location of the input.
        location: String,
        /// Where the escape started.
        position: SourcePosition,
    },
}

/// A grammar violation within a single rule or declaration.
///
/// The parser recovers from these by skipping to the next statement
/// boundary; the offending construct is dropped from the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A token that cannot appear at this point.
    #[error("{position}: unexpected {found}")]
    UnexpectedToken {
        /// Printable form of the token.
        found: String,
        /// Where it was found.
        position: SourcePosition,
    },

    /// A selector that does not follow the selector grammar.
    #[error("{position}: invalid selector: {reason}")]
    InvalidSelector {
        /// What is wrong with it.
        reason: String,
        /// Where the selector starts.
        position: SourcePosition,
    },

    /// A declaration without `:` after the property name.
    #[error("{position}: expected `:` after property `{property}`")]
    MissingColon {
        /// The property name.
        property: String,
        /// Where the declaration starts.
        position: SourcePosition,
    },

    /// A declaration whose value is empty or contains invalid tokens.
    #[error("{position}: invalid value for property `{property}`")]
    InvalidValue {
        /// The property name.
        property: String,
        /// Where the declaration starts.
        position: SourcePosition,
    },

    /// A malformed media query.
    #[error("{position}: invalid media query")]
    InvalidMediaQuery {
        /// Where the query starts.
        position: SourcePosition,
    },

    /// An `@import` without a usable URL.
    #[error("{position}: invalid @import")]
    InvalidImport {
        /// Where the rule starts.
        position: SourcePosition,
    },
}

impl SyntaxError {
    /// Where the error occurred.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::InvalidSelector { position, .. }
            | Self::MissingColon { position, .. }
            | Self::InvalidValue { position, .. }
            | Self::InvalidMediaQuery { position }
            | Self::InvalidImport { position } => *position,
        }
    }
}

/// A failure that aborts parsing of a whole source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer failed.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The input ended inside an open block.
    #[error("{position}: unexpected end of input inside `{open}` block")]
    UnexpectedEof {
        /// The opening bracket of the unclosed block.
        open: char,
        /// Where the block was opened.
        position: SourcePosition,
    },

    /// Blocks, functions and `@media` rules nested deeper than
    /// [`MAX_NESTING_DEPTH`](crate::parser::MAX_NESTING_DEPTH).
    #[error("{position}: blocks nested deeper than {limit} levels")]
    TooDeep {
        /// The nesting limit that was exceeded.
        limit: usize,
        /// Where the block that crossed the limit was opened.
        position: SourcePosition,
    },

    /// An internal fault (a panic) caught while parsing.
    #[error("internal parser failure: {0}")]
    Internal(String),
}

/// The failure reported to callers of the parsing entry points.
#[derive(Debug, Error)]
pub enum CssError {
    /// The source could not be parsed.
    #[error("{message}: {source}")]
    Parse {
        /// Mode-specific message, e.g. "Unable to parse embedded CSS style".
        message: &'static str,
        /// What went wrong.
        #[source]
        source: ParseError,
    },

    /// The top-level stylesheet could not be fetched.
    #[error("unable to read style sheet {url}: {source}")]
    Fetch {
        /// The stylesheet URL.
        url: String,
        /// What went wrong.
        #[source]
        source: FetchError,
    },

    /// The base URL given in the options could not be resolved.
    #[error("invalid base URL `{base}`: {source}")]
    InvalidBase {
        /// The base as given.
        base: String,
        /// What went wrong.
        #[source]
        source: UrlError,
    },
}

/// A failure while expanding one `@import`.
///
/// These never fail the enclosing parse: the import contributes no rules.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import target could not be resolved.
    #[error("cannot resolve import `{href}`: {source}")]
    Resolve {
        /// The href as written.
        href: String,
        /// What went wrong.
        #[source]
        source: UrlError,
    },

    /// The imported stylesheet could not be fetched.
    #[error("cannot fetch imported style sheet {url}: {source}")]
    Fetch {
        /// The resolved URL.
        url: String,
        /// What went wrong.
        #[source]
        source: FetchError,
    },

    /// The imported stylesheet could not be parsed.
    #[error("cannot parse imported style sheet {url}: {source}")]
    Parse {
        /// The resolved URL.
        url: String,
        /// What went wrong.
        #[source]
        source: ParseError,
    },

    /// The import would re-enter a stylesheet that is still being expanded.
    #[error("cyclic import of {url}")]
    Cyclic {
        /// The resolved URL.
        url: String,
    },
}

impl ImportError {
    /// Classify a failure of loading the imported sheet at `url`.
    pub(crate) fn from_load(url: &str, error: CssError) -> Self {
        match error {
            CssError::Fetch { source, .. } => Self::Fetch {
                url: url.to_string(),
                source,
            },
            CssError::Parse { source, .. } => Self::Parse {
                url: url.to_string(),
                source,
            },
            CssError::InvalidBase { base, source } => Self::Resolve { href: base, source },
        }
    }
}
