//! The syntax tree handed from the parser to the tree builder.
//!
//! Nodes keep the shape of the source: selectors are already split into
//! steps and attribute values, declaration values are still component
//! values. Everything the parser could not make sense of has been dropped.

use core::fmt;

use crate::media::MediaQueryList;
use crate::model::{AttributeOperator, Combinator};
use crate::tokenizer::{CSSToken, SourcePosition};

/// Which grammar to apply to a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// The contents of a `style` attribute: `decl (; decl)*`.
    DeclarationList,
    /// A whole stylesheet.
    Stylesheet,
    /// A standalone media query list.
    MediaQueryList,
}

/// [§ 5.3.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token.
    Token(CSSToken),
    /// A function with its contents.
    Function {
        /// The function name.
        name: String,
        /// The function arguments.
        value: Vec<ComponentValue>,
    },
    /// A simple block.
    Block {
        /// The opening token character.
        token: char,
        /// The block contents.
        value: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    /// Returns true for a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Token(CSSToken::Whitespace))
    }

    /// The token, if this is a preserved token.
    #[must_use]
    pub const fn as_token(&self) -> Option<&CSSToken> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Function { name, value } => {
                write!(f, "{name}(")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Self::Block { token, value } => {
                let close = match token {
                    '{' => '}',
                    '[' => ']',
                    _ => ')',
                };
                write!(f, "{token}")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

/// Serialize component values back to text, trimmed.
pub(crate) fn to_css_text(values: &[ComponentValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<String>()
        .trim()
        .to_string()
}

/// One simple selector as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelectorNode {
    /// `div`
    Type(String),
    /// `*`
    Universal,
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// `[name op value]`
    Attribute {
        /// Attribute name.
        name: String,
        /// Comparison.
        operator: AttributeOperator,
        /// Value, empty when only existence is tested.
        value: String,
        /// Whether the value was quoted.
        is_string_value: bool,
    },
    /// `:name`, `::name` or `:function(argument)`
    Pseudo {
        /// Pseudo-class name, or the argument text of a function.
        name: String,
        /// Function name of a functional pseudo-class.
        function: Option<String>,
    },
}

/// A compound selector and the combinator that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStepNode {
    /// Simple selectors applying to one element.
    pub compound: Vec<SimpleSelectorNode>,
    /// Combinator to the next step, `None` on the last step.
    pub combinator: Option<Combinator>,
}

/// A complex selector, one entry of a selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorNode {
    /// Steps in source order.
    pub steps: Vec<SelectorStepNode>,
}

/// A declaration as written.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    /// Property name as written.
    pub property: String,
    /// Value without surrounding whitespace and without `!important`.
    pub value: Vec<ComponentValue>,
    /// Whether `!important` was present.
    pub important: bool,
    /// Where the declaration starts.
    pub position: SourcePosition,
}

/// A rule of a stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    /// `@import "href" media;`
    Import {
        /// Target as written.
        href: String,
        /// Media condition, empty when absent.
        media: MediaQueryList,
        /// Where the rule starts.
        position: SourcePosition,
    },
    /// `selectors { declarations }`
    Set {
        /// The selector group.
        selectors: Vec<SelectorNode>,
        /// The declaration block.
        declarations: Vec<DeclarationNode>,
        /// Where the rule starts.
        position: SourcePosition,
    },
    /// `@media media { rules }`
    Media {
        /// Media condition.
        media: MediaQueryList,
        /// Nested rules.
        rules: Vec<RuleNode>,
        /// Where the rule starts.
        position: SourcePosition,
    },
    /// `@page name:pseudo { declarations }`
    Page {
        /// Page name.
        name: Option<String>,
        /// Page pseudo-class, without the colon.
        pseudo: Option<String>,
        /// The declaration block.
        declarations: Vec<DeclarationNode>,
        /// Where the rule starts.
        position: SourcePosition,
    },
}

/// The result of parsing one token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxTree {
    /// Parsed in [`ParseMode::DeclarationList`].
    Declarations(Vec<DeclarationNode>),
    /// Parsed in [`ParseMode::Stylesheet`].
    Stylesheet(Vec<RuleNode>),
    /// Parsed in [`ParseMode::MediaQueryList`]. Malformed queries have been
    /// replaced by `not all` and reported in `errors`.
    MediaQueries {
        /// The query list.
        media: MediaQueryList,
        /// One entry per malformed query.
        errors: Vec<crate::error::SyntaxError>,
    },
}
