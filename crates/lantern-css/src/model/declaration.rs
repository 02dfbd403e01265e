//! Declarations and their value terms.

use core::fmt;

use serde::Serialize;

/// [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
///
/// One component of a declaration value. Values are not validated per
/// property; terms only record what was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Term {
    /// A keyword, e.g. `red` or `inherit`.
    Ident(String),
    /// A quoted string, without the quotes.
    String(String),
    /// A number with a fractional part or exponent.
    Number(f64),
    /// A number without a fractional part.
    Integer(i64),
    /// A percentage, without the `%`.
    Percentage(f64),
    /// A number with a unit, e.g. `12px`.
    Dimension {
        /// The numeric part.
        value: f64,
        /// The unit, lower-cased.
        unit: String,
    },
    /// A hash, usually a color such as `#fff`, without the `#`.
    Hash(String),
    /// The target of a `url(...)`.
    Uri(String),
    /// A function with its argument terms, e.g. `rgb(0, 0, 0)`.
    Function {
        /// Function name, lower-cased.
        name: String,
        /// Argument terms, separators included as operators.
        args: Vec<Term>,
    },
    /// A separator or other delimiter such as `,` or `/`.
    Operator(char),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "\"{}\"", value.replace('"', "\\\"")),
            Self::Number(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Percentage(value) => write!(f, "{value}%"),
            Self::Dimension { value, unit } => write!(f, "{value}{unit}"),
            Self::Hash(value) => write!(f, "#{value}"),
            Self::Uri(value) => write!(f, "url({value})"),
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                write_terms(f, args)?;
                write!(f, ")")
            }
            Self::Operator(c) => write!(f, "{c}"),
        }
    }
}

/// Write terms separated by single spaces, with no space before a comma.
pub(crate) fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 && !matches!(term, Term::Operator(',')) {
            f.write_str(" ")?;
        }
        write!(f, "{term}")?;
    }
    Ok(())
}

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A property with its value, e.g. `color: red !important`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    /// Property name, lower-cased.
    pub property: String,
    /// Value terms in source order.
    pub terms: Vec<Term>,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

impl Declaration {
    /// Returns the single term of a one-term value.
    #[must_use]
    pub fn single_term(&self) -> Option<&Term> {
        match self.terms.as_slice() {
            [term] => Some(term),
            _ => None,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.property)?;
        write_terms(f, &self.terms)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// Write `{ decl; decl; }`.
pub(crate) fn write_declaration_block(
    f: &mut fmt::Formatter<'_>,
    declarations: &[Declaration],
) -> fmt::Result {
    f.write_str("{")?;
    for declaration in declarations {
        write!(f, " {declaration};")?;
    }
    f.write_str(" }")
}
