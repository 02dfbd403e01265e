//! Selector model per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).

use core::fmt;

use serde::Serialize;

/// Opaque handle of the element an inline style belongs to.
///
/// The pipeline never looks inside it; embedders map it back onto their
/// own document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementRef(pub usize);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeOperator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]` "a whitespace-separated list of words, one of which is exactly val"
    Includes,
    /// `[attr|=value]` "exactly val or beginning with val immediately followed by -"
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

impl AttributeOperator {
    /// The operator as written in CSS, empty for [`Self::Exists`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
        }
    }

    /// Map the delimiter preceding `=` onto an operator.
    pub(crate) const fn from_prefix(c: char) -> Option<Self> {
        match c {
            '~' => Some(Self::Includes),
            '|' => Some(Self::DashMatch),
            '^' => Some(Self::Prefix),
            '$' => Some(Self::Suffix),
            '*' => Some(Self::Substring),
            _ => None,
        }
    }
}

/// A simple selector: a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Selector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// or, as `*`, the [universal selector](https://www.w3.org/TR/selectors-4/#universal-selector).
    ElementName(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ElementClass(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ElementId(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ElementAttribute {
        /// Attribute name.
        name: String,
        /// How the value is compared.
        operator: AttributeOperator,
        /// Value to compare against, empty for [`AttributeOperator::Exists`].
        value: String,
        /// Whether the value was written as a quoted string.
        is_string_value: bool,
    },

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes),
    /// pseudo-elements and page pseudo-classes.
    ///
    /// For a functional pseudo-class such as `:nth-child(2n+1)`, `function`
    /// holds the function name and `name` its argument text.
    PseudoPage {
        /// Pseudo-class name, or the argument of a functional pseudo-class.
        name: String,
        /// Function name of a functional pseudo-class.
        function: Option<String>,
    },

    /// The element an inline `style` attribute is attached to.
    ElementRef(ElementRef),
}

impl Selector {
    /// Returns true for the universal selector `*`.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        matches!(self, Self::ElementName(name) if name == "*")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementName(name) => write!(f, "{name}"),
            Self::ElementClass(class) => write!(f, ".{class}"),
            Self::ElementId(id) => write!(f, "#{id}"),
            Self::ElementAttribute {
                name,
                operator: AttributeOperator::Exists,
                ..
            } => write!(f, "[{name}]"),
            Self::ElementAttribute {
                name,
                operator,
                value,
                is_string_value,
            } => {
                if *is_string_value {
                    write!(f, "[{name}{}\"{value}\"]", operator.as_str())
                } else {
                    write!(f, "[{name}{}{value}]", operator.as_str())
                }
            }
            Self::PseudoPage {
                name,
                function: Some(function),
            } => write!(f, ":{function}({name})"),
            Self::PseudoPage {
                name,
                function: None,
            } => write!(f, ":{name}"),
            Self::ElementRef(element) => write!(f, "{element}"),
        }
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A descendant combinator is whitespace that separates two compound selectors."
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A child combinator is a greater-than sign (>) that separates two compound selectors."
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    SubsequentSibling,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::NextSibling => " + ",
            Self::SubsequentSibling => " ~ ",
        })
    }
}

/// One compound selector together with the combinator linking it to the
/// next step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SelectorStep {
    /// Simple selectors that all apply to the same element.
    pub compound: Vec<Selector>,
    /// Combinator to the next step, `None` on the last step.
    pub combinator: Option<Combinator>,
}

/// [§ 4 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a sequence of one or more compound selectors
/// separated by combinators."
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CombinedSelector {
    /// Steps in source order; the last one is the subject.
    pub steps: Vec<SelectorStep>,
}

impl CombinedSelector {
    /// A selector consisting of a single compound.
    #[must_use]
    pub fn single(compound: Vec<Selector>) -> Self {
        Self {
            steps: vec![SelectorStep {
                compound,
                combinator: None,
            }],
        }
    }

    /// The compound the selector applies to (the last step).
    #[must_use]
    pub fn subject(&self) -> Option<&[Selector]> {
        self.steps.last().map(|step| step.compound.as_slice())
    }

    /// Returns true if the selector has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for CombinedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            for selector in &step.compound {
                write!(f, "{selector}")?;
            }
            if let Some(combinator) = step.combinator {
                write!(f, "{combinator}")?;
            }
        }
        Ok(())
    }
}
