//! Rule blocks and their cascade priority.

use core::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::declaration::{Declaration, write_declaration_block};
use super::selector::{CombinedSelector, Selector};
use crate::media::MediaQueryList;

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-origin)
///
/// "Each style rule has a cascade origin, which determines where it enters
/// the cascade."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Origin {
    /// Default styles of the user agent.
    UserAgent,
    /// Styles supplied by the reader.
    User,
    /// Styles of the document.
    #[default]
    Author,
    /// Styles from a `style` attribute.
    Inline,
}

/// Cascade classification of a rule block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Priority {
    /// Where the rule comes from.
    pub origin: Origin,
    /// Whether the block as a whole is important.
    pub important: bool,
}

impl Priority {
    /// A normal (not important) priority of the given origin.
    #[must_use]
    pub const fn new(origin: Origin) -> Self {
        Self {
            origin,
            important: false,
        }
    }
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A style rule: selector group and declaration block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    /// Cascade classification.
    pub priority: Priority,
    /// The rule applies when any of the selectors matches.
    pub selectors: Vec<CombinedSelector>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// [§ 7.2 @media](https://www.w3.org/TR/css-conditional-3/#at-media)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMedia {
    /// Cascade classification.
    pub priority: Priority,
    /// Condition under which the nested rules apply.
    pub media: MediaQueryList,
    /// Nested rules in source order.
    pub rules: Vec<RuleBlock>,
}

/// [§ 3 Page Selectors](https://www.w3.org/TR/css-page-3/#page-selectors)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulePage {
    /// Cascade classification.
    pub priority: Priority,
    /// Named page, e.g. `@page toc`.
    pub name: Option<String>,
    /// Page pseudo-class such as `:first`.
    pub pseudo: Option<Selector>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// [§ 2 @import](https://www.w3.org/TR/css-cascade-4/#at-import)
///
/// Imports are expanded while parsing, so this block never appears in a
/// parsed stylesheet. It remains constructible for callers that model
/// imports lazily.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleImport {
    /// Cascade classification.
    pub priority: Priority,
    /// The import target.
    pub uri: String,
    /// Condition under which the import applies.
    pub media: MediaQueryList,
}

/// A top-level or nested CSS construct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RuleBlock {
    /// A style rule.
    Set(RuleSet),
    /// An `@media` block.
    Media(RuleMedia),
    /// An `@page` block.
    Page(RulePage),
    /// An unexpanded `@import`.
    Import(RuleImport),
}

impl RuleBlock {
    /// Cascade classification of the block.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        match self {
            Self::Set(rule) => rule.priority,
            Self::Media(rule) => rule.priority,
            Self::Page(rule) => rule.priority,
            Self::Import(rule) => rule.priority,
        }
    }

    /// The rule set, if this block is one.
    #[must_use]
    pub const fn as_set(&self) -> Option<&RuleSet> {
        match self {
            Self::Set(rule) => Some(rule),
            _ => None,
        }
    }

    /// The media block, if this block is one.
    #[must_use]
    pub const fn as_media(&self) -> Option<&RuleMedia> {
        match self {
            Self::Media(rule) => Some(rule),
            _ => None,
        }
    }
}

impl fmt::Display for RuleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(rule) => {
                for (i, selector) in rule.selectors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{selector}")?;
                }
                if !rule.selectors.is_empty() {
                    f.write_str(" ")?;
                }
                write_declaration_block(f, &rule.declarations)
            }
            Self::Media(rule) => {
                write!(f, "@media {} {{", rule.media)?;
                for nested in &rule.rules {
                    write!(f, " {nested}")?;
                }
                f.write_str(" }")
            }
            Self::Page(rule) => {
                f.write_str("@page")?;
                if let Some(name) = &rule.name {
                    write!(f, " {name}")?;
                }
                if let Some(pseudo) = &rule.pseudo {
                    if rule.name.is_none() {
                        f.write_str(" ")?;
                    }
                    write!(f, "{pseudo}")?;
                }
                f.write_str(" ")?;
                write_declaration_block(f, &rule.declarations)
            }
            Self::Import(rule) => {
                write!(f, "@import url({})", rule.uri)?;
                if !rule.media.is_empty() {
                    write!(f, " {}", rule.media)?;
                }
                f.write_str(";")
            }
        }
    }
}

/// The fully built, import-expanded rules of one source.
pub type RuleList = Vec<RuleBlock>;

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn origin_parses_kebab_case() {
        assert_eq!(Origin::from_str("user-agent"), Ok(Origin::UserAgent));
        assert_eq!(Origin::from_str("Author"), Ok(Origin::Author));
        assert_eq!(Origin::Inline.to_string(), "inline");
    }

    #[test]
    fn page_rule_serializes_name_and_pseudo() {
        let rule = RuleBlock::Page(RulePage {
            priority: Priority::default(),
            name: None,
            pseudo: Some(Selector::PseudoPage {
                name: "first".into(),
                function: None,
            }),
            declarations: Vec::new(),
        });
        assert_eq!(rule.to_string(), "@page :first { }");
    }
}
