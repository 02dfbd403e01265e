//! [Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/) model.

use core::fmt;

use serde::Serialize;

use crate::model::{Term, write_terms};

/// [§ 3 Media Queries](https://www.w3.org/TR/mediaqueries-3/#media0)
///
/// "A media feature is a single test for a feature of the output device",
/// e.g. `(min-width: 100px)`. `value` is empty for boolean features such as
/// `(color)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaExpression {
    /// Feature name, lower-cased.
    pub feature: String,
    /// Value terms after the `:`.
    pub value: Vec<Term>,
}

impl fmt::Display for MediaExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.feature)?;
        if !self.value.is_empty() {
            f.write_str(": ")?;
            write_terms(f, &self.value)?;
        }
        f.write_str(")")
    }
}

/// [§ 2 Media Queries](https://www.w3.org/TR/mediaqueries-3/#media0)
///
/// "A media query consists of a media type and zero or more expressions
/// that check for the conditions of particular media features."
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaQuery {
    /// The `only` keyword was present.
    pub only: bool,
    /// The `not` keyword was present.
    pub negated: bool,
    /// Media type, lower-cased; `None` when the query starts with an
    /// expression (which implies `all`).
    pub media_type: Option<String>,
    /// Feature expressions joined by `and`.
    pub expressions: Vec<MediaExpression>,
}

impl MediaQuery {
    /// A query on a media type alone.
    #[must_use]
    pub fn for_type(media_type: impl Into<String>) -> Self {
        Self {
            media_type: Some(media_type.into()),
            ..Self::default()
        }
    }

    /// [§ 3.1 Error Handling](https://www.w3.org/TR/mediaqueries-3/#error-handling)
    ///
    /// "A media query that does not match the grammar ... is to be
    /// represented by `not all`."
    #[must_use]
    pub fn not_all() -> Self {
        Self {
            negated: true,
            ..Self::for_type("all")
        }
    }

    /// Returns true when the media type is absent or `all`.
    #[must_use]
    pub fn is_any_type(&self) -> bool {
        self.media_type
            .as_deref()
            .is_none_or(|media_type| media_type == "all")
    }

    /// Returns true for a query that restricts nothing: `all` (or no type)
    /// without a qualifier and without expressions.
    #[must_use]
    pub fn is_unconditioned(&self) -> bool {
        !self.negated && self.is_any_type() && self.expressions.is_empty()
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.only {
            parts.push("only".to_string());
        }
        if self.negated {
            parts.push("not".to_string());
        }
        if let Some(media_type) = &self.media_type {
            parts.push(media_type.clone());
        }
        for (i, expression) in self.expressions.iter().enumerate() {
            if i > 0 || self.media_type.is_some() {
                parts.push("and".to_string());
            }
            parts.push(expression.to_string());
        }
        f.write_str(&parts.join(" "))
    }
}

/// A comma-separated list of media queries; matches if any query matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MediaQueryList(pub Vec<MediaQuery>);

impl MediaQueryList {
    /// An empty list, imposing no restriction.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns true when the list imposes no restriction: it is empty or
    /// holds an unconditioned `all` query.
    #[must_use]
    pub fn matches_empty(&self) -> bool {
        self.0.is_empty() || self.0.iter().any(MediaQuery::is_unconditioned)
    }

    /// Number of queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list has no queries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the queries.
    pub fn iter(&self) -> core::slice::Iter<'_, MediaQuery> {
        self.0.iter()
    }
}

impl From<Vec<MediaQuery>> for MediaQueryList {
    fn from(queries: Vec<MediaQuery>) -> Self {
        Self(queries)
    }
}

impl<'a> IntoIterator for &'a MediaQueryList {
    type Item = &'a MediaQuery;
    type IntoIter = core::slice::Iter<'a, MediaQuery>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for MediaQueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, query) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{query}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_without_type_are_joined_by_and() {
        let query = MediaQuery {
            expressions: vec![
                MediaExpression {
                    feature: "color".into(),
                    value: Vec::new(),
                },
                MediaExpression {
                    feature: "min-width".into(),
                    value: vec![Term::Dimension {
                        value: 100.0,
                        unit: "px".into(),
                    }],
                },
            ],
            ..MediaQuery::default()
        };
        assert_eq!(query.to_string(), "(color) and (min-width: 100px)");
    }

    #[test]
    fn not_all_is_not_unconditioned() {
        assert!(!MediaQuery::not_all().is_unconditioned());
        assert!(MediaQuery::for_type("all").is_unconditioned());
        assert!(!MediaQueryList(vec![MediaQuery::not_all()]).matches_empty());
    }
}
