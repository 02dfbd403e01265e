//! Which conditioned `@import`s get expanded while parsing.
//!
//! No device is evaluated here. The policy only compares media types:
//! feature expressions are carried along but always considered satisfied.

use super::parse_media_query;
use super::query::{MediaQuery, MediaQueryList};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Acceptance {
    Nothing,
    Everything,
    Types(Vec<String>),
}

/// Acceptance policy for `@import` media conditions.
///
/// An import is honoured when its media list imposes no restriction and
/// [`matches_empty`](Self::matches_empty) holds, or when
/// [`matches_one_of`](Self::matches_one_of) accepts its media list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoImportMedia {
    accept_empty: bool,
    acceptance: Acceptance,
}

impl AutoImportMedia {
    /// Honour only imports without a media condition.
    #[must_use]
    pub const fn unconditioned() -> Self {
        Self {
            accept_empty: true,
            acceptance: Acceptance::Nothing,
        }
    }

    /// Honour every import.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            accept_empty: true,
            acceptance: Acceptance::Everything,
        }
    }

    /// Honour no import at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            accept_empty: false,
            acceptance: Acceptance::Nothing,
        }
    }

    /// Honour unconditioned imports and imports for the given media types
    /// (ASCII case-insensitive). Listing `all` accepts every type.
    #[must_use]
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let types: Vec<String> = types
            .into_iter()
            .map(|t| t.as_ref().trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if types.iter().any(|t| t == "all") {
            return Self::all();
        }
        Self {
            accept_empty: true,
            acceptance: Acceptance::Types(types),
        }
    }

    /// Build a policy from a media query string such as `"screen, print"`.
    ///
    /// The media types named by the non-negated queries are accepted. A
    /// malformed string yields [`unconditioned`](Self::unconditioned).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let Some(list) = parse_media_query(text) else {
            return Self::unconditioned();
        };
        if list.is_empty() {
            return Self::unconditioned();
        }
        Self::for_types(
            list.iter()
                .filter(|query| !query.negated)
                .map(|query| query.media_type.as_deref().unwrap_or("all")),
        )
    }

    /// Whether imports without a media condition are honoured.
    #[must_use]
    pub const fn matches_empty(&self) -> bool {
        self.accept_empty
    }

    /// Whether at least one query of `media` is accepted.
    #[must_use]
    pub fn matches_one_of(&self, media: &MediaQueryList) -> bool {
        media.iter().any(|query| self.matches(query))
    }

    /// Whether a single query is accepted.
    ///
    /// The media type decides; `not` inverts the type test.
    #[must_use]
    pub fn matches(&self, query: &MediaQuery) -> bool {
        match &self.acceptance {
            Acceptance::Nothing => false,
            Acceptance::Everything => !(query.negated && query.is_any_type()),
            Acceptance::Types(types) => {
                let type_matches = query.is_any_type()
                    || query
                        .media_type
                        .as_ref()
                        .is_some_and(|media_type| types.contains(media_type));
                type_matches != query.negated
            }
        }
    }

    /// Decide whether an import with the given media list is expanded.
    #[must_use]
    pub fn honours(&self, media: &MediaQueryList) -> bool {
        (media.matches_empty() && self.matches_empty()) || self.matches_one_of(media)
    }
}

impl Default for AutoImportMedia {
    fn default() -> Self {
        Self::unconditioned()
    }
}
