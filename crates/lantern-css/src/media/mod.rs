//! Media queries per [Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/).
//!
//! The query grammar itself lives in the syntax parser, which shares it
//! between `@media`, `@import` and the standalone entry point below.

/// Auto-import acceptance policy.
pub mod policy;
/// Media query model.
pub mod query;

pub use policy::AutoImportMedia;
pub use query::{MediaExpression, MediaQuery, MediaQueryList};

use crate::parser::{ParseMode, Parser, SyntaxTree};
use crate::tokenizer::tokenize;

/// Parse a media query list such as `"screen and (min-width: 100px)"`.
///
/// Never fails: an empty string gives an empty list, and a string that
/// does not tokenize or holds a malformed query gives `None` after logging
/// a warning.
#[must_use]
pub fn parse_media_query(text: &str) -> Option<MediaQueryList> {
    if text.trim().is_empty() {
        return Some(MediaQueryList::new());
    }

    let parsed = tokenize(text, Some("<media>"))
        .map_err(crate::error::ParseError::from)
        .and_then(|tokens| Parser::new(tokens).parse(ParseMode::MediaQueryList));

    match parsed {
        Ok(SyntaxTree::MediaQueries { media, errors }) if errors.is_empty() => Some(media),
        Ok(SyntaxTree::MediaQueries { errors, .. }) => {
            for error in &errors {
                log::debug!("{error}");
            }
            log::warn!("Malformed media query {text}");
            None
        }
        Ok(_) => None,
        Err(error) => {
            log::warn!("Malformed media query {text}: {error}");
            None
        }
    }
}
