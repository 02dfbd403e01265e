//! [§ 3 Syntax](https://www.w3.org/TR/mediaqueries-3/#syntax) of media
//! query lists, applied to component values.

use super::syntax::{ComponentValue, to_css_text};
use super::values::{to_terms, trim_whitespace};
use crate::error::SyntaxError;
use crate::media::{MediaExpression, MediaQuery, MediaQueryList};
use crate::tokenizer::{CSSToken, SourcePosition};

/// Parse a comma-separated media query list.
///
/// [§ 3.1 Error Handling](https://www.w3.org/TR/mediaqueries-3/#error-handling)
///
/// "Malformed media query ... the media query is represented as `not all`."
/// Every replaced query is reported in the returned errors.
pub(crate) fn parse_media_query_list(
    values: &[ComponentValue],
    position: SourcePosition,
) -> (MediaQueryList, Vec<SyntaxError>) {
    let mut queries = Vec::new();
    let mut errors = Vec::new();

    if values.iter().all(ComponentValue::is_whitespace) {
        return (MediaQueryList::new(), errors);
    }

    for part in values.split(|v| matches!(v, ComponentValue::Token(CSSToken::Comma))) {
        if let Some(query) = parse_media_query(part) {
            queries.push(query);
        } else {
            log::debug!(
                "{position}: replacing malformed media query `{}` by `not all`",
                to_css_text(part)
            );
            errors.push(SyntaxError::InvalidMediaQuery { position });
            queries.push(MediaQuery::not_all());
        }
    }

    (MediaQueryList::from(queries), errors)
}

/// `[only | not]? media_type [and expression]*` or
/// `expression [and expression]*`
fn parse_media_query(values: &[ComponentValue]) -> Option<MediaQuery> {
    let mut iter = values.iter().filter(|v| !v.is_whitespace()).peekable();
    let mut query = MediaQuery::default();

    let first = match iter.peek() {
        Some(ComponentValue::Token(CSSToken::Ident(first))) => Some(first.to_ascii_lowercase()),
        _ => None,
    };
    if let Some(first) = first {
        let _ = iter.next();
        let media_type = match first.as_str() {
            "only" | "not" => {
                query.only = first == "only";
                query.negated = first == "not";
                match iter.next() {
                    Some(ComponentValue::Token(CSSToken::Ident(media_type))) => {
                        media_type.to_ascii_lowercase()
                    }
                    _ => return None,
                }
            }
            _ => first,
        };
        if matches!(media_type.as_str(), "and" | "only" | "not") {
            return None;
        }
        query.media_type = Some(media_type);

        // The type may be followed by `and (expr)` pairs only.
        if iter.peek().is_none() {
            return Some(query);
        }
        expect_and(&mut iter)?;
    }

    // [§ 3 Syntax] expression [ AND S* expression ]*
    loop {
        match iter.next() {
            Some(ComponentValue::Block { token: '(', value }) => {
                query.expressions.push(parse_expression(value)?);
            }
            _ => return None,
        }
        if iter.peek().is_none() {
            return Some(query);
        }
        expect_and(&mut iter)?;
    }
}

fn expect_and<'a, I>(iter: &mut I) -> Option<()>
where
    I: Iterator<Item = &'a ComponentValue>,
{
    match iter.next() {
        Some(ComponentValue::Token(token)) if token.is_ident("and") => Some(()),
        _ => None,
    }
}

/// `( media_feature [: expr]? )`
fn parse_expression(values: &[ComponentValue]) -> Option<MediaExpression> {
    let values = trim_whitespace(values.to_vec());
    let (feature, rest) = values.split_first()?;
    let ComponentValue::Token(CSSToken::Ident(feature)) = feature else {
        return None;
    };

    let rest = trim_whitespace(rest.to_vec());
    let value = match rest.split_first() {
        None => Vec::new(),
        Some((ComponentValue::Token(CSSToken::Colon), value)) => {
            let terms = to_terms(value)?;
            if terms.is_empty() {
                return None;
            }
            terms
        }
        Some(_) => return None,
    };

    Some(MediaExpression {
        feature: feature.to_ascii_lowercase(),
        value,
    })
}
