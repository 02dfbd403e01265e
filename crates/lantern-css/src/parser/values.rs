//! Helpers over component values shared by declarations and media
//! expressions.

use super::syntax::ComponentValue;
use crate::model::Term;
use crate::tokenizer::{CSSToken, NumericType};

/// Check if the value ends with !important.
///
/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "A declaration is important if it has a !important annotation, i.e.
/// if the last two (non-whitespace, non-comment) tokens in its value are
/// a <delim-token> with the value "!" followed by an <ident-token> with
/// a value that is an ASCII case-insensitive match for "important"."
pub(crate) fn check_important(value: &[ComponentValue]) -> bool {
    important_start(value).is_some()
}

/// Remove a trailing `!important` and surrounding whitespace.
pub(crate) fn trim_important(mut value: Vec<ComponentValue>) -> Vec<ComponentValue> {
    if let Some(start) = important_start(&value) {
        value.truncate(start);
    }
    trim_whitespace(value)
}

/// Index of the `!` of a trailing `!important`.
fn important_start(value: &[ComponentValue]) -> Option<usize> {
    let mut iter = value.iter().enumerate().rev().filter(|(_, v)| !v.is_whitespace());

    // STEP 1: Check for ident "important"
    match iter.next() {
        Some((_, ComponentValue::Token(token))) if token.is_ident("important") => {}
        _ => return None,
    }

    // STEP 2: Check for !
    match iter.next() {
        Some((index, ComponentValue::Token(CSSToken::Delim('!')))) => Some(index),
        _ => None,
    }
}

/// Remove leading and trailing whitespace.
pub(crate) fn trim_whitespace(mut value: Vec<ComponentValue>) -> Vec<ComponentValue> {
    while value.last().is_some_and(ComponentValue::is_whitespace) {
        let _ = value.pop();
    }
    let leading = value.iter().take_while(|v| v.is_whitespace()).count();
    let _ = value.drain(..leading);
    value
}

/// Convert component values into value terms.
///
/// Whitespace separates terms and is dropped. Returns `None` when a value
/// cannot be represented as terms: bad tokens, blocks, or structural
/// tokens that have no place in a value.
pub(crate) fn to_terms(values: &[ComponentValue]) -> Option<Vec<Term>> {
    values
        .iter()
        .filter(|v| !v.is_whitespace())
        .map(to_term)
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn to_term(value: &ComponentValue) -> Option<Term> {
    let term = match value {
        ComponentValue::Token(token) => match token {
            CSSToken::Ident(v) => Term::Ident(v.clone()),
            CSSToken::String(v) => Term::String(v.clone()),
            CSSToken::Number {
                value,
                numeric_type: NumericType::Integer,
            } => Term::Integer(*value as i64),
            CSSToken::Number { value, .. } => Term::Number(*value),
            CSSToken::Percentage { value, .. } => Term::Percentage(*value),
            CSSToken::Dimension { value, unit, .. } => Term::Dimension {
                value: *value,
                unit: unit.to_ascii_lowercase(),
            },
            CSSToken::Hash { value, .. } => Term::Hash(value.clone()),
            CSSToken::Url(v) => Term::Uri(v.clone()),
            CSSToken::Comma => Term::Operator(','),
            CSSToken::Delim(c) if !matches!(c, '!' | '\\' | ';') => Term::Operator(*c),
            _ => return None,
        },
        ComponentValue::Function { name, value } => {
            let args = to_terms(value)?;
            if name.eq_ignore_ascii_case("url") {
                // `url("...")` tokenizes as a function around a string.
                if let [Term::String(uri)] = args.as_slice() {
                    return Some(Term::Uri(uri.clone()));
                }
            }
            Term::Function {
                name: name.to_ascii_lowercase(),
                args,
            }
        }
        ComponentValue::Block { .. } => return None,
    };
    Some(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(token: CSSToken) -> ComponentValue {
        ComponentValue::Token(token)
    }

    #[test]
    fn important_with_inner_whitespace_is_detected() {
        let value = vec![
            tok(CSSToken::Ident("red".into())),
            tok(CSSToken::Whitespace),
            tok(CSSToken::Delim('!')),
            tok(CSSToken::Whitespace),
            tok(CSSToken::Ident("IMPORTANT".into())),
            tok(CSSToken::Whitespace),
        ];
        assert!(check_important(&value));
        assert_eq!(
            trim_important(value),
            vec![tok(CSSToken::Ident("red".into()))]
        );
    }

    #[test]
    fn bang_inside_value_is_not_a_term() {
        let value = vec![tok(CSSToken::Delim('!')), tok(CSSToken::Ident("x".into()))];
        assert!(!check_important(&value));
        assert_eq!(to_terms(&value), None);
    }

    #[test]
    fn quoted_url_function_becomes_uri() {
        let value = vec![ComponentValue::Function {
            name: "URL".into(),
            value: vec![tok(CSSToken::String("a.png".into()))],
        }];
        assert_eq!(to_terms(&value), Some(vec![Term::Uri("a.png".into())]));
    }
}
