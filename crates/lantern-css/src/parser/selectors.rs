//! Selector grammar per [Selectors Level 4](https://www.w3.org/TR/selectors-4/),
//! applied to the prelude of a qualified rule.

use super::syntax::{ComponentValue, SelectorNode, SelectorStepNode, SimpleSelectorNode, to_css_text};
use crate::error::SyntaxError;
use crate::model::{AttributeOperator, Combinator};
use crate::tokenizer::{CSSToken, HashType, SourcePosition};

/// [§ 5.1 Selector Lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A selector list is a comma-separated list of selectors." If any entry
/// is invalid, the whole list is.
pub(crate) fn parse_selector_group(
    prelude: &[ComponentValue],
    position: SourcePosition,
) -> Result<Vec<SelectorNode>, SyntaxError> {
    prelude
        .split(|v| matches!(v, ComponentValue::Token(CSSToken::Comma)))
        .map(|part| parse_complex_selector(part, position))
        .collect()
}

/// Builds one complex selector left to right.
struct ComplexSelectorBuilder {
    steps: Vec<SelectorStepNode>,
    compound: Vec<SimpleSelectorNode>,
    /// Combinator seen since the last compound; `explicit` is false for
    /// whitespace alone.
    pending: Option<(Combinator, bool)>,
    position: SourcePosition,
}

impl ComplexSelectorBuilder {
    const fn new(position: SourcePosition) -> Self {
        Self {
            steps: Vec::new(),
            compound: Vec::new(),
            pending: None,
            position,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SyntaxError {
        SyntaxError::InvalidSelector {
            reason: reason.into(),
            position: self.position,
        }
    }

    fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.compound.is_empty()
    }

    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    fn whitespace(&mut self) {
        if !self.compound.is_empty() && self.pending.is_none() {
            self.pending = Some((Combinator::Descendant, false));
        }
    }

    fn combinator(&mut self, combinator: Combinator) -> Result<(), SyntaxError> {
        if self.is_empty() {
            return Err(self.error(format!("selector starts with combinator {combinator}")));
        }
        if matches!(self.pending, Some((_, true))) {
            return Err(self.error("two combinators in a row"));
        }
        self.pending = Some((combinator, true));
        Ok(())
    }

    /// Append a simple selector, closing the previous compound when a
    /// combinator separates them.
    fn push(&mut self, selector: SimpleSelectorNode) -> Result<(), SyntaxError> {
        if let Some((combinator, _)) = self.pending.take() {
            self.steps.push(SelectorStepNode {
                compound: core::mem::take(&mut self.compound),
                combinator: Some(combinator),
            });
        }
        // [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
        // "If it contains a type selector or universal selector, that selector
        // must come first in the sequence."
        if matches!(
            selector,
            SimpleSelectorNode::Type(_) | SimpleSelectorNode::Universal
        ) && !self.compound.is_empty()
        {
            return Err(self.error("type selector must come first in a compound"));
        }
        self.compound.push(selector);
        Ok(())
    }

    fn finish(mut self) -> Result<SelectorNode, SyntaxError> {
        if self.compound.is_empty() {
            return Err(if self.steps.is_empty() {
                self.error("empty selector")
            } else {
                self.error("selector ends with a combinator")
            });
        }
        if matches!(self.pending, Some((_, true))) {
            return Err(self.error("selector ends with a combinator"));
        }
        self.steps.push(SelectorStepNode {
            compound: self.compound,
            combinator: None,
        });
        Ok(SelectorNode { steps: self.steps })
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
fn parse_complex_selector(
    values: &[ComponentValue],
    position: SourcePosition,
) -> Result<SelectorNode, SyntaxError> {
    let mut builder = ComplexSelectorBuilder::new(position);
    let mut iter = values.iter().peekable();

    while let Some(value) = iter.next() {
        match value {
            ComponentValue::Token(CSSToken::Whitespace) => builder.whitespace(),

            ComponentValue::Token(CSSToken::Delim('>')) => builder.combinator(Combinator::Child)?,
            ComponentValue::Token(CSSToken::Delim('+')) => {
                builder.combinator(Combinator::NextSibling)?;
            }
            ComponentValue::Token(CSSToken::Delim('~')) => {
                builder.combinator(Combinator::SubsequentSibling)?;
            }

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            ComponentValue::Token(CSSToken::Ident(name)) => {
                builder.push(SimpleSelectorNode::Type(name.clone()))?;
            }

            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            ComponentValue::Token(CSSToken::Delim('*')) => {
                builder.push(SimpleSelectorNode::Universal)?;
            }

            // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
            ComponentValue::Token(CSSToken::Delim('.')) => match iter.next() {
                Some(ComponentValue::Token(CSSToken::Ident(class))) => {
                    builder.push(SimpleSelectorNode::Class(class.clone()))?;
                }
                _ => return Err(builder.error("expected class name after `.`")),
            },

            // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
            // "An ID selector is a hash (#, U+0023) immediately followed by the
            // ID value, which is an identifier."
            ComponentValue::Token(CSSToken::Hash {
                value,
                hash_type: HashType::Id,
            }) => builder.push(SimpleSelectorNode::Id(value.clone()))?,

            // [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
            ComponentValue::Token(CSSToken::Colon) => {
                // `::name` is a pseudo-element.
                if matches!(iter.peek(), Some(ComponentValue::Token(CSSToken::Colon))) {
                    let _ = iter.next();
                }
                let pseudo = match iter.next() {
                    Some(ComponentValue::Token(CSSToken::Ident(name))) => {
                        SimpleSelectorNode::Pseudo {
                            name: name.clone(),
                            function: None,
                        }
                    }
                    Some(ComponentValue::Function { name, value }) => SimpleSelectorNode::Pseudo {
                        name: to_css_text(value),
                        function: Some(name.clone()),
                    },
                    _ => return Err(builder.error("expected pseudo-class name after `:`")),
                };
                builder.push(pseudo)?;
            }

            // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
            ComponentValue::Block { token: '[', value } => {
                let attribute = parse_attribute(value).ok_or_else(|| {
                    builder.error(format!("malformed attribute selector [{}]", to_css_text(value)))
                })?;
                builder.push(attribute)?;
            }

            other => return Err(builder.error(format!("unexpected `{other}`"))),
        }
    }

    builder.finish()
}

/// Parse the inside of `[...]`: `name`, `name=value` or `name op= value`,
/// with an optional trailing `i`/`s` case flag.
fn parse_attribute(values: &[ComponentValue]) -> Option<SimpleSelectorNode> {
    let tokens: Option<Vec<&CSSToken>> = values
        .iter()
        .filter(|v| !v.is_whitespace())
        .map(ComponentValue::as_token)
        .collect();
    let mut iter = tokens?.into_iter();

    let CSSToken::Ident(name) = iter.next()? else {
        return None;
    };

    let operator = match iter.next() {
        None => {
            return Some(SimpleSelectorNode::Attribute {
                name: name.clone(),
                operator: AttributeOperator::Exists,
                value: String::new(),
                is_string_value: false,
            });
        }
        Some(CSSToken::Delim('=')) => AttributeOperator::Equals,
        Some(CSSToken::Delim(c)) => {
            let operator = AttributeOperator::from_prefix(*c)?;
            if iter.next() != Some(&CSSToken::Delim('=')) {
                return None;
            }
            operator
        }
        Some(_) => return None,
    };

    let (value, is_string_value) = match iter.next()? {
        CSSToken::Ident(value) => (value.clone(), false),
        CSSToken::String(value) => (value.clone(), true),
        _ => return None,
    };

    // [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    match iter.next() {
        None => {}
        Some(flag) if flag.is_ident("i") || flag.is_ident("s") => {}
        Some(_) => return None,
    }
    if iter.next().is_some() {
        return None;
    }

    Some(SimpleSelectorNode::Attribute {
        name: name.clone(),
        operator,
        value,
        is_string_value,
    })
}
