//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization stage."
//!
//! Errors inside one rule or declaration are recovered: the construct is
//! logged at debug level and dropped. Running out of input inside an open
//! block, or nesting blocks deeper than [`MAX_NESTING_DEPTH`], aborts the
//! parse.

use super::media::parse_media_query_list;
use super::selectors::parse_selector_group;
use super::syntax::{ComponentValue, DeclarationNode, ParseMode, RuleNode, SyntaxTree};
use super::values::{check_important, trim_important, trim_whitespace};
use crate::error::{ParseError, SyntaxError};
use crate::tokenizer::{CSSToken, SourcePosition, Token};

static EOF_TOKEN: Token = Token::new(CSSToken::EOF, SourcePosition::START);

/// How deeply blocks, functions and `@media` rules may nest.
///
/// Everything downstream of the parser walks component values recursively,
/// so the limit keeps hostile input from exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 128;

/// CSS parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from a list of tokens.
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream with the grammar of `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedEof`] when the input ends inside an
    /// open `{`, `[`, `(` or function block, and [`ParseError::TooDeep`]
    /// when blocks nest deeper than [`MAX_NESTING_DEPTH`].
    pub fn parse(mut self, mode: ParseMode) -> Result<SyntaxTree, ParseError> {
        match mode {
            // [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
            ParseMode::DeclarationList => Ok(SyntaxTree::Declarations(
                self.consume_list_of_declarations(None)?,
            )),

            // [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
            // "Consume a list of rules from input, with the top-level flag set."
            ParseMode::Stylesheet => Ok(SyntaxTree::Stylesheet(self.consume_list_of_rules(None)?)),

            // [§ 5.3.10 Parse a comma-separated list of component values](https://www.w3.org/TR/css-syntax-3/#parse-comma-separated-list-of-component-values)
            ParseMode::MediaQueryList => {
                let position = self.peek().position;
                let mut values = Vec::new();
                while !self.peek().kind.is_eof() {
                    values.push(self.consume_component_value()?);
                }
                let (media, errors) = parse_media_query_list(&values, position);
                Ok(SyntaxTree::MediaQueries { media, errors })
            }
        }
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// `open` is the position of the `{` enclosing a nested list, `None` at
    /// the top level.
    fn consume_list_of_rules(
        &mut self,
        open: Option<SourcePosition>,
    ) -> Result<Vec<RuleNode>, ParseError> {
        // "Create an initially empty list of rules."
        let mut rules = Vec::new();
        // [§ 2 @import](https://www.w3.org/TR/css-cascade-4/#at-import)
        // "Any @import rules must precede all other valid at-rules and style
        // rules in a style sheet (ignoring @charset)."
        let mut imports_allowed = open.is_none();

        loop {
            let position = self.peek().position;
            match &self.peek().kind {
                // "<whitespace-token>"
                // "Do nothing."
                CSSToken::Whitespace => self.advance(),

                // "<EOF-token>"
                // "Return the list of rules."
                CSSToken::EOF => {
                    return match open {
                        Some(position) => Err(ParseError::UnexpectedEof {
                            open: '{',
                            position,
                        }),
                        None => Ok(rules),
                    };
                }

                CSSToken::RightBrace => {
                    self.advance();
                    if open.is_some() {
                        return Ok(rules);
                    }
                    log::debug!("{position}: ignoring unmatched `}}`");
                }

                // "<CDO-token>" or "<CDC-token>"
                CSSToken::CDO | CSSToken::CDC => self.advance(),

                // "<at-keyword-token>"
                // "Reconsume the current input token. Consume an at-rule, and append
                // the returned value to the list of rules."
                CSSToken::AtKeyword(_) => {
                    rules.extend(self.consume_at_rule(open.is_some(), &mut imports_allowed)?);
                }

                // "anything else"
                // "Reconsume the current input token. Consume a qualified rule. If
                // anything is returned, append it to the list of rules."
                _ => {
                    imports_allowed = false;
                    rules.extend(self.consume_qualified_rule(open.is_some())?);
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(
        &mut self,
        nested: bool,
        imports_allowed: &mut bool,
    ) -> Result<Option<RuleNode>, ParseError> {
        // "Consume the next input token."
        let Token {
            kind: CSSToken::AtKeyword(name),
            position,
        } = self.consume()
        else {
            return Ok(None);
        };
        let name = name.to_ascii_lowercase();

        // "Create a new at-rule with its name set to the value of the current input
        // token, its prelude initially set to an empty list, and its value initially
        // set to nothing."
        let mut prelude = Vec::new();
        let has_block = loop {
            match &self.peek().kind {
                // "<semicolon-token>"
                // "Return the at-rule."
                CSSToken::Semicolon => {
                    self.advance();
                    break false;
                }
                // "<EOF-token>"
                // "This is a parse error. Return the at-rule."
                CSSToken::EOF => break false,
                CSSToken::RightBrace if nested => break false,
                // "<{-token>"
                // "Consume a simple block and assign it to the at-rule's block."
                CSSToken::LeftBrace => break true,
                // "anything else"
                // "Reconsume the current input token. Consume a component value.
                // Append the returned value to the at-rule's prelude."
                _ => prelude.push(self.consume_component_value()?),
            }
        };

        match name.as_str() {
            // [§ 3.4 The @charset Rule](https://www.w3.org/TR/css-syntax-3/#charset-rule)
            // The encoding was decided before tokenizing; the rule has no effect.
            "charset" => {
                if has_block {
                    self.skip_block()?;
                }
                Ok(None)
            }

            "import" => {
                if has_block {
                    log::debug!("{position}: ignoring @import with a block");
                    self.skip_block()?;
                    return Ok(None);
                }
                if !*imports_allowed {
                    log::debug!("{position}: ignoring @import after other rules");
                    return Ok(None);
                }
                match parse_import(&prelude, position) {
                    Ok(import) => Ok(Some(import)),
                    Err(error) => {
                        log::debug!("{error}");
                        Ok(None)
                    }
                }
            }

            // [§ 7.2 @media](https://www.w3.org/TR/css-conditional-3/#at-media)
            "media" => {
                *imports_allowed = false;
                if !has_block {
                    log::debug!("{position}: ignoring @media without a block");
                    return Ok(None);
                }
                let open = self.consume().position;
                let (media, _) = parse_media_query_list(&prelude, position);
                self.enter(open)?;
                let rules = self.consume_list_of_rules(Some(open))?;
                self.depth -= 1;
                Ok(Some(RuleNode::Media {
                    media,
                    rules,
                    position,
                }))
            }

            // [§ 3 Page Selectors](https://www.w3.org/TR/css-page-3/#page-selectors)
            "page" => {
                *imports_allowed = false;
                if !has_block {
                    log::debug!("{position}: ignoring @page without a block");
                    return Ok(None);
                }
                match parse_page_selector(&prelude, position) {
                    Ok((page_name, pseudo)) => {
                        let open = self.consume().position;
                        let declarations = self.consume_list_of_declarations(Some(open))?;
                        Ok(Some(RuleNode::Page {
                            name: page_name,
                            pseudo,
                            declarations,
                            position,
                        }))
                    }
                    Err(error) => {
                        log::debug!("{error}; skipping @page");
                        self.skip_block()?;
                        Ok(None)
                    }
                }
            }

            _ => {
                *imports_allowed = false;
                log::debug!("{position}: skipping unsupported @{name}");
                if has_block {
                    self.skip_block()?;
                }
                Ok(None)
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self, nested: bool) -> Result<Option<RuleNode>, ParseError> {
        let position = self.peek().position;
        // "Create a new qualified rule with its prelude initially set to an empty list,
        // and its value initially set to nothing."
        let mut prelude = Vec::new();

        loop {
            match &self.peek().kind {
                // "<EOF-token>"
                // "This is a parse error. Return nothing."
                CSSToken::EOF => {
                    log::debug!("{position}: rule without a block at end of input");
                    return Ok(None);
                }
                CSSToken::RightBrace if nested => {
                    log::debug!("{position}: rule without a block at end of enclosing block");
                    return Ok(None);
                }
                // "<{-token>"
                // "Consume a simple block and assign it to the qualified rule's block.
                // Return the qualified rule."
                CSSToken::LeftBrace => break,
                // "anything else"
                // "Reconsume the current input token. Consume a component value.
                // Append the returned value to the qualified rule's prelude."
                _ => prelude.push(self.consume_component_value()?),
            }
        }

        match parse_selector_group(&prelude, position) {
            Ok(selectors) => {
                let open = self.consume().position;
                let declarations = self.consume_list_of_declarations(Some(open))?;
                Ok(Some(RuleNode::Set {
                    selectors,
                    declarations,
                    position,
                }))
            }
            Err(error) => {
                log::debug!("{error}; skipping rule");
                self.skip_block()?;
                Ok(None)
            }
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// `open` is the position of the enclosing `{`; `None` for the contents
    /// of a `style` attribute, which end at the end of input.
    fn consume_list_of_declarations(
        &mut self,
        open: Option<SourcePosition>,
    ) -> Result<Vec<DeclarationNode>, ParseError> {
        let mut declarations = Vec::new();

        loop {
            let position = self.peek().position;
            match &self.peek().kind {
                // "<whitespace-token>" or "<semicolon-token>"
                // "Do nothing."
                CSSToken::Whitespace | CSSToken::Semicolon => self.advance(),

                // "<EOF-token>"
                // "Return the list of declarations."
                CSSToken::EOF => {
                    return match open {
                        Some(position) => Err(ParseError::UnexpectedEof {
                            open: '{',
                            position,
                        }),
                        None => Ok(declarations),
                    };
                }

                CSSToken::RightBrace => {
                    self.advance();
                    if open.is_some() {
                        return Ok(declarations);
                    }
                    log::debug!("{position}: ignoring unmatched `}}`");
                }

                // "<at-keyword-token>"
                // "Reconsume the current input token. Consume an at-rule."
                CSSToken::AtKeyword(name) => {
                    log::debug!("{position}: ignoring @{name} inside a declaration block");
                    self.skip_nested_at_rule()?;
                }

                // "<ident-token>"
                // "Consume a declaration. If anything was returned, append it to
                // the list of declarations."
                CSSToken::Ident(_) => {
                    let values = self.consume_declaration_values()?;
                    match declaration_from_values(values, position) {
                        Ok(declaration) => declarations.push(declaration),
                        Err(error) => log::debug!("{error}; skipping declaration"),
                    }
                }

                // "anything else"
                // "This is a parse error. Reconsume the current input token. As long as
                // the next input token is anything other than a <semicolon-token> or
                // <EOF-token>, consume a component value and throw away the returned value."
                other => {
                    let error = SyntaxError::UnexpectedToken {
                        found: other.to_string(),
                        position,
                    };
                    log::debug!("{error}; skipping declaration");
                    let _ = self.consume_declaration_values()?;
                }
            }
        }
    }

    /// Component values up to the next `;` or `}` of this block.
    fn consume_declaration_values(&mut self) -> Result<Vec<ComponentValue>, ParseError> {
        let mut values = Vec::new();
        while !matches!(
            self.peek().kind,
            CSSToken::Semicolon | CSSToken::RightBrace | CSSToken::EOF
        ) {
            values.push(self.consume_component_value()?);
        }
        Ok(values)
    }

    /// Skip an at-rule found among declarations: up to `;`, or through its
    /// block.
    fn skip_nested_at_rule(&mut self) -> Result<(), ParseError> {
        self.advance();
        loop {
            match self.peek().kind {
                CSSToken::Semicolon | CSSToken::RightBrace | CSSToken::EOF => return Ok(()),
                CSSToken::LeftBrace => {
                    let _ = self.consume_component_value()?;
                    return Ok(());
                }
                _ => {
                    let _ = self.consume_component_value()?;
                }
            }
        }
    }

    /// Skip the `{...}` block at the current position.
    fn skip_block(&mut self) -> Result<(), ParseError> {
        if self.peek().kind == CSSToken::LeftBrace {
            let _ = self.consume_component_value()?;
        }
        Ok(())
    }

    /// [§ 5.4.8 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    ///
    /// [§ 5.4.9 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    /// and [§ 5.4.10 Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    /// are folded in: both collect component values up to the mirror of the
    /// opening token.
    fn consume_component_value(&mut self) -> Result<ComponentValue, ParseError> {
        let Token { kind, position } = self.consume();

        // "anything else"
        // "Return the current input token."
        let Some(ending) = kind.mirror() else {
            return Ok(ComponentValue::Token(kind));
        };

        self.enter(position)?;
        let mut value = Vec::new();
        loop {
            let next = &self.peek().kind;
            // "<ending token>"
            // "Return the block."
            if *next == ending {
                self.advance();
                break;
            }
            // "<EOF-token>"
            if next.is_eof() {
                let open = match kind {
                    CSSToken::LeftBrace => '{',
                    CSSToken::LeftBracket => '[',
                    _ => '(',
                };
                return Err(ParseError::UnexpectedEof { open, position });
            }
            value.push(self.consume_component_value()?);
        }
        self.depth -= 1;

        Ok(match kind {
            CSSToken::Function(name) => ComponentValue::Function { name, value },
            CSSToken::LeftBrace => ComponentValue::Block { token: '{', value },
            CSSToken::LeftBracket => ComponentValue::Block { token: '[', value },
            _ => ComponentValue::Block { token: '(', value },
        })
    }

    /// Open one more level of nesting at `position`.
    fn enter(&mut self, position: SourcePosition) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH,
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn consume(&mut self) -> Token {
        let token = self.peek().clone();
        self.advance();
        token
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&EOF_TOKEN)
    }
}

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
fn declaration_from_values(
    values: Vec<ComponentValue>,
    position: SourcePosition,
) -> Result<DeclarationNode, SyntaxError> {
    let mut iter = values.into_iter();
    // "Consume the next input token."
    let Some(ComponentValue::Token(CSSToken::Ident(property))) = iter.next() else {
        return Err(SyntaxError::UnexpectedToken {
            found: "declaration without a property".to_string(),
            position,
        });
    };

    // "While the next input token is a <whitespace-token>, consume the next input token."
    // "If the next input token is anything other than a <colon-token>, this is a parse error.
    // Return nothing."
    let rest = trim_whitespace(iter.collect());
    let Some((ComponentValue::Token(CSSToken::Colon), value)) = rest.split_first() else {
        return Err(SyntaxError::MissingColon { property, position });
    };

    // "If the last two non-<whitespace-token>s in the declaration's value are a <delim-token>
    // with the value "!" followed by an <ident-token> with a value that is an ASCII
    // case-insensitive match for "important", remove them from the declaration's value
    // and set the declaration's important flag to true."
    let value = value.to_vec();
    let important = check_important(&value);
    let value = trim_important(value);

    if value.iter().any(contains_bad_token) {
        return Err(SyntaxError::InvalidValue { property, position });
    }

    Ok(DeclarationNode {
        property,
        value,
        important,
        position,
    })
}

fn contains_bad_token(value: &ComponentValue) -> bool {
    match value {
        ComponentValue::Token(token) => token.is_bad(),
        ComponentValue::Function { value, .. } | ComponentValue::Block { value, .. } => {
            value.iter().any(contains_bad_token)
        }
    }
}

/// [§ 2 @import](https://www.w3.org/TR/css-cascade-4/#at-import)
///
/// `@import [ <url> | <string> ] <media-query-list>? ;`
fn parse_import(prelude: &[ComponentValue], position: SourcePosition) -> Result<RuleNode, SyntaxError> {
    let mut rest = prelude.iter().skip_while(|v| v.is_whitespace());

    let href = match rest.next() {
        Some(ComponentValue::Token(CSSToken::String(href) | CSSToken::Url(href))) => href.clone(),
        Some(ComponentValue::Function { name, value }) if name.eq_ignore_ascii_case("url") => {
            match trim_whitespace(value.clone()).as_slice() {
                [ComponentValue::Token(CSSToken::String(href))] => href.clone(),
                _ => return Err(SyntaxError::InvalidImport { position }),
            }
        }
        _ => return Err(SyntaxError::InvalidImport { position }),
    };

    let media_values: Vec<ComponentValue> = rest.cloned().collect();
    let (media, _) = parse_media_query_list(&media_values, position);

    Ok(RuleNode::Import {
        href,
        media,
        position,
    })
}

/// `@page [name]? [:pseudo]?`
fn parse_page_selector(
    prelude: &[ComponentValue],
    position: SourcePosition,
) -> Result<(Option<String>, Option<String>), SyntaxError> {
    let items: Vec<&ComponentValue> = prelude.iter().filter(|v| !v.is_whitespace()).collect();

    match items.as_slice() {
        [] => Ok((None, None)),
        [ComponentValue::Token(CSSToken::Ident(name))] => Ok((Some(name.clone()), None)),
        [
            ComponentValue::Token(CSSToken::Colon),
            ComponentValue::Token(CSSToken::Ident(pseudo)),
        ] => Ok((None, Some(pseudo.to_ascii_lowercase()))),
        [
            ComponentValue::Token(CSSToken::Ident(name)),
            ComponentValue::Token(CSSToken::Colon),
            ComponentValue::Token(CSSToken::Ident(pseudo)),
        ] => Ok((Some(name.clone()), Some(pseudo.to_ascii_lowercase()))),
        _ => Err(SyntaxError::InvalidSelector {
            reason: "malformed @page selector".to_string(),
            position,
        }),
    }
}
