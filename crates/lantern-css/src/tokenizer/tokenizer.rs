use super::token::{CSSToken, HashType, NumericType, SourcePosition, Token};
use crate::error::LexError;

/// Location reported for sources without a URL.
pub const INLINE_LOCATION: &str = "<inline>";

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
///
/// Unlike the specification, which never fails, the tokenizer stops with a
/// [`LexError`] when the input ends inside a comment, a string or an escape.
/// All other malformed input yields `<bad-string>`, `<bad-url>` or a `\`
/// delimiter for the parser to recover from.
pub struct CSSTokenizer {
    /// The preprocessed input code points
    input: Vec<char>,
    /// Index of the next code point to consume
    position: usize,
    /// Index of the first code point of every line, for diagnostics
    line_starts: Vec<usize>,
    /// Base location of the input, for diagnostics
    location: String,
    /// Collected tokens
    tokens: Vec<Token>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    ///
    /// [§ 3.3 Preprocessing the input stream](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
    ///
    /// "Replace any U+000D CARRIAGE RETURN (CR) code points, U+000C FORM FEED
    /// (FF) code points, or pairs of U+000D CARRIAGE RETURN (CR) followed by
    /// U+000A LINE FEED (LF) in input by a single U+000A LINE FEED (LF) code
    /// point. Replace any U+0000 NULL code point in input with U+FFFD."
    pub fn new(input: impl AsRef<str>) -> Self {
        let mut chars = Vec::with_capacity(input.as_ref().len());
        let mut iter = input.as_ref().chars().peekable();
        while let Some(c) = iter.next() {
            match c {
                '\r' => {
                    if iter.peek() == Some(&'\n') {
                        let _ = iter.next();
                    }
                    chars.push('\n');
                }
                '\x0C' => chars.push('\n'),
                '\0' => chars.push('\u{FFFD}'),
                c => chars.push(c),
            }
        }

        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|&(_, &c)| c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();

        Self {
            input: chars,
            position: 0,
            line_starts,
            location: INLINE_LOCATION.to_string(),
            tokens: Vec::new(),
        }
    }

    /// Tag the input with the location it was read from.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Tokenize the whole input, ending with an EOF token.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] for an unterminated comment or string, or an
    /// escape at the end of the input.
    pub fn run(&mut self) -> Result<(), LexError> {
        loop {
            self.consume_comments()?;
            let start = self.source_position(self.position);
            let token = self.consume_token()?;
            let is_eof = token.is_eof();
            self.tokens.push(Token::new(token, start));
            if is_eof {
                return Ok(());
            }
        }
    }

    /// Return the collected tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Result<CSSToken, LexError> {
        let start = self.position;

        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return Ok(CSSToken::EOF);
        };

        let token = match c {
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CSSToken::Whitespace
            }

            '"' | '\'' => self.consume_string_token(c, start)?,

            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let hash_type = if self.would_start_ident_sequence() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence()?;
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }

            '(' => CSSToken::LeftParen,
            ')' => CSSToken::RightParen,
            ',' => CSSToken::Comma,
            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,
            '[' => CSSToken::LeftBracket,
            ']' => CSSToken::RightBracket,
            '{' => CSSToken::LeftBrace,
            '}' => CSSToken::RightBrace,

            '+' | '.' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()?
                } else {
                    let _ = self.consume();
                    CSSToken::Delim(c)
                }
            }

            '-' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()?
                } else if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') {
                    self.position += 3;
                    CSSToken::CDC
                } else if self.would_start_ident_sequence() {
                    self.consume_ident_like_token()?
                } else {
                    let _ = self.consume();
                    CSSToken::Delim('-')
                }
            }

            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    self.position += 3;
                    CSSToken::CDO
                } else {
                    CSSToken::Delim('<')
                }
            }

            '@' => {
                if self.would_start_ident_sequence() {
                    CSSToken::AtKeyword(self.consume_ident_sequence()?)
                } else {
                    CSSToken::Delim('@')
                }
            }

            '\\' => {
                // "If the input stream starts with a valid escape, reconsume the
                // current input code point, consume an ident-like token, and return it."
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()?
                } else {
                    // "Otherwise, this is a parse error."
                    CSSToken::Delim('\\')
                }
            }

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()?
            }

            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()?
            }

            c => CSSToken::Delim(c),
        };

        Ok(token)
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comments(&mut self) -> Result<(), LexError> {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            let start = self.position;
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => {
                        return Err(LexError::UnterminatedComment {
                            location: self.location.clone(),
                            position: self.source_position(start),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char, start: usize) -> Result<CSSToken, LexError> {
        let mut value = String::new();

        loop {
            match self.consume() {
                Some(c) if c == ending => return Ok(CSSToken::String(value)),

                None => {
                    return Err(LexError::UnterminatedString {
                        location: self.location.clone(),
                        position: self.source_position(start),
                    });
                }

                // "newline: This is a parse error. Reconsume the current input
                // code point, create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return Ok(CSSToken::BadString);
                }

                Some('\\') => match self.peek() {
                    None => {
                        return Err(LexError::UnterminatedString {
                            location: self.location.clone(),
                            position: self.source_position(start),
                        });
                    }
                    // An escaped newline continues the string on the next line.
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    Some(_) => value.push(self.consume_escaped_code_point()?),
                },

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> Result<CSSToken, LexError> {
        let (value, numeric_type) = self.consume_number();

        if self.would_start_ident_sequence() {
            let unit = self.consume_ident_sequence()?;
            Ok(CSSToken::Dimension {
                value,
                numeric_type,
                unit,
            })
        } else if self.peek() == Some('%') {
            let _ = self.consume();
            Ok(CSSToken::Percentage {
                value,
                numeric_type,
            })
        } else {
            Ok(CSSToken::Number {
                value,
                numeric_type,
            })
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> Result<CSSToken, LexError> {
        let string = self.consume_ident_sequence()?;

        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            let _ = self.consume();
            self.consume_whitespace();

            // A quoted argument makes `url(` an ordinary function token.
            if matches!(self.peek(), Some('"' | '\'')) {
                return Ok(CSSToken::Function(string));
            }
            return self.consume_url_token();
        }

        if self.peek() == Some('(') {
            let _ = self.consume();
            return Ok(CSSToken::Function(string));
        }

        Ok(CSSToken::Ident(string))
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    ///
    /// Leading whitespace has already been consumed. An unterminated URL at
    /// the end of the input is reported as `<bad-url>` rather than accepted.
    fn consume_url_token(&mut self) -> Result<CSSToken, LexError> {
        let mut value = String::new();

        loop {
            match self.consume() {
                Some(')') => return Ok(CSSToken::Url(value)),

                None => return Ok(CSSToken::BadUrl),

                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    return match self.consume() {
                        Some(')') => Ok(CSSToken::Url(value)),
                        None => Ok(CSSToken::BadUrl),
                        Some(_) => {
                            self.consume_bad_url_remnants()?;
                            Ok(CSSToken::BadUrl)
                        }
                    };
                }

                Some(c) if matches!(c, '"' | '\'' | '(') || is_non_printable(c) => {
                    self.consume_bad_url_remnants()?;
                    return Ok(CSSToken::BadUrl);
                }

                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        value.push(self.consume_escaped_code_point()?);
                    } else {
                        self.consume_bad_url_remnants()?;
                        return Ok(CSSToken::BadUrl);
                    }
                }

                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) -> Result<(), LexError> {
        loop {
            match self.consume() {
                Some(')') | None => return Ok(()),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point()?;
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> Result<String, LexError> {
        let mut result = String::new();

        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point()?);
                }
                Some(_) => {
                    self.reconsume();
                    return Ok(result);
                }
                None => return Ok(result),
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, NumericType) {
        let mut numeric_type = NumericType::Integer;
        let mut repr = String::new();

        if let Some(sign @ ('+' | '-')) = self.peek() {
            repr.push(sign);
            let _ = self.consume();
        }
        self.consume_digits(&mut repr);

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            let _ = self.consume();
            self.consume_digits(&mut repr);
            numeric_type = NumericType::Number;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_offset = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_offset).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_offset {
                    if let Some(c) = self.consume() {
                        repr.push(c);
                    }
                }
                self.consume_digits(&mut repr);
                numeric_type = NumericType::Number;
            }
        }

        (repr.parse().unwrap_or(0.0), numeric_type)
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            repr.push(c);
            let _ = self.consume();
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// The backslash has already been consumed.
    fn consume_escaped_code_point(&mut self) -> Result<char, LexError> {
        let start = self.position.saturating_sub(1);
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                while hex.len() < 6 {
                    match self.peek().filter(char::is_ascii_hexdigit) {
                        Some(digit) => {
                            hex.push(digit);
                            let _ = self.consume();
                        }
                        None => break,
                    }
                }
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // "If this number is zero, or is for a surrogate, or is greater than the
                // maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER."
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0);
                Ok(match code_point {
                    0 => '\u{FFFD}',
                    code_point => char::from_u32(code_point).unwrap_or('\u{FFFD}'),
                })
            }
            None => Err(LexError::EofInEscape {
                location: self.location.clone(),
                position: self.source_position(start),
            }),
            Some(c) => Ok(c),
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
        match self.peek() {
            Some('+' | '-') => {
                is_digit(self.peek_at(1)) || (self.peek_at(1) == Some('.') && is_digit(self.peek_at(2)))
            }
            Some('.') => is_digit(self.peek_at(1)),
            c => is_digit(c),
        }
    }

    /// Line and column of the code point at `index`.
    fn source_position(&self, index: usize) -> SourcePosition {
        let line = self.line_starts.partition_point(|&start| start <= index);
        let line_start = self.line_starts[line.saturating_sub(1)];
        SourcePosition::new(
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(index - line_start + 1).unwrap_or(u32::MAX),
        )
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// Tokenize `input`, tagging diagnostics with `location`.
///
/// # Errors
///
/// See [`CSSTokenizer::run`].
pub fn tokenize(input: &str, location: Option<&str>) -> Result<Vec<Token>, LexError> {
    let mut tokenizer =
        CSSTokenizer::new(input).with_location(location.unwrap_or(INLINE_LOCATION));
    tokenizer.run()?;
    if log::log_enabled!(log::Level::Trace) {
        log::trace!(
            "tokenized {} into {} tokens",
            tokenizer.location,
            tokenizer.tokens.len()
        );
    }
    Ok(tokenizer.into_tokens())
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
///
/// A backslash at the end of the input counts as an escape so that the
/// tokenizer reports it instead of silently dropping it.
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
pub(crate) const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
pub(crate) const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

/// [§ 4.2 Definitions - non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
const fn is_non_printable(c: char) -> bool {
    matches!(c, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}
