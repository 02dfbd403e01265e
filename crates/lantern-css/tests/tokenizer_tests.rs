//! Integration tests for the CSS tokenizer.

use lantern_css::LexError;
use lantern_css::tokenizer::{CSSToken, CSSTokenizer, HashType, NumericType, SourcePosition};

/// Helper to tokenize a string and return the token kinds
fn tokenize(input: &str) -> Vec<CSSToken> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run().unwrap();
    tokenizer.into_tokens().into_iter().map(|t| t.kind).collect()
}

fn lex_error(input: &str) -> LexError {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run().unwrap_err()
}

#[test]
fn test_whitespace_collapses() {
    let tokens = tokenize("   \t\n  ");
    assert_eq!(tokens.len(), 2); // whitespace + EOF
    assert!(matches!(tokens[0], CSSToken::Whitespace));
    assert!(matches!(tokens[1], CSSToken::EOF));
}

#[test]
fn test_empty_input_is_just_eof() {
    assert_eq!(tokenize(""), vec![CSSToken::EOF]);
}

#[test]
fn test_ident_with_hyphen() {
    let tokens = tokenize("background-color");
    match &tokens[0] {
        CSSToken::Ident(name) => assert_eq!(name, "background-color"),
        _ => panic!("Expected Ident token"),
    }
}

#[test]
fn test_custom_property_ident() {
    let tokens = tokenize("--main-color");
    assert_eq!(tokens[0], CSSToken::Ident("--main-color".into()));
}

#[test]
fn test_function() {
    let tokens = tokenize("rgb(");
    match &tokens[0] {
        CSSToken::Function(name) => assert_eq!(name, "rgb"),
        _ => panic!("Expected Function token"),
    }
}

#[test]
fn test_at_keyword() {
    let tokens = tokenize("@media");
    assert_eq!(tokens[0], CSSToken::AtKeyword("media".into()));
}

#[test]
fn test_hash_types() {
    let tokens = tokenize("#main #123");
    assert_eq!(
        tokens[0],
        CSSToken::Hash {
            value: "main".into(),
            hash_type: HashType::Id
        }
    );
    assert_eq!(
        tokens[2],
        CSSToken::Hash {
            value: "123".into(),
            hash_type: HashType::Unrestricted
        }
    );
}

#[test]
fn test_lone_hash_is_delim() {
    let tokens = tokenize("# ");
    assert_eq!(tokens[0], CSSToken::Delim('#'));
}

#[test]
fn test_strings_with_both_quotes() {
    let tokens = tokenize(r#""double" 'single'"#);
    assert_eq!(tokens[0], CSSToken::String("double".into()));
    assert_eq!(tokens[2], CSSToken::String("single".into()));
}

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r#""a\"b\41 c""#);
    assert_eq!(tokens[0], CSSToken::String("a\"bAc".into()));
}

#[test]
fn test_newline_in_string_is_bad_string() {
    let tokens = tokenize("\"abc\ndef\"");
    assert_eq!(tokens[0], CSSToken::BadString);
}

#[test]
fn test_numbers() {
    let tokens = tokenize("42 3.5 -7 +1e2");
    assert_eq!(
        tokens[0],
        CSSToken::Number {
            value: 42.0,
            numeric_type: NumericType::Integer
        }
    );
    assert_eq!(
        tokens[2],
        CSSToken::Number {
            value: 3.5,
            numeric_type: NumericType::Number
        }
    );
    assert_eq!(
        tokens[4],
        CSSToken::Number {
            value: -7.0,
            numeric_type: NumericType::Integer
        }
    );
    assert_eq!(
        tokens[6],
        CSSToken::Number {
            value: 100.0,
            numeric_type: NumericType::Number
        }
    );
}

#[test]
fn test_dimension_and_percentage() {
    let tokens = tokenize("10px 50%");
    match &tokens[0] {
        CSSToken::Dimension { value, unit, .. } => {
            assert!((value - 10.0).abs() < f64::EPSILON);
            assert_eq!(unit, "px");
        }
        _ => panic!("Expected Dimension token"),
    }
    assert!(matches!(tokens[2], CSSToken::Percentage { value, .. } if (value - 50.0).abs() < f64::EPSILON));
}

#[test]
fn test_leading_dot_number() {
    let tokens = tokenize(".5em");
    assert!(matches!(
        &tokens[0],
        CSSToken::Dimension { value, unit, numeric_type: NumericType::Number }
            if (value - 0.5).abs() < f64::EPSILON && unit == "em"
    ));
}

#[test]
fn test_unquoted_url() {
    let tokens = tokenize("url( images/bg.png )");
    assert_eq!(tokens[0], CSSToken::Url("images/bg.png".into()));
}

#[test]
fn test_quoted_url_is_a_function() {
    let tokens = tokenize("url(\"a.css\")");
    assert_eq!(tokens[0], CSSToken::Function("url".into()));
    assert_eq!(tokens[1], CSSToken::String("a.css".into()));
    assert_eq!(tokens[2], CSSToken::RightParen);
}

#[test]
fn test_malformed_url_is_bad_url() {
    let tokens = tokenize("url(a b) x");
    assert_eq!(tokens[0], CSSToken::BadUrl);
    assert_eq!(tokens[2], CSSToken::Ident("x".into()));
}

#[test]
fn test_unterminated_url_is_bad_url() {
    let tokens = tokenize("url(a.png");
    assert_eq!(tokens[0], CSSToken::BadUrl);
}

#[test]
fn test_comments_are_dropped() {
    let tokens = tokenize("a/* comment */b");
    assert_eq!(
        tokens,
        vec![
            CSSToken::Ident("a".into()),
            CSSToken::Ident("b".into()),
            CSSToken::EOF
        ]
    );
}

#[test]
fn test_cdo_cdc() {
    let tokens = tokenize("<!-- -->");
    assert_eq!(tokens[0], CSSToken::CDO);
    assert_eq!(tokens[2], CSSToken::CDC);
}

#[test]
fn test_punctuation() {
    let tokens = tokenize(":;,[](){}");
    assert_eq!(
        tokens,
        vec![
            CSSToken::Colon,
            CSSToken::Semicolon,
            CSSToken::Comma,
            CSSToken::LeftBracket,
            CSSToken::RightBracket,
            CSSToken::LeftParen,
            CSSToken::RightParen,
            CSSToken::LeftBrace,
            CSSToken::RightBrace,
            CSSToken::EOF,
        ]
    );
}

#[test]
fn test_escaped_ident() {
    let tokens = tokenize("\\31 0");
    assert_eq!(tokens[0], CSSToken::Ident("10".into()));
}

#[test]
fn test_invalid_escape_is_backslash_delim() {
    let tokens = tokenize("\\\n");
    assert_eq!(tokens[0], CSSToken::Delim('\\'));
}

#[test]
fn test_null_is_replaced() {
    let tokens = tokenize("a\0b");
    assert_eq!(tokens[0], CSSToken::Ident("a\u{FFFD}b".into()));
}

#[test]
fn test_unterminated_comment_fails() {
    assert!(matches!(
        lex_error("a { /* never closed"),
        LexError::UnterminatedComment { position, .. } if position == SourcePosition::new(1, 5)
    ));
}

#[test]
fn test_unterminated_string_fails() {
    assert!(matches!(
        lex_error("a { content: \"open"),
        LexError::UnterminatedString { .. }
    ));
}

#[test]
fn test_escape_at_end_of_input_fails() {
    assert!(matches!(lex_error("a\\"), LexError::EofInEscape { .. }));
}

#[test]
fn test_lex_error_names_location() {
    let error = lantern_css::tokenize("/*", Some("http://example.com/a.css")).unwrap_err();
    assert!(error.to_string().starts_with("http://example.com/a.css:1:1"));
}

#[test]
fn test_positions() {
    let tokens = lantern_css::tokenize("a {\n  color: red;\n}", None).unwrap();
    let color = tokens
        .iter()
        .find(|t| t.kind == CSSToken::Ident("color".into()))
        .unwrap();
    assert_eq!(color.position, SourcePosition::new(2, 3));
    let close = tokens.iter().find(|t| t.kind == CSSToken::RightBrace).unwrap();
    assert_eq!(close.position, SourcePosition::new(3, 1));
}
