//! Integration tests for the CSS parser.

use lantern_css::parser::{
    ComponentValue, DeclarationNode, MAX_NESTING_DEPTH, ParseMode, Parser, RuleNode, SelectorNode,
    SimpleSelectorNode, SyntaxTree,
};
use lantern_css::tokenizer::{CSSToken, SourcePosition, tokenize};
use lantern_css::{AttributeOperator, Combinator, ParseError, SyntaxError};

fn parse(css: &str, mode: ParseMode) -> Result<SyntaxTree, ParseError> {
    Parser::new(tokenize(css, None).unwrap()).parse(mode)
}

fn rules(css: &str) -> Vec<RuleNode> {
    match parse(css, ParseMode::Stylesheet).unwrap() {
        SyntaxTree::Stylesheet(rules) => rules,
        other => panic!("Expected a stylesheet, got {other:?}"),
    }
}

fn declarations(css: &str) -> Vec<DeclarationNode> {
    match parse(css, ParseMode::DeclarationList).unwrap() {
        SyntaxTree::Declarations(declarations) => declarations,
        other => panic!("Expected declarations, got {other:?}"),
    }
}

fn rule_set(rule: &RuleNode) -> (&[SelectorNode], &[DeclarationNode]) {
    match rule {
        RuleNode::Set {
            selectors,
            declarations,
            ..
        } => (selectors, declarations),
        other => panic!("Expected a rule set, got {other:?}"),
    }
}

fn properties(declarations: &[DeclarationNode]) -> Vec<&str> {
    declarations.iter().map(|d| d.property.as_str()).collect()
}

#[test]
fn test_simple_rule() {
    let rules = rules("p { color: red; margin: 0 }");
    assert_eq!(rules.len(), 1);
    let (selectors, declarations) = rule_set(&rules[0]);
    assert_eq!(selectors.len(), 1);
    assert_eq!(
        selectors[0].steps[0].compound,
        vec![SimpleSelectorNode::Type("p".into())]
    );
    assert_eq!(properties(declarations), vec!["color", "margin"]);
    assert_eq!(
        declarations[0].value,
        vec![ComponentValue::Token(CSSToken::Ident("red".into()))]
    );
}

#[test]
fn test_selector_group_and_combinators() {
    let rules = rules("div > p.note, ul li + li ~ a { x: y }");
    let (selectors, _) = rule_set(&rules[0]);
    assert_eq!(selectors.len(), 2);

    let first = &selectors[0];
    assert_eq!(first.steps.len(), 2);
    assert_eq!(first.steps[0].combinator, Some(Combinator::Child));
    assert_eq!(
        first.steps[1].compound,
        vec![
            SimpleSelectorNode::Type("p".into()),
            SimpleSelectorNode::Class("note".into())
        ]
    );

    let combinators: Vec<_> = selectors[1].steps.iter().map(|s| s.combinator).collect();
    assert_eq!(
        combinators,
        vec![
            Some(Combinator::Descendant),
            Some(Combinator::NextSibling),
            Some(Combinator::SubsequentSibling),
            None
        ]
    );
}

#[test]
fn test_id_universal_and_pseudo() {
    let rules = rules("*#main:hover, a::before, li:nth-child(odd) { x: y }");
    let (selectors, _) = rule_set(&rules[0]);
    assert_eq!(
        selectors[0].steps[0].compound,
        vec![
            SimpleSelectorNode::Universal,
            SimpleSelectorNode::Id("main".into()),
            SimpleSelectorNode::Pseudo {
                name: "hover".into(),
                function: None
            },
        ]
    );
    assert!(matches!(
        &selectors[1].steps[0].compound[1],
        SimpleSelectorNode::Pseudo { name, function: None } if name == "before"
    ));
    assert!(matches!(
        &selectors[2].steps[0].compound[1],
        SimpleSelectorNode::Pseudo { name, function: Some(function) }
            if name == "odd" && function == "nth-child"
    ));
}

#[test]
fn test_attribute_selectors() {
    let rules = rules("[href] , a[target=_blank], a[href^=\"http\" i] { x: y }");
    let (selectors, _) = rule_set(&rules[0]);
    assert_eq!(
        selectors[0].steps[0].compound,
        vec![SimpleSelectorNode::Attribute {
            name: "href".into(),
            operator: AttributeOperator::Exists,
            value: String::new(),
            is_string_value: false,
        }]
    );
    assert_eq!(
        selectors[1].steps[0].compound[1],
        SimpleSelectorNode::Attribute {
            name: "target".into(),
            operator: AttributeOperator::Equals,
            value: "_blank".into(),
            is_string_value: false,
        }
    );
    assert_eq!(
        selectors[2].steps[0].compound[1],
        SimpleSelectorNode::Attribute {
            name: "href".into(),
            operator: AttributeOperator::Prefix,
            value: "http".into(),
            is_string_value: true,
        }
    );
}

#[test]
fn test_invalid_selector_drops_only_that_rule() {
    let rules = rules("a > > b { x: y } p { color: red }");
    assert_eq!(rules.len(), 1);
    let (selectors, _) = rule_set(&rules[0]);
    assert_eq!(
        selectors[0].steps[0].compound,
        vec![SimpleSelectorNode::Type("p".into())]
    );
}

#[test]
fn test_one_bad_selector_invalidates_the_group() {
    let rules = rules("a, p.  { x: y }");
    assert!(rules.is_empty());
}

#[test]
fn test_type_selector_must_come_first() {
    assert!(rules(".a div { x: y }").len() == 1);
    assert!(rules(".a*{ x: y }").is_empty());
}

#[test]
fn test_important_flag() {
    let declarations = declarations("color: red !important; margin: 0 ! IMPORTANT; x: y");
    assert!(declarations[0].important);
    assert_eq!(
        declarations[0].value,
        vec![ComponentValue::Token(CSSToken::Ident("red".into()))]
    );
    assert!(declarations[1].important);
    assert!(!declarations[2].important);
}

#[test]
fn test_declaration_without_colon_is_skipped() {
    let declarations = declarations("color red; margin: 0");
    assert_eq!(properties(&declarations), vec!["margin"]);
}

#[test]
fn test_bad_string_value_is_skipped() {
    let rules = rules("p { content: \"broken\n; color: red }");
    let (_, declarations) = rule_set(&rules[0]);
    assert_eq!(properties(declarations), vec!["color"]);
}

#[test]
fn test_garbage_in_declaration_list_is_skipped() {
    let declarations = declarations("{ } 12px; color: red");
    assert_eq!(properties(&declarations), vec!["color"]);
}

#[test]
fn test_declaration_positions() {
    let declarations = declarations("a: b;\n  c: d");
    assert_eq!(declarations[1].position, SourcePosition::new(2, 3));
}

#[test]
fn test_imports_must_come_first() {
    let rules = rules(
        "@charset \"utf-8\"; @import url(a.css); @import 'b.css' print; p { x: y } @import 'c.css';",
    );
    assert_eq!(rules.len(), 3);
    assert!(matches!(&rules[0], RuleNode::Import { href, media, .. } if href == "a.css" && media.is_empty()));
    match &rules[1] {
        RuleNode::Import { href, media, .. } => {
            assert_eq!(href, "b.css");
            assert_eq!(media.to_string(), "print");
        }
        other => panic!("Expected an import, got {other:?}"),
    }
    assert!(matches!(rules[2], RuleNode::Set { .. }));
}

#[test]
fn test_import_with_quoted_url_function() {
    let rules = rules("@import url(\"x.css\") screen, print;");
    assert!(matches!(
        &rules[0],
        RuleNode::Import { href, media, .. } if href == "x.css" && media.len() == 2
    ));
}

#[test]
fn test_import_without_target_is_dropped() {
    assert!(rules("@import ; @import 12;").is_empty());
}

#[test]
fn test_media_block() {
    let rules = rules("@media screen and (min-width: 100px) { a { x: y } b { x: y } }");
    match &rules[0] {
        RuleNode::Media { media, rules, .. } => {
            assert_eq!(media.to_string(), "screen and (min-width: 100px)");
            assert_eq!(rules.len(), 2);
        }
        other => panic!("Expected @media, got {other:?}"),
    }
}

#[test]
fn test_import_inside_media_is_ignored() {
    let rules = rules("@media print { @import 'a.css'; a { x: y } }");
    match &rules[0] {
        RuleNode::Media { rules, .. } => {
            assert_eq!(rules.len(), 1);
            assert!(matches!(rules[0], RuleNode::Set { .. }));
        }
        other => panic!("Expected @media, got {other:?}"),
    }
}

#[test]
fn test_page_rule() {
    let rules = rules("@page :first { margin: 1in } @page toc:left { margin: 0 }");
    assert!(matches!(
        &rules[0],
        RuleNode::Page { name: None, pseudo: Some(pseudo), declarations, .. }
            if pseudo == "first" && declarations.len() == 1
    ));
    assert!(matches!(
        &rules[1],
        RuleNode::Page { name: Some(name), pseudo: Some(pseudo), .. }
            if name == "toc" && pseudo == "left"
    ));
}

#[test]
fn test_unknown_at_rules_are_skipped() {
    let rules = rules("@font-face { font-family: x } @namespace svg url(x); p { x: y }");
    assert_eq!(rules.len(), 1);
    assert!(matches!(rules[0], RuleNode::Set { .. }));
}

#[test]
fn test_stray_closing_brace_is_ignored() {
    let rules = rules("} p { x: y }");
    assert_eq!(rules.len(), 1);
}

#[test]
fn test_cdo_cdc_are_ignored() {
    let rules = rules("<!-- p { x: y } -->");
    assert_eq!(rules.len(), 1);
}

#[test]
fn test_unclosed_block_fails() {
    let error = parse("p { color: red", ParseMode::Stylesheet).unwrap_err();
    assert_eq!(
        error,
        ParseError::UnexpectedEof {
            open: '{',
            position: SourcePosition::new(1, 3)
        }
    );
}

#[test]
fn test_unclosed_function_fails() {
    let error = parse("color: rgb(1, 2", ParseMode::DeclarationList).unwrap_err();
    assert!(matches!(error, ParseError::UnexpectedEof { open: '(', .. }));
}

#[test]
fn test_rule_without_block_at_eof_is_dropped() {
    assert!(rules("p { x: y } div").len() == 1);
}

#[test]
fn test_media_query_list_mode() {
    match parse("screen, (color), print and (orientation: landscape)", ParseMode::MediaQueryList)
        .unwrap()
    {
        SyntaxTree::MediaQueries { media, errors } => {
            assert!(errors.is_empty());
            assert_eq!(media.len(), 3);
            assert_eq!(media.0[1].media_type, None);
            assert_eq!(media.0[1].expressions[0].feature, "color");
        }
        other => panic!("Expected media queries, got {other:?}"),
    }
}

#[test]
fn test_malformed_media_query_becomes_not_all() {
    match parse("screen and, print", ParseMode::MediaQueryList).unwrap() {
        SyntaxTree::MediaQueries { media, errors } => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], SyntaxError::InvalidMediaQuery { .. }));
            assert_eq!(media.to_string(), "not all, print");
        }
        other => panic!("Expected media queries, got {other:?}"),
    }
}

#[test]
fn test_nesting_up_to_the_limit_parses() {
    let depth = MAX_NESTING_DEPTH - 1;
    let css = format!("p {{ x: {}{} }}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(rules(&css).len(), 1);
}

#[test]
fn test_nesting_past_the_limit_fails() {
    let css = format!("p {{ x: {}{} }}", "[".repeat(10_000), "]".repeat(10_000));
    let error = parse(&css, ParseMode::Stylesheet).unwrap_err();
    assert!(matches!(
        error,
        ParseError::TooDeep { limit, .. } if limit == MAX_NESTING_DEPTH
    ));

    let levels = MAX_NESTING_DEPTH + 1;
    let css = format!("{}{}", "@media print { ".repeat(levels), "}".repeat(levels));
    assert!(matches!(
        parse(&css, ParseMode::Stylesheet),
        Err(ParseError::TooDeep { .. })
    ));
}
