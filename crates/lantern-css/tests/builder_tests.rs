//! Integration tests for the tree builder, the factory and the preparator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lantern_css::parser::{ParseMode, Parser};
use lantern_css::tokenizer::tokenize;
use lantern_css::{
    BuildOutput, CssParser, Declaration, DefaultPreparator, DefaultRuleFactory, ElementRef,
    Origin, ParseOptions, PrepareContext, Preparator, RuleBlock, RuleFactory, Selector, Source,
    Term, TreeBuilder,
};

fn build_with(css: &str, mode: ParseMode, context: PrepareContext) -> BuildOutput {
    let tree = Parser::new(tokenize(css, None).unwrap()).parse(mode).unwrap();
    TreeBuilder::new(&DefaultRuleFactory, &DefaultPreparator, context).build(tree)
}

fn build(css: &str) -> BuildOutput {
    build_with(css, ParseMode::Stylesheet, PrepareContext::default())
}

fn only_set(output: &BuildOutput) -> &lantern_css::RuleSet {
    assert_eq!(output.rules.len(), 1, "{:?}", output.rules);
    output.rules[0].as_set().unwrap()
}

#[test]
fn test_single_rule() {
    let output = build("p { color: red }");
    let rule = only_set(&output);
    assert_eq!(rule.selectors.len(), 1);
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].property, "color");
    assert_eq!(rule.declarations[0].terms, vec![Term::Ident("red".into())]);
    assert!(!rule.declarations[0].important);
    assert_eq!(rule.priority.origin, Origin::Author);
}

#[test]
fn test_malformed_rule_then_valid_rule() {
    let output = build("p { color red } .x { color: blue }");
    let rule = only_set(&output);
    assert_eq!(rule.selectors[0].to_string(), ".x");
}

#[test]
fn test_terms() {
    let output = build(
        "p { MARGIN: 0 10PX; font-family: Arial, sans-serif; background: url(a.png) #fff; \
         width: calc(100% - 10px); opacity: .5; color: rgb(0,128,255) }",
    );
    let rule = only_set(&output);
    let terms: Vec<&[Term]> = rule.declarations.iter().map(|d| d.terms.as_slice()).collect();

    assert_eq!(rule.declarations[0].property, "margin");
    assert_eq!(
        terms[0],
        [
            Term::Integer(0),
            Term::Dimension {
                value: 10.0,
                unit: "px".into()
            }
        ]
    );
    assert_eq!(
        terms[1],
        [
            Term::Ident("Arial".into()),
            Term::Operator(','),
            Term::Ident("sans-serif".into())
        ]
    );
    assert_eq!(
        terms[2],
        [Term::Uri("a.png".into()), Term::Hash("fff".into())]
    );
    assert_eq!(rule.declarations[3].to_string(), "width: calc(100% - 10px)");
    assert_eq!(terms[4], [Term::Number(0.5)]);
    assert_eq!(rule.declarations[5].to_string(), "color: rgb(0, 128, 255)");
}

#[test]
fn test_quoted_url_function_is_a_uri() {
    let output = build("p { background: url(\"img/a.png\") }");
    assert_eq!(
        only_set(&output).declarations[0].terms,
        vec![Term::Uri("img/a.png".into())]
    );
}

#[test]
fn test_unrepresentable_value_is_dropped() {
    let output = build("p { grid: [a] 1fr; color: red }");
    let rule = only_set(&output);
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].property, "color");
}

#[test]
fn test_empty_rules_are_dropped() {
    let output = build("p {} p { ; } @media print { a {} } @page {} b { x: y }");
    let rule = only_set(&output);
    assert_eq!(rule.selectors[0].to_string(), "b");
}

#[test]
fn test_display() {
    let output = build(
        "ul > li.item, a[href^=http] { Color: RED; margin: 0 10PX !important } \
         @media screen { p { x: y } } @page :first { margin: 1in }",
    );
    let rendered: Vec<String> = output.rules.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "ul > li.item, a[href^=http] { color: RED; margin: 0 10px !important; }",
            "@media screen { p { x: y; } }",
            "@page :first { margin: 1in; }",
        ]
    );
}

#[test]
fn test_imports_are_collected_not_built() {
    let output = build("@import 'a.css'; @import url(b.css) print; p { x: y }");
    assert_eq!(output.rules.len(), 1);
    let paths: Vec<&str> = output.imports.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["a.css", "b.css"]);
    assert!(output.imports[0].media.is_empty());
    assert_eq!(output.imports[1].media.to_string(), "print");
}

#[test]
fn test_inline_declarations_target_the_element() {
    let context = PrepareContext {
        element: Some(ElementRef(7)),
        inline_priority: true,
        origin: Origin::Author,
    };
    let output = build_with("color: red; margin: 0", ParseMode::DeclarationList, context);
    let rule = only_set(&output);
    assert_eq!(rule.priority.origin, Origin::Inline);
    assert_eq!(
        rule.selectors[0].subject(),
        Some([Selector::ElementRef(ElementRef(7))].as_slice())
    );
    assert_eq!(rule.declarations.len(), 2);
}

#[test]
fn test_inline_declarations_without_element() {
    let context = PrepareContext {
        origin: Origin::User,
        ..PrepareContext::default()
    };
    let output = build_with("color: red", ParseMode::DeclarationList, context);
    let rule = only_set(&output);
    assert!(rule.selectors.is_empty());
    assert_eq!(rule.priority.origin, Origin::User);
    assert_eq!(output.rules[0].to_string(), "{ color: red; }");
}

#[test]
fn test_empty_inline_style_builds_nothing() {
    let output = build_with("  ;  ", ParseMode::DeclarationList, PrepareContext::default());
    assert!(output.rules.is_empty());
}

/// Counts what it creates and lower-cases type selectors.
#[derive(Default)]
struct CountingFactory {
    declarations: AtomicUsize,
    rules: AtomicUsize,
}

impl RuleFactory for CountingFactory {
    fn create_declaration(&self, property: String, terms: Vec<Term>, important: bool) -> Declaration {
        let _ = self.declarations.fetch_add(1, Ordering::SeqCst);
        Declaration {
            property,
            terms,
            important,
        }
    }

    fn create_element_name(&self, name: String) -> Selector {
        Selector::ElementName(name.to_ascii_lowercase())
    }

    fn create_rule_set(
        &self,
        priority: lantern_css::Priority,
        selectors: Vec<lantern_css::CombinedSelector>,
        declarations: Vec<Declaration>,
    ) -> RuleBlock {
        let _ = self.rules.fetch_add(1, Ordering::SeqCst);
        RuleBlock::Set(lantern_css::RuleSet {
            priority,
            selectors,
            declarations,
        })
    }
}

/// Drops `behavior` declarations and every rule inside `@media print`.
struct FilteringPreparator;

impl Preparator for FilteringPreparator {
    fn prepare_declaration(
        &self,
        declaration: Declaration,
        _context: &PrepareContext,
    ) -> Option<Declaration> {
        (declaration.property != "behavior").then_some(declaration)
    }

    fn prepare_rule(&self, rule: RuleBlock, _context: &PrepareContext) -> Option<RuleBlock> {
        match &rule {
            RuleBlock::Media(media) if media.media.to_string() == "print" => None,
            _ => Some(rule),
        }
    }
}

#[test]
fn test_custom_factory_is_used_for_every_value() {
    let factory = CountingFactory::default();
    let tree = Parser::new(tokenize("DIV { a: b; c: d } @media print { P { e: f } }", None).unwrap())
        .parse(ParseMode::Stylesheet)
        .unwrap();
    let output = TreeBuilder::new(&factory, &DefaultPreparator, PrepareContext::default()).build(tree);

    assert_eq!(factory.declarations.load(Ordering::SeqCst), 3);
    assert_eq!(factory.rules.load(Ordering::SeqCst), 2);
    assert_eq!(output.rules[0].as_set().unwrap().selectors[0].to_string(), "div");
}

#[test]
fn test_preparator_can_drop_items() {
    let parser = CssParser::builder()
        .preparator(Arc::new(FilteringPreparator))
        .build();
    let sheet = parser
        .parse(
            Source::Embedded("p { behavior: x; color: red } @media print { a { x: y } } q { behavior: y }"),
            &ParseOptions::default(),
        )
        .unwrap();
    assert_eq!(sheet.to_string(), "p { color: red; }\n");
}

#[test]
fn test_factory_through_the_pipeline() {
    let factory = Arc::new(CountingFactory::default());
    let parser = CssParser::builder().factory(factory.clone()).build();
    let _ = parser
        .parse(Source::Embedded("A { x: y }"), &ParseOptions::default())
        .unwrap();
    assert_eq!(factory.rules.load(Ordering::SeqCst), 1);
    assert_eq!(factory.declarations.load(Ordering::SeqCst), 1);
}
