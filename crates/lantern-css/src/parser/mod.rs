//! CSS parser module.

/// CSS parser implementation per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod css_parser;
mod media;
mod selectors;
/// Syntax tree produced by the parser.
pub mod syntax;
mod values;

pub use css_parser::{MAX_NESTING_DEPTH, Parser};
pub use syntax::{
    ComponentValue, DeclarationNode, ParseMode, RuleNode, SelectorNode, SelectorStepNode,
    SimpleSelectorNode, SyntaxTree,
};
pub(crate) use values::to_terms;
