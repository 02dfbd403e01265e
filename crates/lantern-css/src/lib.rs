//! CSS tokenizer, parser, media queries and stylesheet model for Lantern.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - All token types with source positions
//!   - Input preprocessing, comments and escapes
//!
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Stylesheets, inline declaration lists and standalone media query lists
//!   - Error recovery at rule and declaration boundaries
//!   - Selectors per [Selectors Level 3](https://www.w3.org/TR/selectors-3/)
//!
//! - **Media Queries** ([Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/))
//!   - Query lists, `only`/`not`, media features
//!   - The policy deciding which conditioned imports are expanded
//!
//! - **Model building**
//!   - Rule sets, `@media`, `@page`, declarations and terms
//!   - Construction through a pluggable [`RuleFactory`], post-processing
//!     through a pluggable [`Preparator`]
//!
//! - **Imports** ([§ 2.1 Importing Style Sheets](https://www.w3.org/TR/css-cascade-4/#at-import))
//!   - Recursive expansion with cycle detection
//!   - An optional URL-keyed rule cache
//!
//! # Not Yet Implemented
//!
//! - Selector matching and the cascade
//! - `@font-face`, `@supports`, `@namespace` and other at-rules (skipped)
//! - `@charset` sniffing
//!
//! # Example
//!
//! ```
//! use lantern_css::{CssParser, ParseOptions, Source};
//!
//! let parser = CssParser::new();
//! let sheet = parser
//!     .parse(Source::Embedded("p { color: red }"), &ParseOptions::default())
//!     .unwrap();
//! assert_eq!(sheet.to_string(), "p { color: red; }\n");
//! ```

/// Model construction from the syntax tree.
pub mod builder;
/// Error types of the pipeline.
pub mod error;
/// `@import` expansion and the entry points.
pub mod import;
/// Decoding of fetched bytes.
pub mod input;
/// Media queries and the auto-import policy.
pub mod media;
/// The stylesheet model.
pub mod model;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

// Re-exports for convenience
pub use builder::{
    BuildOutput, DefaultPreparator, DefaultRuleFactory, PendingImport, PrepareContext,
    Preparator, RuleFactory, TreeBuilder,
};
pub use error::{CssError, ImportError, LexError, ParseError, SyntaxError};
pub use import::{CachedSheet, CssParser, CssParserBuilder, ParseOptions, RuleCache, Source};
pub use input::CssInput;
pub use media::{AutoImportMedia, MediaExpression, MediaQuery, MediaQueryList, parse_media_query};
pub use model::{
    AttributeOperator, CombinedSelector, Combinator, Declaration, ElementRef, Origin, Priority,
    RuleBlock, RuleImport, RuleList, RuleMedia, RulePage, RuleSet, Selector, SelectorStep,
    Stylesheet, Term,
};
pub use parser::{ParseMode, Parser, SyntaxTree};
pub use tokenizer::{CSSToken, CSSTokenizer, SourcePosition, Token, tokenize};
