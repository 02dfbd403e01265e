//! `@import` expansion and the entry points of the pipeline.

/// URL-keyed rule cache.
pub mod cache;
/// The parsing context tying all stages together.
pub mod orchestrator;

pub use cache::{CachedSheet, RuleCache};
pub use orchestrator::{CssParser, CssParserBuilder, ParseOptions, Source};
