//! Model construction from the syntax tree.

/// Model value construction.
pub mod factory;
/// Per-item post-processing hook.
pub mod preparator;
/// The syntax tree walk.
pub mod tree_builder;

pub use factory::{DefaultRuleFactory, RuleFactory};
pub use preparator::{DefaultPreparator, PrepareContext, Preparator};
pub use tree_builder::{BuildOutput, PendingImport, TreeBuilder};
