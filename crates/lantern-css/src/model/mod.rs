//! The stylesheet model produced by the pipeline.
//!
//! Every value here is created through a
//! [`RuleFactory`](crate::builder::RuleFactory), so embedders can swap in
//! their own construction logic without touching the parser.

/// Declarations and value terms.
pub mod declaration;
/// Rule blocks and priorities.
pub mod rule;
/// Simple and combined selectors.
pub mod selector;
/// The stylesheet container.
pub mod stylesheet;

pub use declaration::{Declaration, Term};
pub(crate) use declaration::write_terms;
pub use rule::{Origin, Priority, RuleBlock, RuleImport, RuleList, RuleMedia, RulePage, RuleSet};
pub use selector::{
    AttributeOperator, CombinedSelector, Combinator, ElementRef, Selector, SelectorStep,
};
pub use stylesheet::Stylesheet;
