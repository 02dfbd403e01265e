//! Post-processing hook for built declarations and rules.

use crate::model::{Declaration, ElementRef, Origin, RuleBlock};

/// What the tree builder knows about the source being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareContext {
    /// The element of an inline style, if any.
    pub element: Option<ElementRef>,
    /// Whether rules get inline priority.
    pub inline_priority: bool,
    /// Origin assigned to the built rules.
    pub origin: Origin,
}

/// Hook invoked on every declaration and every rule the builder produces.
///
/// Returning `None` drops the item. The defaults pass everything through.
pub trait Preparator: Send + Sync {
    /// Called once per built declaration, before it is placed in a rule.
    fn prepare_declaration(
        &self,
        declaration: Declaration,
        _context: &PrepareContext,
    ) -> Option<Declaration> {
        Some(declaration)
    }

    /// Called once per built rule, nested rules before their `@media`.
    fn prepare_rule(&self, rule: RuleBlock, _context: &PrepareContext) -> Option<RuleBlock> {
        Some(rule)
    }
}

/// Preparator that keeps everything unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPreparator;

impl Preparator for DefaultPreparator {}
