//! Turns a syntax tree into model rules.
//!
//! The walk happens once, in source order. `@import` rules are not built:
//! they are handed back as [`PendingImport`]s for the import orchestrator.

use super::factory::RuleFactory;
use super::preparator::{PrepareContext, Preparator};
use crate::error::SyntaxError;
use crate::media::MediaQueryList;
use crate::model::{
    CombinedSelector, Declaration, Origin, Priority, RuleBlock, RuleList, Selector, SelectorStep,
};
use crate::parser::{
    DeclarationNode, RuleNode, SelectorNode, SimpleSelectorNode, SyntaxTree, to_terms,
};

/// An `@import` left for the orchestrator to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImport {
    /// The target as written.
    pub path: String,
    /// The media condition, empty when absent.
    pub media: MediaQueryList,
}

/// What one syntax tree builds into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    /// Built rules in source order.
    pub rules: RuleList,
    /// Imports in source order.
    pub imports: Vec<PendingImport>,
}

/// Builds model rules through a factory, passing each item through a
/// preparator.
pub struct TreeBuilder<'a> {
    factory: &'a dyn RuleFactory,
    preparator: &'a dyn Preparator,
    context: PrepareContext,
    priority: Priority,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for one source.
    pub fn new(
        factory: &'a dyn RuleFactory,
        preparator: &'a dyn Preparator,
        context: PrepareContext,
    ) -> Self {
        let origin = if context.inline_priority {
            Origin::Inline
        } else {
            context.origin
        };
        Self {
            factory,
            preparator,
            context,
            priority: Priority::new(origin),
        }
    }

    /// Walk the tree and build its rules.
    #[must_use]
    pub fn build(&self, tree: SyntaxTree) -> BuildOutput {
        let mut output = BuildOutput::default();
        match tree {
            SyntaxTree::Declarations(declarations) => {
                output.rules.extend(self.build_inline(declarations));
            }
            SyntaxTree::Stylesheet(rules) => {
                for rule in rules {
                    match rule {
                        RuleNode::Import { href, media, .. } => {
                            output.imports.push(PendingImport { path: href, media });
                        }
                        rule => output.rules.extend(self.build_rule(rule)),
                    }
                }
            }
            SyntaxTree::MediaQueries { .. } => {
                log::debug!("a media query list builds no rules");
            }
        }
        output
    }

    /// The declarations of a `style` attribute become one rule set whose
    /// selector is the element the attribute belongs to.
    fn build_inline(&self, declarations: Vec<DeclarationNode>) -> Option<RuleBlock> {
        let declarations = self.build_declarations(declarations);
        if declarations.is_empty() {
            log::debug!("inline style without declarations builds no rule");
            return None;
        }
        let selectors = self
            .context
            .element
            .map(|element| {
                let selector = self.factory.create_element_ref(element);
                vec![self.factory.create_combined_selector(vec![SelectorStep {
                    compound: vec![selector],
                    combinator: None,
                }])]
            })
            .unwrap_or_default();
        let rule = self
            .factory
            .create_rule_set(self.priority, selectors, declarations);
        self.preparator.prepare_rule(rule, &self.context)
    }

    fn build_rule(&self, rule: RuleNode) -> Option<RuleBlock> {
        let rule = match rule {
            RuleNode::Set {
                selectors,
                declarations,
                position,
            } => {
                let selectors: Vec<CombinedSelector> =
                    selectors.into_iter().map(|s| self.build_selector(s)).collect();
                let declarations = self.build_declarations(declarations);
                if selectors.is_empty() || declarations.is_empty() {
                    log::debug!("{position}: dropping empty rule set");
                    return None;
                }
                self.factory
                    .create_rule_set(self.priority, selectors, declarations)
            }

            RuleNode::Media {
                media,
                rules,
                position,
            } => {
                let rules: Vec<RuleBlock> =
                    rules.into_iter().filter_map(|r| self.build_rule(r)).collect();
                if rules.is_empty() {
                    log::debug!("{position}: dropping empty @media {media}");
                    return None;
                }
                self.factory.create_rule_media(self.priority, media, rules)
            }

            RuleNode::Page {
                name,
                pseudo,
                declarations,
                position,
            } => {
                let declarations = self.build_declarations(declarations);
                if declarations.is_empty() {
                    log::debug!("{position}: dropping empty @page");
                    return None;
                }
                let pseudo = pseudo.map(|p| self.factory.create_pseudo_page(p, None));
                self.factory
                    .create_rule_page(self.priority, name, pseudo, declarations)
            }

            // Nested imports are discarded by the parser; a stray one here
            // has nobody to expand it.
            RuleNode::Import { position, .. } => {
                log::debug!("{position}: ignoring nested @import");
                return None;
            }
        };
        self.preparator.prepare_rule(rule, &self.context)
    }

    fn build_selector(&self, selector: SelectorNode) -> CombinedSelector {
        let steps = selector
            .steps
            .into_iter()
            .map(|step| SelectorStep {
                compound: step
                    .compound
                    .into_iter()
                    .map(|simple| self.build_simple_selector(simple))
                    .collect(),
                combinator: step.combinator,
            })
            .collect();
        self.factory.create_combined_selector(steps)
    }

    fn build_simple_selector(&self, simple: SimpleSelectorNode) -> Selector {
        match simple {
            SimpleSelectorNode::Type(name) => self.factory.create_element_name(name),
            SimpleSelectorNode::Universal => self.factory.create_element_name("*".to_string()),
            SimpleSelectorNode::Class(class) => self.factory.create_class(class),
            SimpleSelectorNode::Id(id) => self.factory.create_id(id),
            SimpleSelectorNode::Attribute {
                name,
                operator,
                value,
                is_string_value,
            } => self
                .factory
                .create_attribute(name, operator, value, is_string_value),
            SimpleSelectorNode::Pseudo { name, function } => {
                self.factory.create_pseudo_page(name, function)
            }
        }
    }

    fn build_declarations(&self, declarations: Vec<DeclarationNode>) -> Vec<Declaration> {
        declarations
            .into_iter()
            .filter_map(|d| self.build_declaration(d))
            .collect()
    }

    fn build_declaration(&self, declaration: DeclarationNode) -> Option<Declaration> {
        let DeclarationNode {
            property,
            value,
            important,
            position,
        } = declaration;

        let Some(terms) = to_terms(&value) else {
            log::debug!(
                "{}; skipping declaration",
                SyntaxError::InvalidValue { property, position }
            );
            return None;
        };
        if terms.is_empty() {
            log::debug!("{position}: dropping `{property}` without a value");
            return None;
        }

        let declaration =
            self.factory
                .create_declaration(property.to_ascii_lowercase(), terms, important);
        self.preparator
            .prepare_declaration(declaration, &self.context)
    }
}
