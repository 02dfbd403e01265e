//! Construction of model values.
//!
//! The tree builder never creates a model value directly. Every rule,
//! selector and declaration goes through a [`RuleFactory`], so an embedder
//! can intern strings, attach ids, or count allocations by overriding the
//! relevant methods.

use crate::media::MediaQueryList;
use crate::model::{
    AttributeOperator, CombinedSelector, Declaration, ElementRef, Priority, RuleBlock, RuleImport,
    RuleMedia, RulePage, RuleSet, Selector, SelectorStep, Stylesheet, Term,
};

/// One creation operation per model variant.
///
/// All methods have default implementations building the plain model
/// value; [`DefaultRuleFactory`] uses them unchanged.
pub trait RuleFactory: Send + Sync {
    /// Create a declaration.
    fn create_declaration(&self, property: String, terms: Vec<Term>, important: bool) -> Declaration {
        Declaration {
            property,
            terms,
            important,
        }
    }

    /// Create a type or universal selector.
    fn create_element_name(&self, name: String) -> Selector {
        Selector::ElementName(name)
    }

    /// Create a class selector.
    fn create_class(&self, class: String) -> Selector {
        Selector::ElementClass(class)
    }

    /// Create an ID selector.
    fn create_id(&self, id: String) -> Selector {
        Selector::ElementId(id)
    }

    /// Create an attribute selector.
    fn create_attribute(
        &self,
        name: String,
        operator: AttributeOperator,
        value: String,
        is_string_value: bool,
    ) -> Selector {
        Selector::ElementAttribute {
            name,
            operator,
            value,
            is_string_value,
        }
    }

    /// Create a pseudo-class, pseudo-element or page pseudo-class selector.
    fn create_pseudo_page(&self, name: String, function: Option<String>) -> Selector {
        Selector::PseudoPage { name, function }
    }

    /// Create the selector of an inline style's element.
    fn create_element_ref(&self, element: ElementRef) -> Selector {
        Selector::ElementRef(element)
    }

    /// Create a combined selector from its steps.
    fn create_combined_selector(&self, steps: Vec<SelectorStep>) -> CombinedSelector {
        CombinedSelector { steps }
    }

    /// Create a style rule.
    fn create_rule_set(
        &self,
        priority: Priority,
        selectors: Vec<CombinedSelector>,
        declarations: Vec<Declaration>,
    ) -> RuleBlock {
        RuleBlock::Set(RuleSet {
            priority,
            selectors,
            declarations,
        })
    }

    /// Create an `@media` block.
    fn create_rule_media(
        &self,
        priority: Priority,
        media: MediaQueryList,
        rules: Vec<RuleBlock>,
    ) -> RuleBlock {
        RuleBlock::Media(RuleMedia {
            priority,
            media,
            rules,
        })
    }

    /// Create an `@page` block.
    fn create_rule_page(
        &self,
        priority: Priority,
        name: Option<String>,
        pseudo: Option<Selector>,
        declarations: Vec<Declaration>,
    ) -> RuleBlock {
        RuleBlock::Page(RulePage {
            priority,
            name,
            pseudo,
            declarations,
        })
    }

    /// Create an unexpanded `@import` block.
    fn create_rule_import(&self, priority: Priority, uri: String, media: MediaQueryList) -> RuleBlock {
        RuleBlock::Import(RuleImport {
            priority,
            uri,
            media,
        })
    }

    /// Create an empty, open stylesheet.
    fn create_stylesheet(&self) -> Stylesheet {
        Stylesheet::new()
    }
}

/// Factory building the plain model values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuleFactory;

impl RuleFactory for DefaultRuleFactory {}
