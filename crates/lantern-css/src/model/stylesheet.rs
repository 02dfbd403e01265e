//! The stylesheet: the ordered rule list one parse produces.

use core::fmt;

use serde::Serialize;

use super::rule::RuleBlock;

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// An ordered, append-only collection of rule blocks. Imported rules sit
/// at the position of the `@import` that pulled them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stylesheet {
    /// Rule blocks in document order.
    pub rules: Vec<RuleBlock>,
}

impl Stylesheet {
    /// Create an empty, open stylesheet.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append one rule block.
    pub fn push(&mut self, rule: RuleBlock) {
        self.rules.push(rule);
    }

    /// Number of top-level rule blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the stylesheet holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the top-level rule blocks.
    pub fn iter(&self) -> core::slice::Iter<'_, RuleBlock> {
        self.rules.iter()
    }
}

impl Extend<RuleBlock> for Stylesheet {
    fn extend<T: IntoIterator<Item = RuleBlock>>(&mut self, iter: T) {
        self.rules.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Stylesheet {
    type Item = &'a RuleBlock;
    type IntoIter = core::slice::Iter<'a, RuleBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
