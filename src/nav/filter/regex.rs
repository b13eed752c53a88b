//! Regular expression node filter.

use regex::Regex;

use super::{FilterCore, FilterDef, NodeFilter};
use crate::error::ConfigError;
use crate::nav::item::TraverseItem;
use crate::nav::scope::FilterScope;

pub(crate) fn compile_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Regex matched against the node's base name. The expression is compiled
/// once, when the filter is built.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    core: FilterCore,
    rx: Regex,
}

impl RegexFilter {
    /// Compile the filter described by `def`.
    pub fn new(def: &FilterDef) -> Result<Self, ConfigError> {
        Ok(Self {
            core: FilterCore::from_def(def),
            rx: compile_regex(&def.pattern)?,
        })
    }
}

impl NodeFilter for RegexFilter {
    fn description(&self) -> &str {
        &self.core.description
    }

    fn source(&self) -> &str {
        &self.core.source
    }

    fn is_match(&self, item: &TraverseItem) -> bool {
        self.core.decide(item, || self.rx.is_match(&item.name()))
    }

    fn scope(&self) -> FilterScope {
        self.core.scope
    }
}
