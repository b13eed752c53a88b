//! Compound filters operating on a whole sibling list.

use globset::GlobMatcher;
use regex::Regex;

use super::glob::compile_glob;
use super::regex::compile_regex;
use super::{CompoundFilter, CompoundFilterDef};
use crate::error::ConfigError;
use crate::nav::item::DirEntry;

/// Keeps the siblings whose name matches a glob.
#[derive(Debug, Clone)]
pub struct CompoundGlobFilter {
    description: String,
    source: String,
    negate: bool,
    matcher: GlobMatcher,
}

impl CompoundGlobFilter {
    /// Compile the filter described by `def`.
    pub fn new(def: &CompoundFilterDef) -> Result<Self, ConfigError> {
        Ok(Self {
            description: def.description.clone(),
            source: def.pattern.clone(),
            negate: def.negate,
            matcher: compile_glob(&def.pattern)?,
        })
    }
}

impl CompoundFilter for CompoundGlobFilter {
    fn description(&self) -> &str {
        &self.description
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn matching(&self, entries: Vec<DirEntry>) -> Vec<DirEntry> {
        entries
            .into_iter()
            .filter(|e| self.matcher.is_match(&e.name) != self.negate)
            .collect()
    }
}

/// Keeps the siblings whose name matches a regex.
#[derive(Debug, Clone)]
pub struct CompoundRegexFilter {
    description: String,
    source: String,
    negate: bool,
    rx: Regex,
}

impl CompoundRegexFilter {
    /// Compile the filter described by `def`.
    pub fn new(def: &CompoundFilterDef) -> Result<Self, ConfigError> {
        Ok(Self {
            description: def.description.clone(),
            source: def.pattern.clone(),
            negate: def.negate,
            rx: compile_regex(&def.pattern)?,
        })
    }
}

impl CompoundFilter for CompoundRegexFilter {
    fn description(&self) -> &str {
        &self.description
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn matching(&self, entries: Vec<DirEntry>) -> Vec<DirEntry> {
        entries
            .into_iter()
            .filter(|e| self.rx.is_match(&e.name) != self.negate)
            .collect()
    }
}
