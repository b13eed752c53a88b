//! Filter engine.
//!
//! Two shapes of filter exist:
//!
//! - [`NodeFilter`]: decides for one node. It carries a [`FilterScope`];
//!   when the node's scope does not intersect it, the filter is not
//!   applicable and the configured "if not applicable" outcome is used.
//! - [`CompoundFilter`]: trims a whole sibling list in one call.
//!
//! Filters are built from declarative definitions ([`FilterDef`],
//! [`CompoundFilterDef`]) that round-trip through persisted state. Patterns
//! are compiled when the filter is built, so a malformed pattern fails
//! session setup rather than the walk.

pub mod compound;
pub mod glob;
pub mod poly;
pub mod regex;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::nav::item::{DirEntry, TraverseItem};
use crate::nav::scope::FilterScope;

pub use self::compound::{CompoundGlobFilter, CompoundRegexFilter};
pub use self::glob::{ExtendedGlobFilter, GlobFilter};
pub use self::poly::PolyFilter;
pub use self::regex::RegexFilter;

/// A per-node filter.
pub trait NodeFilter: Send + Sync {
    /// Human readable description.
    fn description(&self) -> &str;

    /// Re-check the filter's configuration. Built-in filters are validated
    /// when constructed; custom filters may do their checks here.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// The pattern the filter was built from.
    fn source(&self) -> &str;

    /// Final decision for `item`, including scope, negation and the
    /// "if not applicable" default.
    fn is_match(&self, item: &TraverseItem) -> bool;

    /// Whether the filter applies to the item's scope.
    fn is_applicable(&self, item: &TraverseItem) -> bool {
        self.scope().intersects(item.scope())
    }

    /// The scope the filter is restricted to.
    fn scope(&self) -> FilterScope;
}

/// A filter over a set of siblings.
pub trait CompoundFilter: Send + Sync {
    /// Human readable description.
    fn description(&self) -> &str;

    /// The pattern the filter was built from.
    fn source(&self) -> &str;

    /// The subset of `entries` that pass, in their original order.
    fn matching(&self, entries: Vec<DirEntry>) -> Vec<DirEntry>;
}

/// Three-valued flag used for the "if not applicable" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriStateBool {
    /// Not set: a non-applicable filter lets the node through
    #[default]
    Undefined,
    /// A non-applicable filter matches
    True,
    /// A non-applicable filter rejects
    False,
}

impl TriStateBool {
    fn or_default(self, default: bool) -> bool {
        match self {
            Self::Undefined => default,
            Self::True => true,
            Self::False => false,
        }
    }
}

/// Kinds of filter that can be defined declaratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// Shell-style glob on the base name
    Glob,
    /// Glob on the stem plus an extension list: `stem-glob|ext,ext`
    ExtendedGlob,
    /// Regular expression on the base name
    Regex,
    /// A file filter and a folder filter combined
    Poly,
}

/// Declarative definition of a node filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDef {
    /// Filter kind
    pub kind: FilterKind,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Pattern (unused for poly filters)
    #[serde(default)]
    pub pattern: String,
    /// Scopes the filter applies to
    #[serde(default)]
    pub scope: FilterScope,
    /// Invert the final decision
    #[serde(default)]
    pub negate: bool,
    /// Outcome when the filter is not applicable
    #[serde(default)]
    pub if_not_applicable: TriStateBool,
    /// Halves of a poly filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poly: Option<PolyDef>,
}

impl FilterDef {
    /// Definition of a `kind` filter on `pattern` applying to every scope.
    #[must_use]
    pub fn new(kind: FilterKind, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            kind,
            description: pattern.clone(),
            pattern,
            scope: FilterScope::ALL,
            negate: false,
            if_not_applicable: TriStateBool::Undefined,
            poly: None,
        }
    }

    /// Poly definition combining a file and a folder filter.
    #[must_use]
    pub fn poly(file: FilterDef, folder: FilterDef) -> Self {
        Self {
            kind: FilterKind::Poly,
            description: format!("poly({} / {})", file.description, folder.description),
            pattern: String::new(),
            scope: FilterScope::ALL,
            negate: false,
            if_not_applicable: TriStateBool::Undefined,
            poly: Some(PolyDef {
                file: Box::new(file),
                folder: Box::new(folder),
            }),
        }
    }

    /// Restrict to `scope`.
    #[must_use]
    pub fn with_scope(mut self, scope: FilterScope) -> Self {
        self.scope = scope;
        self
    }

    /// Invert the decision.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Outcome when not applicable.
    #[must_use]
    pub fn if_not_applicable(mut self, value: TriStateBool) -> Self {
        self.if_not_applicable = value;
        self
    }
}

/// File and folder halves of a poly filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyDef {
    /// Applied to files
    pub file: Box<FilterDef>,
    /// Applied to the parent folder of each file
    pub folder: Box<FilterDef>,
}

/// Kinds of compound filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundFilterKind {
    /// Glob on entry names
    Glob,
    /// Regex on entry names
    Regex,
}

/// Declarative definition of a compound filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundFilterDef {
    /// Filter kind
    pub kind: CompoundFilterKind,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Pattern
    pub pattern: String,
    /// Keep the entries that do not match instead
    #[serde(default)]
    pub negate: bool,
}

impl CompoundFilterDef {
    /// Definition of a `kind` compound filter on `pattern`.
    #[must_use]
    pub fn new(kind: CompoundFilterKind, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            kind,
            description: pattern.clone(),
            pattern,
            negate: false,
        }
    }
}

/// Node and children filter definitions of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinitions {
    /// Per-node filter deciding callback invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<FilterDef>,
    /// Sibling filter restricting the files of each directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<CompoundFilterDef>,
}

/// Settings shared by every node filter: scope, negation and the
/// "if not applicable" outcome.
#[derive(Debug, Clone)]
pub(crate) struct FilterCore {
    pub(crate) description: String,
    pub(crate) source: String,
    pub(crate) scope: FilterScope,
    pub(crate) negate: bool,
    pub(crate) if_not_applicable: TriStateBool,
}

impl FilterCore {
    pub(crate) fn from_def(def: &FilterDef) -> Self {
        Self {
            description: def.description.clone(),
            source: def.pattern.clone(),
            scope: def.scope,
            negate: def.negate,
            if_not_applicable: def.if_not_applicable,
        }
    }

    /// Apply scope, then the raw match, then negation.
    pub(crate) fn decide(&self, item: &TraverseItem, raw: impl FnOnce() -> bool) -> bool {
        if !self.scope.intersects(item.scope()) {
            return self.if_not_applicable.or_default(true);
        }
        raw() != self.negate
    }
}

/// Build a node filter from its definition, compiling its pattern.
pub fn new_node_filter(def: &FilterDef) -> Result<Box<dyn NodeFilter>, ConfigError> {
    let filter: Box<dyn NodeFilter> = match def.kind {
        FilterKind::Glob => Box::new(GlobFilter::new(def)?),
        FilterKind::ExtendedGlob => Box::new(ExtendedGlobFilter::new(def)?),
        FilterKind::Regex => Box::new(RegexFilter::new(def)?),
        FilterKind::Poly => Box::new(PolyFilter::new(def)?),
    };
    filter.validate()?;
    Ok(filter)
}

/// Build a compound filter from its definition, compiling its pattern.
pub fn new_compound_filter(def: &CompoundFilterDef) -> Result<Box<dyn CompoundFilter>, ConfigError> {
    Ok(match def.kind {
        CompoundFilterKind::Glob => Box::new(CompoundGlobFilter::new(def)?),
        CompoundFilterKind::Regex => Box::new(CompoundRegexFilter::new(def)?),
    })
}
