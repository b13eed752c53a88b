//! Glob and extended-glob node filters.

use std::path::Path;

use globset::{Glob, GlobMatcher};

use super::{FilterCore, FilterDef, NodeFilter};
use crate::error::ConfigError;
use crate::nav::item::TraverseItem;
use crate::nav::scope::FilterScope;

pub(crate) fn compile_glob(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })
}

/// Shell-style glob matched against the node's base name.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    core: FilterCore,
    matcher: GlobMatcher,
}

impl GlobFilter {
    /// Compile the filter described by `def`.
    pub fn new(def: &FilterDef) -> Result<Self, ConfigError> {
        Ok(Self {
            core: FilterCore::from_def(def),
            matcher: compile_glob(&def.pattern)?,
        })
    }
}

impl NodeFilter for GlobFilter {
    fn description(&self) -> &str {
        &self.core.description
    }

    fn source(&self) -> &str {
        &self.core.source
    }

    fn is_match(&self, item: &TraverseItem) -> bool {
        self.core
            .decide(item, || self.matcher.is_match(item.name()))
    }

    fn scope(&self) -> FilterScope {
        self.core.scope
    }
}

/// Which extensions an extended glob accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Extensions {
    /// `stem|*`
    Any,
    /// `stem|` (files without an extension)
    Absent,
    /// `stem|jpg,png`
    OneOf(Vec<String>),
}

/// Glob over a file's stem plus an extension allow-list.
///
/// The pattern has the form `<stem-glob>|<ext>,<ext>`: `*` as the list
/// accepts any extension and an empty list accepts only files without one.
/// Extensions compare case-insensitively and may be written with a leading
/// dot. Folders are matched on their whole name against the stem glob.
#[derive(Debug, Clone)]
pub struct ExtendedGlobFilter {
    core: FilterCore,
    stem: GlobMatcher,
    extensions: Extensions,
}

impl ExtendedGlobFilter {
    /// Parse and compile the filter described by `def`.
    pub fn new(def: &FilterDef) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidExtendedGlob {
            pattern: def.pattern.clone(),
            reason: reason.to_string(),
        };

        let (stem, list) = def
            .pattern
            .split_once('|')
            .ok_or_else(|| invalid("expected '<glob>|<extensions>'"))?;
        let stem = stem.trim();
        if stem.is_empty() {
            return Err(invalid("missing glob before '|'"));
        }
        if list.contains('|') {
            return Err(invalid("more than one '|'"));
        }

        let list = list.trim();
        let extensions = if list == "*" {
            Extensions::Any
        } else if list.is_empty() {
            Extensions::Absent
        } else {
            let exts: Vec<String> = list
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .collect();
            if exts.iter().any(String::is_empty) {
                return Err(invalid("empty extension in list"));
            }
            Extensions::OneOf(exts)
        };

        Ok(Self {
            core: FilterCore::from_def(def),
            stem: compile_glob(stem)?,
            extensions,
        })
    }

    fn raw_match(&self, item: &TraverseItem) -> bool {
        let name = item.name();
        if item.is_dir() {
            return self.stem.is_match(&name);
        }

        let path = Path::new(&name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        let extension_ok = match (&self.extensions, &extension) {
            (Extensions::Any, _) => true,
            (Extensions::Absent, ext) => ext.is_none(),
            (Extensions::OneOf(list), Some(ext)) => list.iter().any(|e| e == ext),
            (Extensions::OneOf(_), None) => false,
        };
        extension_ok && self.stem.is_match(&stem)
    }
}

impl NodeFilter for ExtendedGlobFilter {
    fn description(&self) -> &str {
        &self.core.description
    }

    fn source(&self) -> &str {
        &self.core.source
    }

    fn is_match(&self, item: &TraverseItem) -> bool {
        self.core.decide(item, || self.raw_match(item))
    }

    fn scope(&self) -> FilterScope {
        self.core.scope
    }
}
