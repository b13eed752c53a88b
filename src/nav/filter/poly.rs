//! Poly filter: folder selection gating file visibility.

use super::{new_node_filter, FilterCore, FilterDef, FilterKind, NodeFilter};
use crate::error::ConfigError;
use crate::nav::item::TraverseItem;
use crate::nav::scope::FilterScope;

/// Combines a file filter and a folder filter.
///
/// Before negation folders always match, so descent and folder visits are
/// unaffected. A file matches only when it passes the file filter and its
/// parent folder passes the folder filter. The poly definition's own scope,
/// negation and "if not applicable" default apply on top.
pub struct PolyFilter {
    core: FilterCore,
    file: Box<dyn NodeFilter>,
    folder: Box<dyn NodeFilter>,
}

impl PolyFilter {
    /// Build both halves described by `def`.
    pub fn new(def: &FilterDef) -> Result<Self, ConfigError> {
        let poly = def.poly.as_ref().ok_or_else(|| {
            ConfigError::InvalidFilterDef("poly filter requires file and folder filters".into())
        })?;
        if poly.file.kind == FilterKind::Poly || poly.folder.kind == FilterKind::Poly {
            return Err(ConfigError::InvalidFilterDef(
                "poly filters cannot be nested".into(),
            ));
        }

        Ok(Self {
            core: FilterCore::from_def(def),
            file: new_node_filter(&poly.file)?,
            folder: new_node_filter(&poly.folder)?,
        })
    }
}

impl NodeFilter for PolyFilter {
    fn description(&self) -> &str {
        &self.core.description
    }

    fn source(&self) -> &str {
        self.file.source()
    }

    fn is_match(&self, item: &TraverseItem) -> bool {
        self.core.decide(item, || {
            if item.is_dir() {
                return true;
            }
            let parent_ok = item
                .parent
                .as_deref()
                .map_or(true, |parent| self.folder.is_match(parent));
            parent_ok && self.file.is_match(item)
        })
    }

    fn scope(&self) -> FilterScope {
        self.core.scope
    }
}
