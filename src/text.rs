//! Display text for errors handed to the caller.
//!
//! The walker never formats user-facing error text itself. It asks the
//! [`TextLookup`] carried by the session's [`NavContext`], so callers can
//! swap in their own wording or language without any process-wide state.

use std::path::Path;
use std::sync::Arc;

/// Identifies a piece of display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextId {
    /// A path does not exist.
    PathNotFound,
    /// A directory could not be read.
    ReadDirFailed,
    /// The status of a path could not be queried.
    QueryStatusFailed,
}

/// Renders display text for diagnostics.
pub trait TextLookup: Send + Sync {
    /// Render the text for `id`, concerning `path`, with optional detail
    /// taken from the underlying error.
    fn text(&self, id: TextId, path: &Path, detail: Option<&str>) -> String;
}

/// Plain English text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultText;

impl TextLookup for DefaultText {
    fn text(&self, id: TextId, path: &Path, detail: Option<&str>) -> String {
        let head = match id {
            TextId::PathNotFound => "path not found",
            TextId::ReadDirFailed => "failed to read directory",
            TextId::QueryStatusFailed => "failed to query status",
        };
        match detail {
            Some(detail) => format!("{}: {} ({})", head, path.display(), detail),
            None => format!("{}: {}", head, path.display()),
        }
    }
}

/// Explicit context passed to session construction.
#[derive(Clone)]
pub struct NavContext {
    /// Text lookup used to render errors.
    pub text: Arc<dyn TextLookup>,
}

impl NavContext {
    /// Context using a custom text lookup.
    #[must_use]
    pub fn new(text: Arc<dyn TextLookup>) -> Self {
        Self { text }
    }
}

impl Default for NavContext {
    fn default() -> Self {
        Self {
            text: Arc::new(DefaultText),
        }
    }
}

impl std::fmt::Debug for NavContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavContext")
            .field("text", &"<text lookup>")
            .finish()
    }
}
