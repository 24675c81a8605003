//! Flat icon record passed between pipeline stages.

use super::DUPLICATE_MARKER;

/// One exportable icon found in a page.
///
/// Stages never mutate shared descriptors: each takes the list by value and
/// returns an updated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDescriptor {
    /// Node id, unique within the document.
    pub id: String,
    /// Node label as authored, including any `variant=value` prefix.
    pub raw_name: String,
    /// Sanitized, collision-free file stem.
    pub resolved_name: String,
    /// Name of the immediate parent node.
    pub path: String,
    /// Nearest named ancestor; becomes the output subdirectory.
    pub category: String,
    /// Render URL, set once URL resolution succeeds.
    pub image_url: Option<String>,
}

impl IconDescriptor {
    /// Whether the resolved name carries the duplicate marker.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.resolved_name.contains(DUPLICATE_MARKER)
    }

    /// Returns the render URL if it is present and non-empty.
    #[must_use]
    pub fn resolved_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
