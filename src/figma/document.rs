//! Serde model of the Figma node tree.
//!
//! Only the fields the exporter reads are modeled; everything else in the
//! payload is ignored.

use serde::Deserialize;

/// Node type tag.
///
/// Unknown tags deserialize to [`NodeType::Other`] and are traversed like any
/// other container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    ComponentSet,
    Component,
    Instance,
    #[default]
    #[serde(other)]
    Other,
}

impl NodeType {
    /// Components and instances are the only nodes exported as icons.
    #[must_use]
    pub fn is_exportable(self) -> bool {
        matches!(self, Self::Component | Self::Instance)
    }
}

/// One node of the document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Creates a childless node.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            children: Vec::new(),
        }
    }

    /// Builder-style child attachment.
    #[must_use]
    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    /// Returns the first direct child with the given name.
    #[must_use]
    pub fn child_named(&self, name: &str) -> Option<&DocumentNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Body of `GET /files/{key}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileResponse {
    pub(crate) document: DocumentNode,
}

/// Body of `GET /images/{key}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ImagesResponse {
    #[serde(default)]
    pub(crate) err: Option<String>,
    #[serde(default)]
    pub(crate) images: std::collections::HashMap<String, Option<String>>,
}
