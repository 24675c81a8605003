//! Page lookup and icon extraction from the document tree.

use tracing::{debug, instrument};

use super::descriptor::IconDescriptor;
use super::naming::sanitize;
use crate::figma::DocumentNode;

/// Category used when neither an ancestor nor the page has a name.
const UNCATEGORIZED: &str = "uncategorized";

/// Returns the page (a direct child of the document root) called `name`.
#[must_use]
pub fn find_page<'a>(document: &'a DocumentNode, name: &str) -> Option<&'a DocumentNode> {
    document.child_named(name)
}

/// Walk state for one pending node.
struct Pending<'a> {
    node: &'a DocumentNode,
    parent_name: &'a str,
    parent_is_page: bool,
    inherited: String,
}

/// Flattens every component and instance under `page` into descriptors.
///
/// The walk is pre-order and depth-first, children in document order.
/// A node's category is the category inherited from above if one was
/// established, otherwise its parent's name (or the page name when the
/// parent is unnamed). Once set, the category sticks for the whole subtree.
/// The page itself never seeds a category, so a top-level frame names the
/// category of everything below it.
///
/// Exportable nodes do not stop the walk; nested components and instances
/// are emitted too. An explicit stack keeps deep trees off the call stack.
#[instrument(skip(page), fields(page = %page.name))]
pub fn extract_icons(page: &DocumentNode) -> Vec<IconDescriptor> {
    let page_category = if page.name.trim().is_empty() {
        UNCATEGORIZED
    } else {
        page.name.as_str()
    };

    let mut icons = Vec::new();
    let mut stack: Vec<Pending<'_>> = page
        .children
        .iter()
        .rev()
        .map(|node| Pending {
            node,
            parent_name: &page.name,
            parent_is_page: true,
            inherited: String::new(),
        })
        .collect();

    while let Some(Pending {
        node,
        parent_name,
        parent_is_page,
        inherited,
    }) = stack.pop()
    {
        let category = if !inherited.is_empty() {
            inherited
        } else if !parent_name.trim().is_empty() {
            parent_name.to_string()
        } else {
            page_category.to_string()
        };

        if node.node_type.is_exportable() {
            icons.push(IconDescriptor {
                id: node.id.clone(),
                raw_name: node.name.clone(),
                resolved_name: file_stem(node),
                path: parent_name.to_string(),
                category: category.clone(),
                image_url: None,
            });
        }

        let passed_down = if parent_is_page {
            String::new()
        } else {
            category
        };
        stack.extend(node.children.iter().rev().map(|child| Pending {
            node: child,
            parent_name: &node.name,
            parent_is_page: false,
            inherited: passed_down.clone(),
        }));
    }

    debug!(icons = icons.len(), "extracted icons");
    icons
}

/// Sanitized name, or `icon-<id>` when the name sanitizes to nothing.
fn file_stem(node: &DocumentNode) -> String {
    let stem = sanitize(&node.name);
    if stem.is_empty() {
        format!("icon-{}", sanitize(&node.id))
    } else {
        stem
    }
}
