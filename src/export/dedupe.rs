//! Collision resolution for icon file stems within one page batch.

use std::collections::HashMap;

use tracing::warn;

use super::descriptor::IconDescriptor;
use super::naming::duplicate_stem;
use crate::config::DuplicatePolicy;

/// Makes every `resolved_name` in the batch unique.
///
/// Single pass in input order. When an icon's name is already held, the
/// duplicate marker goes to the earlier holder ([`DuplicatePolicy::Earlier`])
/// or to the newcomer ([`DuplicatePolicy::Later`]). The renamed icon takes
/// the first counter stem not yet used in the batch. Batches without
/// collisions come back unchanged.
///
/// # Example
///
/// ```
/// use figma_icons_core::{DuplicatePolicy, IconDescriptor, resolve_duplicates};
///
/// let icon = |name: &str| IconDescriptor {
///     id: name.to_string(),
///     raw_name: name.to_string(),
///     resolved_name: name.to_string(),
///     path: String::new(),
///     category: "Misc".to_string(),
///     image_url: None,
/// };
/// let out = resolve_duplicates(vec![icon("a"), icon("a"), icon("b")], DuplicatePolicy::Earlier);
/// let names: Vec<_> = out.iter().map(|i| i.resolved_name.as_str()).collect();
/// assert_eq!(names, ["a-duplicate-name", "a", "b"]);
/// ```
#[must_use]
pub fn resolve_duplicates(
    descriptors: Vec<IconDescriptor>,
    policy: DuplicatePolicy,
) -> Vec<IconDescriptor> {
    let mut resolved: Vec<IconDescriptor> = Vec::with_capacity(descriptors.len());
    // name -> index of the descriptor currently holding it
    let mut holders: HashMap<String, usize> = HashMap::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let index = resolved.len();
        let name = descriptor.resolved_name.clone();
        resolved.push(descriptor);

        let Some(&previous) = holders.get(&name) else {
            holders.insert(name, index);
            continue;
        };

        let (renamed_index, keeper_index) = match policy {
            DuplicatePolicy::Earlier => (previous, index),
            DuplicatePolicy::Later => (index, previous),
        };
        let new_name = first_free_stem(&name, &holders);
        warn!(
            name = %name,
            renamed_to = %new_name,
            raw_name = %resolved[renamed_index].raw_name,
            "duplicate icon name"
        );

        resolved[renamed_index].resolved_name.clone_from(&new_name);
        holders.insert(new_name, renamed_index);
        holders.insert(name, keeper_index);
    }

    resolved
}

fn first_free_stem(base: &str, taken: &HashMap<String, usize>) -> String {
    (1..)
        .map(|counter| duplicate_stem(base, counter))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
