//! Chunked render URL resolution.

use futures_util::future::try_join_all;
use tracing::{debug, instrument, warn};

use super::descriptor::IconDescriptor;
use super::error::ExportError;
use crate::figma::{DesignApi, ImageFormat};

/// Resolves SVG render URLs for every descriptor.
///
/// Descriptors are split into consecutive chunks of at most `chunk_size` and
/// one request per chunk is issued, all concurrently. The returned list keeps
/// the input order whatever order the chunks complete in. Ids the service
/// could not render are left with `image_url == None`.
///
/// # Errors
///
/// Returns [`ExportError::Resolution`] when any chunk request fails; no
/// partial result is returned.
#[instrument(skip(descriptors, api), fields(icons = descriptors.len()))]
pub async fn resolve_urls(
    descriptors: Vec<IconDescriptor>,
    api: &dyn DesignApi,
    file_id: &str,
    chunk_size: usize,
) -> Result<Vec<IconDescriptor>, ExportError> {
    let chunk_size = chunk_size.max(1);
    if descriptors.is_empty() {
        return Ok(descriptors);
    }

    let requests = descriptors
        .chunks(chunk_size)
        .enumerate()
        .map(|(chunk, icons)| {
            let ids: Vec<String> = icons.iter().map(|icon| icon.id.clone()).collect();
            async move {
                debug!(chunk, ids = ids.len(), "resolving chunk");
                api.resolve_image_urls(file_id, &ids, ImageFormat::Svg)
                    .await
                    .map_err(|source| ExportError::Resolution { chunk, source })
            }
        });
    let url_maps = try_join_all(requests).await?;

    let mut resolved = Vec::with_capacity(descriptors.len());
    for (icons, urls) in descriptors.chunks(chunk_size).zip(url_maps) {
        resolved.extend(icons.iter().map(|icon| IconDescriptor {
            image_url: urls.get(&icon.id).cloned().flatten(),
            ..icon.clone()
        }));
    }
    Ok(resolved)
}

/// Splits descriptors into those with a usable URL and those without.
///
/// Unresolved icons are logged and dropped from the download batch.
pub fn partition_resolved(
    descriptors: Vec<IconDescriptor>,
) -> (Vec<IconDescriptor>, Vec<IconDescriptor>) {
    let (resolved, unresolved): (Vec<_>, Vec<_>) = descriptors
        .into_iter()
        .partition(|icon| icon.resolved_url().is_some());
    for icon in &unresolved {
        warn!(
            id = %icon.id,
            name = %icon.raw_name,
            "no render URL for icon, skipping"
        );
    }
    (resolved, unresolved)
}
