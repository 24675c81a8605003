//! End-to-end export run: fetch, extract, dedupe, resolve, download, report.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::batch::{partition_resolved, resolve_urls};
use super::context::ExportContext;
use super::dedupe::resolve_duplicates;
use super::descriptor::IconDescriptor;
use super::error::ExportError;
use super::extract::{extract_icons, find_page};
use super::naming::sanitize_path_segment;
use super::progress::Phase;
use super::report::Report;
use crate::download::{DownloadEngine, DownloadTarget};
use crate::figma::DocumentNode;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Per-file table and failure counts.
    pub report: Report,
    /// Pages exported.
    pub pages: usize,
    /// Icons found across all pages.
    pub icons_found: usize,
}

/// Icons of one page after naming, ready for URL resolution.
struct PagePlan {
    page: String,
    output_dir: PathBuf,
    icons: Vec<IconDescriptor>,
}

/// Runs exports for an [`ExportContext`].
#[derive(Debug)]
pub struct Exporter {
    ctx: ExportContext,
}

impl Exporter {
    /// Wraps a prepared context.
    #[must_use]
    pub fn new(ctx: ExportContext) -> Self {
        Self { ctx }
    }

    /// Runs the whole export.
    ///
    /// Fatal conditions stop the run; per-file download failures are retried,
    /// appended to the error log and counted in the report.
    ///
    /// # Errors
    ///
    /// - [`ExportError::TreeFetch`] when the document cannot be fetched
    /// - [`ExportError::PageNotFound`] when a selected page is missing
    /// - [`ExportError::NoIcons`] when no selected page has any icon
    /// - [`ExportError::Resolution`] when a URL request fails
    /// - [`ExportError::Io`] when the output root cannot be prepared
    #[instrument(skip(self), fields(file_id = %self.ctx.file_id))]
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        let ctx = &self.ctx;
        let engine = DownloadEngine::new(ctx.concurrency, ctx.retry_policy.clone())?;

        ctx.progress.set_phase(Phase::FetchingDocument);
        let document = ctx
            .api
            .fetch_document_tree(&ctx.file_id)
            .await
            .map_err(|source| ExportError::tree_fetch(&ctx.file_id, source))?;

        let plans = self.plan_pages(&document)?;
        let icons_found: usize = plans.iter().map(|plan| plan.icons.len()).sum();
        if icons_found == 0 {
            return Err(ExportError::NoIcons {
                pages: plans.into_iter().map(|plan| plan.page).collect(),
            });
        }
        info!(pages = plans.len(), icons = icons_found, "icons found");

        prepare_output_root(&ctx.icons_path, ctx.clean).await?;

        let mut report = Report::new(ctx.error_log.path());
        let pages = plans.len();
        for plan in plans {
            if plan.icons.is_empty() {
                continue;
            }

            ctx.progress.set_phase(Phase::ResolvingUrls {
                page: plan.page.clone(),
            });
            let icons = resolve_urls(plan.icons, ctx.api.as_ref(), &ctx.file_id, ctx.chunk_size)
                .await?;
            let (resolved, unresolved) = partition_resolved(icons);
            report.add_skipped(unresolved.len());

            let targets = download_targets(resolved, &plan.output_dir);
            ctx.progress.add_queued(targets.len());
            ctx.progress.set_phase(Phase::Downloading {
                page: plan.page.clone(),
            });
            info!(page = %plan.page, icons = targets.len(), "downloading icons");

            let batch = engine
                .download_all_tracked(
                    targets,
                    ctx.fetcher.clone(),
                    ctx.error_log.clone(),
                    ctx.progress.downloads(),
                )
                .await?;

            let page_dir = ctx
                .selection
                .is_multi_page()
                .then(|| sanitize_path_segment(&plan.page));
            report.add_outcomes(page_dir.as_deref(), &batch.outcomes);
        }

        ctx.progress.set_phase(Phase::Done);
        info!(
            written = report.rows().len(),
            failed = report.failed(),
            skipped = report.skipped(),
            "export finished"
        );

        Ok(ExportSummary {
            report,
            pages,
            icons_found,
        })
    }

    /// Looks up every selected page and names its icons.
    ///
    /// All lookups happen before any download so a missing page stops the
    /// run without touching the output directory.
    fn plan_pages(&self, document: &DocumentNode) -> Result<Vec<PagePlan>, ExportError> {
        let ctx = &self.ctx;
        let multi_page = ctx.selection.is_multi_page();

        ctx.selection
            .pages()
            .into_iter()
            .map(|page_name| {
                let page = find_page(document, page_name).ok_or_else(|| {
                    ExportError::PageNotFound {
                        page: page_name.to_string(),
                        available: document.children.iter().map(|p| p.name.clone()).collect(),
                    }
                })?;

                let icons = resolve_duplicates(extract_icons(page), ctx.duplicate_policy);
                if icons.is_empty() {
                    warn!(page = %page_name, "no icons on page");
                } else {
                    debug!(page = %page_name, icons = icons.len(), "planned page");
                }

                let output_dir = if multi_page {
                    ctx.icons_path.join(sanitize_path_segment(page_name))
                } else {
                    ctx.icons_path.clone()
                };
                Ok(PagePlan {
                    page: page_name.to_string(),
                    output_dir,
                    icons,
                })
            })
            .collect()
    }
}

/// Maps resolved icons to files under `output_dir/<category>/`.
fn download_targets(icons: Vec<IconDescriptor>, output_dir: &Path) -> Vec<DownloadTarget> {
    icons
        .into_iter()
        .filter_map(|icon| {
            let url = icon.resolved_url()?.to_string();
            Some(DownloadTarget::new(
                icon.raw_name,
                icon.resolved_name,
                url,
                output_dir.join(sanitize_path_segment(&icon.category)),
            ))
        })
        .collect()
}

/// Creates the output root, removing it first when `clean` is set.
async fn prepare_output_root(root: &Path, clean: bool) -> Result<(), ExportError> {
    if clean {
        match tokio::fs::remove_dir_all(root).await {
            Ok(()) => info!(path = %root.display(), "removed previous export"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ExportError::io(root, e)),
        }
    }
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| ExportError::io(root, e))
}
