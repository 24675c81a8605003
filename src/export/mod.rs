//! Icon export pipeline.
//!
//! A run flows through these stages, each taking and returning a list of
//! [`IconDescriptor`]s:
//!
//! 1. [`extract_icons`] flattens a page into descriptors with categories
//! 2. [`resolve_duplicates`] makes file stems unique within the page
//! 3. [`resolve_urls`] annotates descriptors with render URLs in chunks
//! 4. the download engine writes the files
//! 5. [`Report`] summarizes what was written
//!
//! [`Exporter`] drives the stages for every selected page.

mod batch;
mod context;
mod dedupe;
mod descriptor;
mod error;
mod extract;
mod naming;
mod pipeline;
mod progress;
mod report;

/// Default number of icons per URL resolution request.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Suffix marker appended to colliding file stems.
pub const DUPLICATE_MARKER: &str = "-duplicate-name";

pub use batch::{partition_resolved, resolve_urls};
pub use context::ExportContext;
pub use dedupe::resolve_duplicates;
pub use descriptor::IconDescriptor;
pub use error::ExportError;
pub use extract::{extract_icons, find_page};
pub use naming::{sanitize, sanitize_path_segment, stem};
pub use pipeline::{ExportSummary, Exporter};
pub use progress::{ExportProgress, Phase};
pub use report::{Report, ReportRow, format_size};
