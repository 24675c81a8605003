//! One export run from parsed arguments to printed report.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Result;
use tracing::{debug, info};

use figma_icons_core::{ExportContext, Exporter};

use crate::app::{config_manager, progress_manager, terminal};
use crate::cli::Args;

pub(crate) async fn run_export(args: &Args) -> Result<()> {
    let config = config_manager::resolve_config(args)?;
    let ctx = ExportContext::from_config(&config)?;
    info!(
        file_id = %ctx.file_id,
        pages = ?ctx.selection.pages(),
        output = %ctx.icons_path.display(),
        "exporting icons"
    );

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let (spinner, stop) = progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&ctx.progress));

    let result = Exporter::new(ctx).run().await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }

    let summary = result?;
    debug!(
        pages = summary.pages,
        icons = summary.icons_found,
        "export summary ready"
    );
    if !args.quiet {
        print!("{}", summary.report);
    }
    Ok(())
}
