//! Configuration lifecycle: load the config file, then apply CLI overrides.

use anyhow::{Context, Result};
use tracing::debug;

use figma_icons_core::ExportConfig;

use crate::cli::Args;

/// Loads the config file named by `--config` and merges CLI overrides.
pub(crate) fn resolve_config(args: &Args) -> Result<ExportConfig> {
    let config = ExportConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    Ok(apply_cli_overrides(config, args))
}

/// CLI flags win over file values; absent flags leave the file value alone.
pub(crate) fn apply_cli_overrides(mut config: ExportConfig, args: &Args) -> ExportConfig {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = Some(usize::from(concurrency));
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = Some(u32::from(max_retries));
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = Some(usize::from(chunk_size));
    }
    if let Some(error_log) = &args.error_log {
        config.error_log_path = Some(error_log.clone());
    }
    if args.clean {
        config.clean = Some(true);
    }
    debug!(
        concurrency = config.concurrency(),
        max_retries = config.max_retries(),
        chunk_size = config.chunk_size(),
        "resolved configuration"
    );
    config
}
