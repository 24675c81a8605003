//! CLI entry point for the icon exporter.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod app;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    app::terminal::init_tracing(app::terminal::default_log_level(args.verbose, args.quiet));
    debug!(?args, "CLI arguments parsed");

    match app::runtime::run_export(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
