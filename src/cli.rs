//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use figma_icons_core::config::DEFAULT_CONFIG_FILE;

/// Export icons from a Figma file into SVG files.
///
/// Pages, destination and credentials come from the JSON config file;
/// flags given here override the matching config values.
#[derive(Parser, Debug)]
#[command(name = "figma-export-icons")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to the JSON config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Maximum retry attempts per icon (0-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: Option<u8>,

    /// Icons per URL resolution request (1-500)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=500))]
    pub chunk_size: Option<u16>,

    /// File that failed downloads are appended to
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Remove the destination directory before exporting
    #[arg(long)]
    pub clean: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["figma-export-icons"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.config, PathBuf::from("icons-config.json"));
        assert_eq!(args.concurrency, None);
        assert_eq!(args.max_retries, None);
        assert_eq!(args.chunk_size, None);
        assert!(!args.clean);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["figma-export-icons", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["figma-export-icons", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["figma-export-icons", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_config_path_override() {
        let args =
            Args::try_parse_from(["figma-export-icons", "--config", "conf/icons.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("conf/icons.json"));
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["figma-export-icons", "-c", "100"]).unwrap();
        assert_eq!(args.concurrency, Some(100));

        let err = Args::try_parse_from(["figma-export-icons", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["figma-export-icons", "-c", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_retries_zero_allowed() {
        let args = Args::try_parse_from(["figma-export-icons", "-r", "0"]).unwrap();
        assert_eq!(args.max_retries, Some(0));

        let err = Args::try_parse_from(["figma-export-icons", "-r", "11"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_chunk_size_bounds() {
        let args = Args::try_parse_from(["figma-export-icons", "--chunk-size", "500"]).unwrap();
        assert_eq!(args.chunk_size, Some(500));

        let err = Args::try_parse_from(["figma-export-icons", "--chunk-size", "501"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_clean_and_error_log() {
        let args = Args::try_parse_from([
            "figma-export-icons",
            "--clean",
            "--error-log",
            "logs/failed.log",
        ])
        .unwrap();
        assert!(args.clean);
        assert_eq!(args.error_log, Some(PathBuf::from("logs/failed.log")));
    }
}
