// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build and serve a static website: styles, scripts, includes, live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Target to run: styles, scripts, watching, browsersync, htmlInclude,
    /// build or default.
    #[arg(value_name = "TARGET", default_value = "default")]
    pub target: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Sitepipe.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root that the app and release directories are relative to.
    ///
    /// Default: the directory of `--config`, else the working directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_defaults_to_default() {
        let args = CliArgs::try_parse_from(["sitepipe"]).unwrap();
        assert_eq!(args.target, "default");
        assert!(args.config.is_none());
    }

    #[test]
    fn flags_parse() {
        let args = CliArgs::try_parse_from([
            "sitepipe",
            "build",
            "--config",
            "site/Sitepipe.toml",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.target, "build");
        assert_eq!(args.config, Some(PathBuf::from("site/Sitepipe.toml")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
