//! Library interface for the `bump` CLI.
//!
//! This crate exposes the CLI's argument parser as a library, primarily for
//! testing. The actual entry point is in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`commands`] - Command implementations

pub mod commands;

use clap::{CommandFactory, Parser};
use rlog_core::{BumpLevel, LogLevel};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup, before anything is written.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG           Diagnostics filter (e.g., debug, rlog_core=trace)
    BUMP_LOG_PATH      Explicit diagnostics log file path
    BUMP_LOG_DIR       Diagnostics log directory
";

/// Command-line interface definition for bump.
#[derive(Parser, Debug)]
#[command(name = "bump")]
#[command(
    about = "Bump the project version, then commit, tag, and push it",
    long_about = None
)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// Which part of the version to bump
    #[arg(value_enum)]
    pub level: BumpLevel,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Print the plan without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Cli {
    /// Console threshold from `-q`/`-v`, falling back to `configured`.
    pub const fn console_threshold(&self, configured: LogLevel) -> LogLevel {
        if self.quiet {
            return LogLevel::Error;
        }
        match self.verbose {
            0 => configured,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Returns the clap command, for help rendering and tests.
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parses_level_and_flags() {
        let cli = parse(&["rc", "-n", "-C", "/tmp"]);
        assert_eq!(cli.level, BumpLevel::Rc);
        assert!(cli.dry_run);
        assert_eq!(cli.chdir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Cli::try_parse_from(["bump", "huge"]).is_err());
        assert!(Cli::try_parse_from(["bump"]).is_err());
    }

    #[test]
    fn threshold_follows_flags_then_config() {
        assert_eq!(parse(&["patch"]).console_threshold(LogLevel::Warn), LogLevel::Warn);
        assert_eq!(parse(&["patch", "-q"]).console_threshold(LogLevel::Debug), LogLevel::Error);
        assert_eq!(parse(&["patch", "-v"]).console_threshold(LogLevel::Warn), LogLevel::Info);
        assert_eq!(parse(&["patch", "-vv"]).console_threshold(LogLevel::Warn), LogLevel::Debug);
        assert_eq!(parse(&["patch", "-vvv"]).console_threshold(LogLevel::Warn), LogLevel::Trace);
    }
}
