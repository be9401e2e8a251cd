//! bump CLI
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use rlog::{Cli, commands};
use rlog_core::config::ConfigLoader;
use rlog_core::console;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.color.apply();

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;

    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig {
        log_dir: config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    };
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level);
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize diagnostics logging")?;

    console::global().set_threshold(cli.console_threshold(config.log_level));

    debug!(
        level = %cli.level,
        verbose = cli.verbose,
        quiet = cli.quiet,
        dry_run = cli.dry_run,
        color = ?cli.color,
        chdir = ?cli.chdir,
        "CLI initialized"
    );

    let result = commands::bump::cmd_bump(cli.level, cli.dry_run, &config, &cwd);
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
