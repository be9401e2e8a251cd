//! Bump command: thin CLI layer over `rlog_core::bump`.

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8Path;
use tracing::{debug, instrument};

use rlog_core::bump::{self, BumpError, BumpEvent, BumpLevel};
use rlog_core::config::Config;
use rlog_core::console::{self, EmitOptions};
use rlog_core::markup::escape;
use rlog_core::process::SystemRunner;
use rlog_core::status::Status;

/// Printed when `git status` reports changes.
pub const DIRTY_TREE_MESSAGE: &str = "Working tree is dirty. Commit/stash changes before running.";

/// Exit status for a dirty working tree.
pub const DIRTY_TREE_EXIT: u8 = 255;

/// Execute the bump.
#[instrument(name = "cmd_bump", skip_all, fields(%level, dry_run))]
pub fn cmd_bump(
    level: BumpLevel,
    dry_run: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<ExitCode> {
    let log = console::global();
    let runner = SystemRunner;

    let plan = match bump::plan_bump(&runner, cwd, level, &config.bump) {
        Ok(plan) => plan,
        Err(BumpError::DirtyTree) => {
            log.print(
                &[&format!("[red]{DIRTY_TREE_MESSAGE}[/red]")],
                &EmitOptions::default(),
            );
            return Ok(ExitCode::from(DIRTY_TREE_EXIT));
        }
        Err(e) => return Err(e).context("bump planning failed"),
    };

    plan.check_tools().context("bump planning failed")?;
    log.debug_raw(format!("bump tool: {}", plan.tool));

    if dry_run {
        log.print(
            &[&"[bold yellow]DRY RUN: no changes will be made[/bold yellow]"],
            &EmitOptions::default(),
        );
        for (step, command) in plan.describe() {
            log.print(
                &[&format!("  [bold]{step:<12}[/bold]"), &escape(&command)],
                &EmitOptions::default(),
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let status = log.status(format!("bumping {level} version..."));
    let outcome = plan
        .execute(&runner, |event| handle_event(&status, event))
        .context("bump failed");
    status.finish();
    let outcome = outcome?;

    debug!(version = %outcome.version, tag = %outcome.tag, "bumped");
    log.debug_pretty(&outcome);
    log.print(
        &[&format!("\nBumped to: [green]{}[/green]", escape(&outcome.tag))],
        &EmitOptions::default(),
    );
    Ok(ExitCode::SUCCESS)
}

/// Update the spinner and surface subprocess output at info/debug.
fn handle_event(status: &Status, event: BumpEvent) {
    let log = console::global();
    match event {
        BumpEvent::StepStarted { step, detail } => {
            status.update(format!("{step}..."));
            status.suspend(|| log.debug_raw(format!("{step}: {detail}")));
        }
        BumpEvent::StepCompleted { step, output } => {
            status.suspend(|| {
                if let Some(output) = output {
                    log.info_raw(output);
                }
                log.trace_raw(format!("{step} done"));
            });
        }
    }
}
