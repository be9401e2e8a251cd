//! Core library for bump.
//!
//! Two halves: a leveled console logger with markup and structured
//! pretty-printing, and the version bump workflow that drives `git` and the
//! project's bump tool.
//!
//! # Modules
//!
//! - [`level`] - Log levels and their ordering
//! - [`console`] - The leveled console and its global instance
//! - [`markup`] - Inline style markup (`[bold red]...[/]`)
//! - [`render`] - Output backends (terminal, in-memory recorder)
//! - [`pretty`] - Structured value layout
//! - [`status`] - Transient status spinner
//! - [`bump`] - Version bump planning and execution
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`git`] - Git operations for the bump workflow
//! - [`manifest`] - Reading the version from a project manifest
//! - [`process`] - External command execution
//!
//! # Quick Start
//!
//! ```no_run
//! use rlog_core::{LogLevel, console};
//!
//! let log = console::global();
//! log.set_threshold(LogLevel::Info);
//! log.info("starting [bold]release[/bold]");
//! log.debug("hidden at info");
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod console;

pub mod error;

pub mod git;

pub mod level;

pub mod manifest;

pub mod markup;

pub mod pretty;

pub mod process;

pub mod render;

pub mod status;

pub use bump::{BumpError, BumpEvent, BumpLevel, BumpOutcome, BumpPlan, BumpStep, plan_bump};

pub use config::{BumpConfig, Config, ConfigLoader};

pub use console::{Console, EmitOptions};

pub use error::{ConfigError, ConfigResult};

pub use level::LogLevel;

pub use render::{Backend, PrintOptions, Recorder, Target, Terminal};
