//! Leveled console output.
//!
//! A [`Console`] holds a threshold and a [`Backend`]. Every leveled write is
//! checked against the threshold; writes that pass get a colored
//! `YYYY-MM-DD HH:MM:SS LEVEL:` prefix and go to stderr (warn, error) or
//! stdout (everything else).
//!
//! ```
//! use rlog_core::console::Console;
//! use rlog_core::level::LogLevel;
//! use rlog_core::render::{Recorder, Target};
//!
//! let console = Console::new(Recorder::new());
//! console.set_threshold(LogLevel::Info);
//! console.debug("hidden");
//! console.info("shown");
//!
//! let records = console.backend().on(Target::Primary);
//! assert_eq!(records.len(), 1);
//! assert!(records[0].text().ends_with("INFO: shown"));
//! ```
//!
//! Most programs use the process-wide [`global`] console.

use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::level::LogLevel;
use crate::markup::{self, Line, Style};
use crate::pretty::PrettyOptions;
use crate::render::{Backend, PrintOptions, Target, Terminal};
use crate::status::Status;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static GLOBAL: Console<Terminal> = Console::new(Terminal);

/// The process-wide console, writing to the real stdout/stderr.
pub fn global() -> &'static Console<Terminal> {
    &GLOBAL
}

/// Per-call options for leveled writes and [`Console::print`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Show fragments verbatim instead of interpreting markup.
    pub raw: bool,
    /// Passed through to the backend.
    pub print: PrintOptions,
}

impl EmitOptions {
    /// Options with raw mode on.
    pub fn raw() -> Self {
        Self {
            raw: true,
            ..Self::default()
        }
    }

    /// Replace the passthrough print options.
    pub fn with_print(mut self, print: PrintOptions) -> Self {
        self.print = print;
        self
    }
}

/// Threshold-filtered console output over a [`Backend`].
#[derive(Debug)]
pub struct Console<B: Backend = Terminal> {
    threshold: AtomicU8,
    backend: B,
}

impl<B: Backend> Console<B> {
    /// Console with the default threshold ([`LogLevel::Warn`]).
    pub const fn new(backend: B) -> Self {
        Self {
            threshold: AtomicU8::new(LogLevel::Warn.rank()),
            backend,
        }
    }

    /// Builder-style threshold.
    pub fn with_threshold(self, level: LogLevel) -> Self {
        self.set_threshold(level);
        self
    }

    /// The backend this console writes to.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Current threshold.
    pub fn threshold(&self) -> LogLevel {
        LogLevel::from_rank(self.threshold.load(Ordering::Relaxed))
    }

    /// Change the threshold.
    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.store(level.rank(), Ordering::Relaxed);
    }

    /// Whether a message at `level` would be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.threshold().allows(level)
    }

    /// Write `parts` at `level`, if the threshold allows it.
    pub fn emit(&self, level: LogLevel, parts: &[&dyn Display], options: &EmitOptions) {
        if !self.enabled(level) {
            return;
        }

        let target = if level.uses_error_stream() {
            Target::Error
        } else {
            Target::Primary
        };

        let mut line = markup::parse(&prefix_markup(level, &timestamp()));
        for part in parts {
            line.push_str(&options.print.sep, Style::new());
            line.append(fragment(*part, options.raw));
        }
        self.write(target, &line, &options.print);
    }

    /// Write at [`LogLevel::Error`].
    pub fn error(&self, text: impl Display) {
        self.emit(LogLevel::Error, &[&text], &EmitOptions::default());
    }

    /// Write at [`LogLevel::Warn`].
    pub fn warn(&self, text: impl Display) {
        self.emit(LogLevel::Warn, &[&text], &EmitOptions::default());
    }

    /// Write at [`LogLevel::Info`].
    pub fn info(&self, text: impl Display) {
        self.emit(LogLevel::Info, &[&text], &EmitOptions::default());
    }

    /// Write at [`LogLevel::Debug`].
    pub fn debug(&self, text: impl Display) {
        self.emit(LogLevel::Debug, &[&text], &EmitOptions::default());
    }

    /// Write at [`LogLevel::Trace`].
    pub fn trace(&self, text: impl Display) {
        self.emit(LogLevel::Trace, &[&text], &EmitOptions::default());
    }

    /// Write verbatim text at [`LogLevel::Error`].
    pub fn error_raw(&self, text: impl Display) {
        self.emit(LogLevel::Error, &[&text], &EmitOptions::raw());
    }

    /// Write verbatim text at [`LogLevel::Warn`].
    pub fn warn_raw(&self, text: impl Display) {
        self.emit(LogLevel::Warn, &[&text], &EmitOptions::raw());
    }

    /// Write verbatim text at [`LogLevel::Info`].
    pub fn info_raw(&self, text: impl Display) {
        self.emit(LogLevel::Info, &[&text], &EmitOptions::raw());
    }

    /// Write verbatim text at [`LogLevel::Debug`].
    pub fn debug_raw(&self, text: impl Display) {
        self.emit(LogLevel::Debug, &[&text], &EmitOptions::raw());
    }

    /// Write verbatim text at [`LogLevel::Trace`].
    pub fn trace_raw(&self, text: impl Display) {
        self.emit(LogLevel::Trace, &[&text], &EmitOptions::raw());
    }

    /// Pretty-print `value` under a prefix line at `level`.
    ///
    /// The prefix line follows the usual routing; the value itself always
    /// goes to the primary stream.
    pub fn pretty<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        value: &T,
        options: &PrettyOptions,
    ) {
        if !self.enabled(level) {
            return;
        }

        self.emit(level, &[&""], &EmitOptions::default());

        match serde_json::to_value(value) {
            Ok(value) => {
                if let Err(err) = self.backend.write_structured(&value, options) {
                    debug!(error = %err, "structured write failed");
                }
            }
            Err(err) => {
                let line = Line::literal(format!("<unprintable value: {err}>"));
                self.write(Target::Primary, &line, &PrintOptions::default());
            }
        }
    }

    /// Pretty-print at [`LogLevel::Error`].
    pub fn error_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        self.pretty(LogLevel::Error, value, &PrettyOptions::default());
    }

    /// Pretty-print at [`LogLevel::Warn`].
    pub fn warn_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        self.pretty(LogLevel::Warn, value, &PrettyOptions::default());
    }

    /// Pretty-print at [`LogLevel::Info`].
    pub fn info_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        self.pretty(LogLevel::Info, value, &PrettyOptions::default());
    }

    /// Pretty-print at [`LogLevel::Debug`].
    pub fn debug_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        self.pretty(LogLevel::Debug, value, &PrettyOptions::default());
    }

    /// Pretty-print at [`LogLevel::Trace`].
    pub fn trace_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        self.pretty(LogLevel::Trace, value, &PrettyOptions::default());
    }

    /// Write `parts` to the primary stream with no prefix and no filtering.
    pub fn print(&self, parts: &[&dyn Display], options: &EmitOptions) {
        let mut line = Line::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                line.push_str(&options.print.sep, Style::new());
            }
            line.append(fragment(*part, options.raw));
        }
        self.write(Target::Primary, &line, &options.print);
    }

    /// Start a spinner on the backend's primary stream. Not filtered.
    pub fn status(&self, message: impl Into<String>) -> Status {
        Status::new(message, self.backend.status_target())
    }

    fn write(&self, target: Target, line: &Line, options: &PrintOptions) {
        if let Err(err) = self.backend.write(target, line, options) {
            debug!(error = %err, ?target, "console write failed");
        }
    }
}

/// `[style]TIMESTAMP LEVEL:[/style]`; warn/error are dimmed.
fn prefix_markup(level: LogLevel, timestamp: &str) -> String {
    let base = Style::new().fg(level.color());
    let style = if level.uses_error_stream() {
        base.dimmed()
    } else {
        base
    };
    format!("[{style}]{timestamp} {}:[/{style}]", level.label())
}

fn fragment(part: &dyn Display, raw: bool) -> Line {
    let text = part.to_string();
    if raw {
        Line::literal(text)
    } else {
        markup::parse(&text)
    }
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
