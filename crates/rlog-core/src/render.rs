//! Rendering backends.
//!
//! The console decides *what* to write and *where*; a [`Backend`] decides how
//! a styled [`Line`] becomes bytes. [`Terminal`] writes ANSI-styled text to
//! stdout/stderr; [`Recorder`] keeps everything in memory.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use indicatif::ProgressDrawTarget;
use owo_colors::{AnsiColors, OwoColorize};
use serde_json::Value;

use crate::markup::{Color, Line, Style};
use crate::pretty::{self, PrettyOptions};

/// Output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Standard output.
    Primary,
    /// Standard error.
    Error,
}

/// Passthrough options for a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Separator placed between fragments.
    pub sep: String,
    /// Written after the last fragment.
    pub end: String,
    /// Hard-wrap column. `None` leaves long lines to the terminal.
    pub width: Option<usize>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            sep: " ".to_string(),
            end: "\n".to_string(),
            width: None,
        }
    }
}

impl PrintOptions {
    /// Use a different fragment separator.
    pub fn with_sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    /// Use a different line terminator.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    /// Hard-wrap at `width` columns.
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// The physical lines `line` occupies under these options.
    pub fn layout(&self, line: &Line) -> Vec<Line> {
        match self.width {
            Some(width) => line.wrap(width),
            None => line.split_lines(),
        }
    }
}

/// Something that can display styled lines and structured values.
pub trait Backend {
    /// Write one logical line to `target`.
    fn write(&self, target: Target, line: &Line, options: &PrintOptions) -> io::Result<()>;

    /// Write a structured value, always to the primary stream.
    fn write_structured(&self, value: &Value, options: &PrettyOptions) -> io::Result<()> {
        let print = PrintOptions::default();
        for line in pretty::layout(value, options) {
            self.write(Target::Primary, &line, &print)?;
        }
        Ok(())
    }

    /// Where spinners draw. Hidden unless the backend owns a real terminal.
    fn status_target(&self) -> ProgressDrawTarget {
        ProgressDrawTarget::hidden()
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Writes to the process's stdout and stderr.
///
/// Colors follow `owo-colors` stream detection, including any global
/// override set with `owo_colors::set_override`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

impl Backend for Terminal {
    fn status_target(&self) -> ProgressDrawTarget {
        ProgressDrawTarget::stdout()
    }

    fn write(&self, target: Target, line: &Line, options: &PrintOptions) -> io::Result<()> {
        let stream = match target {
            Target::Primary => owo_colors::Stream::Stdout,
            Target::Error => owo_colors::Stream::Stderr,
        };
        let text = render_ansi(line, options, stream);
        match target {
            Target::Primary => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            Target::Error => {
                let mut out = io::stderr().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            }
        }
    }
}

fn render_ansi(line: &Line, options: &PrintOptions, stream: owo_colors::Stream) -> String {
    let mut out = String::new();
    for (i, physical) in options.layout(line).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for span in physical.spans() {
            let text = span.text.as_str();
            if span.style.is_plain() {
                out.push_str(text);
            } else {
                let style = owo_style(span.style);
                out.push_str(
                    &text
                        .if_supports_color(stream, |t| t.style(style))
                        .to_string(),
                );
            }
        }
    }
    out.push_str(&options.end);
    out
}

fn owo_style(style: Style) -> owo_colors::Style {
    let mut out = owo_colors::Style::new();
    if let Some(color) = style.fg {
        out = out.color(ansi_color(color));
    }
    if style.bold {
        out = out.bold();
    }
    if style.dim {
        out = out.dimmed();
    }
    if style.italic {
        out = out.italic();
    }
    if style.underline {
        out = out.underline();
    }
    out
}

const fn ansi_color(color: Color) -> AnsiColors {
    match color {
        Color::Black => AnsiColors::Black,
        Color::Red => AnsiColors::Red,
        Color::Green => AnsiColors::Green,
        Color::Yellow => AnsiColors::Yellow,
        Color::Blue => AnsiColors::Blue,
        Color::Magenta => AnsiColors::Magenta,
        Color::Cyan => AnsiColors::Cyan,
        Color::White => AnsiColors::White,
        Color::BrightBlack => AnsiColors::BrightBlack,
        Color::BrightRed => AnsiColors::BrightRed,
        Color::BrightGreen => AnsiColors::BrightGreen,
        Color::BrightYellow => AnsiColors::BrightYellow,
        Color::BrightBlue => AnsiColors::BrightBlue,
        Color::BrightMagenta => AnsiColors::BrightMagenta,
        Color::BrightCyan => AnsiColors::BrightCyan,
        Color::BrightWhite => AnsiColors::BrightWhite,
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// One captured write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Where the write went.
    pub target: Target,
    /// Physical lines after wrapping.
    pub lines: Vec<Line>,
    /// Terminator that followed the lines.
    pub end: String,
}

impl Record {
    /// The written text without styling or terminator.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::plain)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Keeps every write in memory instead of printing it.
#[derive(Debug, Default)]
pub struct Recorder {
    records: Mutex<Vec<Record>>,
}

impl Recorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far, oldest first.
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records written to `target`.
    pub fn on(&self, target: Target) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.target == target)
            .collect()
    }

    /// Remove and return all records.
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// True if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Backend for Recorder {
    fn write(&self, target: Target, line: &Line, options: &PrintOptions) -> io::Result<()> {
        let record = Record {
            target,
            lines: options.layout(line),
            end: options.end.clone(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}
