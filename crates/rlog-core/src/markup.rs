//! Console markup: `[style]text[/style]` tags parsed into styled spans.
//!
//! The grammar is deliberately small:
//!
//! - `[bold red]` opens a style made of space-separated style words.
//! - `[/bold red]` closes the most recent tag opened with the same words,
//!   `[/]` closes the most recent tag of any kind.
//! - `\[` is a literal bracket.
//! - Anything that looks like a tag but doesn't name known style words is kept
//!   as literal text, so `[1, 2]` or `[link]` print as written.
//!
//! Text that must never be interpreted goes through [`Line::literal`] or
//! [`escape`] instead.

use std::fmt;

/// Foreground colors understood by markup and backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// `black`
    Black,
    /// `red`
    Red,
    /// `green`
    Green,
    /// `yellow`
    Yellow,
    /// `blue`
    Blue,
    /// `magenta`
    Magenta,
    /// `cyan`
    Cyan,
    /// `white`
    White,
    /// `bright_black`
    BrightBlack,
    /// `bright_red`
    BrightRed,
    /// `bright_green`
    BrightGreen,
    /// `bright_yellow`
    BrightYellow,
    /// `bright_blue`
    BrightBlue,
    /// `bright_magenta`
    BrightMagenta,
    /// `bright_cyan`
    BrightCyan,
    /// `bright_white`
    BrightWhite,
}

impl Color {
    /// Markup name of the color.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::BrightBlack => "bright_black",
            Self::BrightRed => "bright_red",
            Self::BrightGreen => "bright_green",
            Self::BrightYellow => "bright_yellow",
            Self::BrightBlue => "bright_blue",
            Self::BrightMagenta => "bright_magenta",
            Self::BrightCyan => "bright_cyan",
            Self::BrightWhite => "bright_white",
        }
    }

    /// Look up a color by its markup name.
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::Black,
            "red" => Self::Red,
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "blue" => Self::Blue,
            "magenta" => Self::Magenta,
            "cyan" => Self::Cyan,
            "white" => Self::White,
            "bright_black" | "grey" | "gray" => Self::BrightBlack,
            "bright_red" => Self::BrightRed,
            "bright_green" => Self::BrightGreen,
            "bright_yellow" => Self::BrightYellow,
            "bright_blue" => Self::BrightBlue,
            "bright_magenta" => Self::BrightMagenta,
            "bright_cyan" => Self::BrightCyan,
            "bright_white" => Self::BrightWhite,
            _ => return None,
        };
        Some(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of text attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color, if any.
    pub fg: Option<Color>,
    /// Bold weight.
    pub bold: bool,
    /// Dimmed (faint) intensity.
    pub dim: bool,
    /// Italic.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
}

impl Style {
    /// No attributes.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bold: false,
            dim: false,
            italic: false,
            underline: false,
        }
    }

    /// Set the foreground color.
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Add bold.
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Add dim.
    pub const fn dimmed(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Add italic.
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Add underline.
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// True if no attribute is set.
    pub const fn is_plain(&self) -> bool {
        self.fg.is_none() && !self.bold && !self.dim && !self.italic && !self.underline
    }

    /// Layer `other` on top of `self`.
    ///
    /// Attributes accumulate; `other`'s color wins when it has one.
    pub const fn combine(self, other: Self) -> Self {
        Self {
            fg: match other.fg {
                Some(c) => Some(c),
                None => self.fg,
            },
            bold: self.bold || other.bold,
            dim: self.dim || other.dim,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }

    /// Parse a tag body such as `"dim red"`.
    ///
    /// Returns `None` if the body is empty or contains a word that isn't a
    /// known attribute or color.
    pub fn parse(body: &str) -> Option<Self> {
        let mut style = Self::new();
        let mut any = false;
        for word in body.split_whitespace() {
            any = true;
            style = match word.to_ascii_lowercase().as_str() {
                "bold" | "b" => style.bold(),
                "dim" | "d" => style.dimmed(),
                "italic" | "i" => style.italic(),
                "underline" | "u" => style.underline(),
                "default" | "none" => Self { fg: None, ..style },
                other => style.fg(Color::from_name(other)?),
            };
        }
        any.then_some(style)
    }
}

impl fmt::Display for Style {
    /// Writes the markup words for the style, e.g. `bold dim red`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::new();
        if self.bold {
            words.push("bold");
        }
        if self.dim {
            words.push("dim");
        }
        if self.italic {
            words.push("italic");
        }
        if self.underline {
            words.push("underline");
        }
        if let Some(color) = self.fg {
            words.push(color.name());
        }
        f.write_str(&words.join(" "))
    }
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The text, without any markup.
    pub text: String,
    /// Style applied to the whole run.
    pub style: Style,
}

impl Span {
    /// Create a span.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create an unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::new())
    }
}

/// An ordered list of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    /// Empty line.
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Text taken verbatim, brackets and all.
    pub fn literal(text: impl Into<String>) -> Self {
        let mut line = Self::new();
        line.push(Span::plain(text));
        line
    }

    /// Append a span. Empty spans are dropped and adjacent spans with equal
    /// styles are merged.
    pub fn push(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.style == span.style
        {
            last.text.push_str(&span.text);
            return;
        }
        self.spans.push(span);
    }

    /// Append text with a style.
    pub fn push_str(&mut self, text: &str, style: Style) {
        self.push(Span::new(text, style));
    }

    /// Append all spans of another line.
    pub fn append(&mut self, other: Self) {
        for span in other.spans {
            self.push(span);
        }
    }

    /// The spans, in order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The text with all styling dropped.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Number of characters of text.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// True if the line holds no text.
    pub const fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Split at embedded newlines.
    pub fn split_lines(&self) -> Vec<Self> {
        let mut lines = vec![Self::new()];
        for span in &self.spans {
            let mut parts = span.text.split('\n');
            if let Some(first) = parts.next()
                && let Some(current) = lines.last_mut()
            {
                current.push_str(first, span.style);
            }
            for part in parts {
                let mut next = Self::new();
                next.push_str(part, span.style);
                lines.push(next);
            }
        }
        lines
    }

    /// Hard-wrap to `width` columns, breaking at whitespace where possible.
    ///
    /// Embedded newlines always break. Words longer than `width` are split.
    pub fn wrap(&self, width: usize) -> Vec<Self> {
        let width = width.max(1);
        let mut out = Vec::new();
        for logical in self.split_lines() {
            wrap_into(&logical, width, &mut out);
        }
        out
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

fn wrap_into(line: &Line, width: usize, out: &mut Vec<Line>) {
    let mut current = Line::new();
    let mut used = 0;

    for span in &line.spans {
        for (is_space, token) in tokens(&span.text) {
            let len = token.chars().count();
            if is_space {
                if used == 0 {
                    continue;
                }
                if used + len > width {
                    out.push(std::mem::take(&mut current));
                    used = 0;
                } else {
                    current.push_str(token, span.style);
                    used += len;
                }
                continue;
            }

            if used > 0 && used + len > width {
                out.push(trim_end(std::mem::take(&mut current)));
                used = 0;
            }

            let mut rest = token;
            while rest.chars().count() > width - used {
                let split = rest
                    .char_indices()
                    .nth(width - used)
                    .map_or(rest.len(), |(i, _)| i);
                current.push_str(&rest[..split], span.style);
                out.push(std::mem::take(&mut current));
                used = 0;
                rest = &rest[split..];
            }
            if !rest.is_empty() {
                used += rest.chars().count();
                current.push_str(rest, span.style);
            }
        }
    }

    out.push(trim_end(current));
}

fn trim_end(mut line: Line) -> Line {
    while let Some(last) = line.spans.last_mut() {
        let trimmed = last.text.trim_end().len();
        if trimmed == 0 {
            line.spans.pop();
        } else {
            last.text.truncate(trimmed);
            break;
        }
    }
    line
}

/// Split text into alternating whitespace / non-whitespace runs.
fn tokens(text: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match current {
            Some(prev) if prev != space => {
                out.push((prev, &text[start..i]));
                start = i;
                current = Some(space);
            }
            None => current = Some(space),
            _ => {}
        }
    }
    if let Some(space) = current {
        out.push((space, &text[start..]));
    }
    out
}

/// Escape text so [`parse`] reproduces it verbatim.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find('[') {
        out.push_str(&rest[..i]);
        if tag_len(&rest[i..]).is_some() {
            out.push('\\');
        }
        out.push('[');
        rest = &rest[i + 1..];
    }
    out.push_str(rest);
    out
}

/// Parse markup into a styled line.
pub fn parse(text: &str) -> Line {
    let mut parser = Parser::default();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with("\\[") {
            parser.buf.push('[');
            i += 2;
            continue;
        }
        if rest.starts_with('[')
            && let Some(len) = tag_len(rest)
        {
            let tag = &rest[..len];
            if !parser.apply(&tag[1..len - 1]) {
                parser.buf.push_str(tag);
            }
            i += len;
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        parser.buf.push(c);
        i += c.len_utf8();
    }

    parser.finish()
}

/// Length of the tag at the start of `s`, brackets included.
fn tag_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    if chars.next()?.1 != '[' {
        return None;
    }
    let (_, first) = chars.next()?;
    if !(first.is_ascii_lowercase() || matches!(first, '#' | '/' | '@')) {
        return None;
    }
    for (i, c) in s.char_indices().skip(1) {
        match c {
            ']' => return Some(i + 1),
            '[' => return None,
            _ => {}
        }
    }
    None
}

#[derive(Default)]
struct Parser {
    line: Line,
    stack: Vec<(String, Style)>,
    buf: String,
}

impl Parser {
    fn current(&self) -> Style {
        self.stack.last().map(|(_, s)| *s).unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            let style = self.current();
            let text = std::mem::take(&mut self.buf);
            self.line.push(Span::new(text, style));
        }
    }

    /// Apply a tag body. Returns false if the tag should stay literal.
    fn apply(&mut self, body: &str) -> bool {
        if let Some(name) = body.strip_prefix('/') {
            let name = name.trim();
            let position = if name.is_empty() {
                self.stack.len().checked_sub(1)
            } else {
                self.stack.iter().rposition(|(open, _)| open == name)
            };
            let Some(position) = position else {
                return false;
            };
            self.flush();
            self.stack.truncate(position);
            return true;
        }

        let Some(style) = Style::parse(body) else {
            return false;
        };
        self.flush();
        let combined = self.current().combine(style);
        self.stack.push((body.trim().to_string(), combined));
        true
    }

    fn finish(mut self) -> Line {
        self.flush();
        self.line
    }
}
