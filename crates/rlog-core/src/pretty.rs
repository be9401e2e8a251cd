//! Width-aware, highlighted layout of structured values.
//!
//! Anything `Serialize` can be shown: it is converted to a
//! [`serde_json::Value`] and laid out the way a human would format it by
//! hand. Containers that fit on the remaining width stay on one line, larger
//! ones expand to one child per line.
//!
//! ```
//! use rlog_core::pretty::{self, PrettyOptions};
//!
//! let value = serde_json::json!({"name": "rlog", "tags": ["a", "b"]});
//! let lines = pretty::layout(&value, &PrettyOptions::default());
//! assert_eq!(lines[0].plain(), r#"{"name": "rlog", "tags": ["a", "b"]}"#);
//! ```

use serde_json::{Map, Value};

use crate::markup::{Color, Line, Style};

const STRING: Style = Style::new().fg(Color::Green);
const NUMBER: Style = Style::new().bold().fg(Color::Cyan);
const TRUE: Style = Style::new().italic().fg(Color::Green);
const FALSE: Style = Style::new().italic().fg(Color::Red);
const NULL: Style = Style::new().italic().fg(Color::Magenta);
const ELIDED: Style = Style::new().dimmed();

/// Layout options for [`layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyOptions {
    /// Column budget before a container expands.
    pub width: usize,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Expand every non-empty container, even if it would fit.
    pub expand_all: bool,
    /// Show at most this many children per container.
    pub max_length: Option<usize>,
    /// Show at most this many characters per string.
    pub max_string: Option<usize>,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            width: 80,
            indent: 4,
            expand_all: false,
            max_length: None,
            max_string: None,
        }
    }
}

impl PrettyOptions {
    /// Set the column budget.
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the indent width.
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Always expand containers.
    pub const fn expand_all(mut self) -> Self {
        self.expand_all = true;
        self
    }

    /// Limit children per container.
    pub const fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Limit characters per string.
    pub const fn with_max_string(mut self, max: usize) -> Self {
        self.max_string = Some(max);
        self
    }
}

/// Lay out `value` as styled lines.
pub fn layout(value: &Value, options: &PrettyOptions) -> Vec<Line> {
    let mut out = Vec::new();
    Layout { options, out: &mut out }.node(value, Line::new(), 0, "");
    out
}

struct Layout<'a> {
    options: &'a PrettyOptions,
    out: &'a mut Vec<Line>,
}

impl Layout<'_> {
    fn node(&mut self, value: &Value, prefix: Line, depth: usize, suffix: &str) {
        let flat = flat(value, self.options);
        let fits = prefix.width() + flat.width() + suffix.chars().count() <= self.options.width;
        let expandable = match value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        };

        if !expandable || (fits && !self.options.expand_all) {
            let mut line = prefix;
            line.append(flat);
            line.push_str(suffix, Style::new());
            self.out.push(line);
            return;
        }

        let (open, close) = if value.is_array() { ("[", "]") } else { ("{", "}") };
        let mut head = prefix;
        head.push_str(open, Style::new());
        self.out.push(head);

        let child_indent = " ".repeat(self.options.indent * (depth + 1));
        let children = children(value);
        let shown = self.options.max_length.map_or(children.len(), |m| m.min(children.len()));
        let elided = children.len() - shown;

        for (i, (key, child)) in children.into_iter().take(shown).enumerate() {
            let mut child_prefix = Line::literal(child_indent.clone());
            if let Some(key) = key {
                child_prefix.append(string(key, self.options));
                child_prefix.push_str(": ", Style::new());
            }
            let last = i + 1 == shown && elided == 0;
            self.node(child, child_prefix, depth + 1, if last { "" } else { "," });
        }

        if elided > 0 {
            let mut line = Line::literal(child_indent);
            line.push_str(&format!("... +{elided}"), ELIDED);
            self.out.push(line);
        }

        let mut tail = Line::literal(" ".repeat(self.options.indent * depth));
        tail.push_str(close, Style::new());
        tail.push_str(suffix, Style::new());
        self.out.push(tail);
    }
}

fn children(value: &Value) -> Vec<(Option<&str>, &Value)> {
    match value {
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        _ => Vec::new(),
    }
}

/// Single-line rendering of a value.
fn flat(value: &Value, options: &PrettyOptions) -> Line {
    match value {
        Value::Null => styled("null", NULL),
        Value::Bool(true) => styled("true", TRUE),
        Value::Bool(false) => styled("false", FALSE),
        Value::Number(n) => styled(&n.to_string(), NUMBER),
        Value::String(s) => string(s, options),
        Value::Array(items) => {
            let parts = items.iter().map(|v| flat(v, options)).collect();
            container("[", "]", parts, options)
        }
        Value::Object(map) => container("{", "}", object_parts(map, options), options),
    }
}

fn object_parts(map: &Map<String, Value>, options: &PrettyOptions) -> Vec<Line> {
    map.iter()
        .map(|(k, v)| {
            let mut part = string(k, options);
            part.push_str(": ", Style::new());
            part.append(flat(v, options));
            part
        })
        .collect()
}

fn container(open: &str, close: &str, parts: Vec<Line>, options: &PrettyOptions) -> Line {
    let total = parts.len();
    let shown = options.max_length.map_or(total, |m| m.min(total));
    let mut line = styled(open, Style::new());
    for (i, part) in parts.into_iter().take(shown).enumerate() {
        if i > 0 {
            line.push_str(", ", Style::new());
        }
        line.append(part);
    }
    if shown < total {
        if shown > 0 {
            line.push_str(", ", Style::new());
        }
        line.push_str(&format!("... +{}", total - shown), ELIDED);
    }
    line.push_str(close, Style::new());
    line
}

fn string(s: &str, options: &PrettyOptions) -> Line {
    let count = s.chars().count();
    match options.max_string {
        Some(max) if count > max => {
            let kept: String = s.chars().take(max).collect();
            let quoted = quote(&kept);
            let body = &quoted[..quoted.len() - 1];
            styled(&format!("{body}...+{}\"", count - max), STRING)
        }
        _ => styled(&quote(s), STRING),
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn styled(text: &str, style: Style) -> Line {
    let mut line = Line::new();
    line.push_str(text, style);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(value: &Value, options: &PrettyOptions) -> Vec<String> {
        layout(value, options).iter().map(Line::plain).collect()
    }

    #[test]
    fn scalars_render_on_one_line() {
        let opts = PrettyOptions::default();
        assert_eq!(text(&json!(null), &opts), vec!["null"]);
        assert_eq!(text(&json!(true), &opts), vec!["true"]);
        assert_eq!(text(&json!(1.5), &opts), vec!["1.5"]);
        assert_eq!(text(&json!("a\"b"), &opts), vec![r#""a\"b""#]);
    }

    #[test]
    fn small_containers_stay_flat() {
        let value = json!({"a": [1, 2], "b": {}});
        assert_eq!(
            text(&value, &PrettyOptions::default()),
            vec![r#"{"a": [1, 2], "b": {}}"#]
        );
    }

    #[test]
    fn wide_containers_expand_with_indent() {
        let value = json!({"numbers": [1, 2, 3], "name": "abcdefghij"});
        let lines = text(&value, &PrettyOptions::default().with_width(30));
        assert_eq!(
            lines,
            vec![
                "{",
                r#"    "numbers": [1, 2, 3],"#,
                r#"    "name": "abcdefghij""#,
                "}",
            ]
        );
    }

    #[test]
    fn nested_expansion_indents_each_level() {
        let value = json!({"outer": {"inner": [1, 2, 3, 4, 5, 6]}});
        let lines = text(&value, &PrettyOptions::default().with_width(16).with_indent(2));
        assert_eq!(
            lines,
            vec![
                "{",
                r#"  "outer": {"#,
                r#"    "inner": ["#,
                "      1,",
                "      2,",
                "      3,",
                "      4,",
                "      5,",
                "      6",
                "    ]",
                "  }",
                "}",
            ]
        );
    }

    #[test]
    fn expand_all_forces_expansion() {
        let lines = text(&json!([1, []]), &PrettyOptions::default().expand_all());
        assert_eq!(lines, vec!["[", "    1,", "    []", "]"]);
    }

    #[test]
    fn max_length_elides_children() {
        let value = json!([1, 2, 3, 4, 5]);
        let opts = PrettyOptions::default().with_max_length(2);
        assert_eq!(text(&value, &opts), vec!["[1, 2, ... +3]"]);

        let expanded = text(&value, &opts.expand_all());
        assert_eq!(expanded, vec!["[", "    1,", "    2,", "    ... +3", "]"]);
    }

    #[test]
    fn max_string_truncates() {
        let opts = PrettyOptions::default().with_max_string(3);
        assert_eq!(text(&json!("abcdefg"), &opts), vec![r#""abc...+4""#]);
        assert_eq!(text(&json!("abc"), &opts), vec![r#""abc""#]);
    }

    #[test]
    fn values_are_highlighted() {
        let lines = layout(&json!([1, "s", null]), &PrettyOptions::default());
        let spans = lines[0].spans();
        assert!(spans.iter().any(|s| s.text == "1" && s.style == NUMBER));
        assert!(spans.iter().any(|s| s.text == "\"s\"" && s.style == STRING));
        assert!(spans.iter().any(|s| s.text == "null" && s.style == NULL));
    }
}
