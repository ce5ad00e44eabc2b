//! CLI output formatting utilities.
//!
//! Tables for replay reports and syntax-highlighted JSON.

use std::fmt::Write as _;

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::session::StepFailure;
use crate::shell::{ShellEvent, ToplevelSnapshot};

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and `null` magenta.
pub fn print_highlighted_json(value: &serde_json::Value) {
    println!("{}", highlight_json(value));
}

/// Returns pretty-printed, highlighted JSON.
#[must_use]
pub fn highlight_json(value: &serde_json::Value) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    let mut out = String::with_capacity(json.len() * 2);
    let mut token = String::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut is_key = false;
    let mut after_colon = false;

    for ch in json.chars() {
        if in_string {
            token.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                let colored = if is_key { token.cyan() } else { token.green() };
                let _ = write!(out, "{colored}");
                token.clear();
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                flush_scalar(&mut out, &mut token);
                token.push(ch);
                in_string = true;
                is_key = !after_colon;
                after_colon = false;
            }
            ':' => {
                flush_scalar(&mut out, &mut token);
                out.push(':');
                after_colon = true;
            }
            ',' | '{' | '}' | '[' | ']' => {
                flush_scalar(&mut out, &mut token);
                let _ = write!(out, "{}", ch.to_string().bold());
                after_colon = false;
            }
            _ => token.push(ch),
        }
    }

    flush_scalar(&mut out, &mut token);
    out
}

/// Writes a pending non-string token, coloring numbers and literals.
fn flush_scalar(out: &mut String, token: &mut String) {
    let value = token.trim();
    let start = token.len() - token.trim_start().len();
    let (prefix, suffix) = (&token[..start], &token[start + value.len()..]);

    if matches!(value, "true" | "false" | "null") {
        let _ = write!(out, "{prefix}{}{suffix}", value.magenta());
    } else if !value.is_empty() && value.parse::<f64>().is_ok() {
        let _ = write!(out, "{prefix}{}{suffix}", value.yellow());
    } else {
        out.push_str(token);
    }
    token.clear();
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters rather than bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        let cut = s.char_indices().nth(max_chars - 1).map_or(s.len(), |(idx, _)| idx);
        format!("{}…", &s[..cut])
    }
}

/// Formats a boolean as a colored string.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

#[derive(Tabled)]
struct ToplevelRow {
    #[tabled(rename = "Surface")]
    surface: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "State")]
    lifecycle: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Focused")]
    focused: String,
}

/// Renders toplevels as a table, bottom of the stack first.
#[must_use]
pub fn toplevel_table(toplevels: &[ToplevelSnapshot]) -> String {
    let rows = toplevels.iter().map(|toplevel| ToplevelRow {
        surface: toplevel.surface.to_string(),
        title: truncate(&toplevel.title, 32),
        lifecycle: format!("{:?}", toplevel.lifecycle).to_lowercase(),
        mode: toplevel.mode.to_string(),
        size: format!("{}x{}", toplevel.width, toplevel.height),
        position: format!("{}, {}", toplevel.x, toplevel.y),
        focused: format_bool(toplevel.focused),
    });

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..6)).with(Alignment::right()))
        .with(Modify::new(Columns::last()).with(Alignment::center()))
        .to_string()
}

/// One line per notification: its name and JSON payload.
#[must_use]
pub fn notification_lines(notifications: &[ShellEvent]) -> Vec<String> {
    notifications
        .iter()
        .map(|event| {
            let payload = serde_json::to_value(event).map_or_else(
                |_| String::new(),
                |mut value| {
                    if let Some(object) = value.as_object_mut() {
                        object.remove("event");
                    }
                    value.to_string()
                },
            );
            format!("{} {}", event.name().cyan(), payload.dimmed())
        })
        .collect()
}

/// One line per failed step.
#[must_use]
pub fn failure_lines(failures: &[StepFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|failure| {
            format!(
                "{} step {} ({}): {}",
                "Error:".red(),
                failure.index,
                failure.step,
                failure.error
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toplevel::{Lifecycle, WindowMode};
    use crate::transport::SurfaceHandle;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello w…");
    }

    #[test]
    fn test_truncate_min_length() {
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte_utf8() {
        let s = "editor — perch";
        assert_eq!(truncate(s, 8), "editor …");
        assert_eq!(truncate(s, 20), s);
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }

    #[test]
    fn test_highlight_json_keeps_text() {
        let value = serde_json::json!({ "title": "a \"quoted\" name", "width": 800, "focused": true });
        let highlighted = plain(|| highlight_json(&value));
        assert_eq!(highlighted, serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_toplevel_table_has_rows() {
        let snapshot = ToplevelSnapshot {
            surface: SurfaceHandle(4),
            title: "Terminal".to_string(),
            lifecycle: Lifecycle::Mapped,
            mode: WindowMode::Maximized,
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            focused: true,
        };
        let table = plain(|| toplevel_table(&[snapshot]));
        assert!(table.contains("surface-4"));
        assert!(table.contains("Terminal"));
        assert!(table.contains("maximized"));
        assert!(table.contains("1920x1080"));
    }

    #[test]
    fn test_notification_lines_strip_tag() {
        let lines = plain(|| {
            notification_lines(&[ShellEvent::ToplevelMapped { surface: SurfaceHandle(1) }])
        });
        assert_eq!(lines, vec![r#"perch://toplevel/mapped {"surface":1}"#.to_string()]);
    }
}
