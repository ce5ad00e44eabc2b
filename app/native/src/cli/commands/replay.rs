//! `perch replay`: runs a scripted session on the main run loop.

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::cli::output;
use crate::config::PerchConfig;
use crate::error::PerchError;
use crate::session::{ReplayReport, Script, Session};

/// Reads and parses a script file.
fn read_script(path: &Path) -> Result<Script, PerchError> {
    let text = fs::read_to_string(path).map_err(|source| PerchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Script::from_json(&text)?)
}

/// Execute `perch replay`.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed. Steps the window
/// manager rejects are reported, not returned.
pub fn execute(path: &Path, json: bool, config: &PerchConfig) -> Result<(), PerchError> {
    let script = read_script(path)?;
    let session = Session::new(config);
    let report = session.replay(script, crate::main_loop());

    if json {
        output::print_highlighted_json(&serde_json::to_value(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ReplayReport) {
    let count = report.toplevels.len();
    println!("{}", format!("Toplevels ({count})").bold());
    if count > 0 {
        println!("{}", output::toplevel_table(&report.toplevels));
    }

    let focused = report.focused.map_or_else(|| "none".to_string(), |surface| surface.to_string());
    println!("{} {focused}", "Focused:".bold());
    println!("{} {}", "Scene nodes:".bold(), report.scene_nodes);
    println!("{} {}", "Handled inputs:".bold(), report.handled_inputs);

    if !report.notifications.is_empty() {
        println!();
        println!("{}", format!("Notifications ({})", report.notifications.len()).bold());
        for line in output::notification_lines(&report.notifications) {
            println!("  {line}");
        }
    }

    if !report.failures.is_empty() {
        println!();
        for line in output::failure_lines(&report.failures) {
            eprintln!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_script_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_script(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, PerchError::Read { .. }));
    }

    #[test]
    fn test_read_script_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "steps": [ { "teleport": {} } ] }"#).unwrap();
        assert!(matches!(read_script(&path), Err(PerchError::Json(_))));
    }

    #[test]
    fn test_read_script_parses_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonc");
        fs::write(
            &path,
            r#"{
                // open one window
                "steps": [
                    { "transport": { "event": "new-toplevel", "surface": 1 } },
                    { "transport": { "event": "map", "surface": 1 } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(read_script(&path).unwrap().steps.len(), 2);
    }
}
