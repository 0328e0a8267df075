use std::path::Path;

use anyhow::{Context, Result};
use dgsh_detect_core::{detect_path, Detection};
use log::info;
use serde::Serialize;

/// JSON shape printed by `is-dgsh --json`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: String,
    pub compatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Classify the program at `path` and build a report.
///
/// Unreadable or empty files are not an error here; they produce an
/// incompatible report carrying the reason.
pub fn check_report(path: &Path) -> CheckReport {
    let display = path.display().to_string();
    match detect_path(path) {
        Ok(detection) => CheckReport {
            path: display,
            compatible: detection.compatible,
            detection: Some(detection),
            error: None,
        },
        Err(err) => CheckReport {
            path: display,
            compatible: false,
            detection: None,
            error: Some(err.to_string()),
        },
    }
}

/// Check one program. Prints nothing unless `json` is set.
///
/// Returns the compatibility verdict; errors are reserved for failures to
/// produce output.
pub fn check_command(path: &Path, json: bool) -> Result<bool> {
    let report = check_report(path);
    info!(
        "{}: {}",
        report.path,
        if report.compatible { "dgsh-compatible" } else { "not dgsh-compatible" }
    );
    if json {
        let body = serde_json::to_string_pretty(&report)
            .context("Failed to serialize detection report")?;
        println!("{body}");
    }
    Ok(report.compatible)
}
