//! Run report printed on stdout.
//!
//! Text mode preserves the original script's confirmation lines (printed
//! incrementally by the scenario); json mode prints a single envelope:
//!
//! ```json
//! {
//!   "ok": true,
//!   "baseUrl": "http://localhost:8000/",
//!   "steps": [ { "name": "navigate", "status": "passed", "durationMs": 312 } ],
//!   "artifacts": ["jules-scratch/verification/verification.png"]
//! }
//! ```

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use tracing::error;

use crate::error::SmokeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable confirmation lines
    #[default]
    Text,
    /// JSON envelope on stdout
    Json,
}

impl OutputFormat {
    pub fn is_text(self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub ok: bool,
    pub base_url: String,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: u64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
}

impl RunReport {
    /// Report for a run that failed before any scenario step could start.
    pub fn launch_failure(base_url: String, error: &SmokeError) -> Self {
        Self {
            ok: false,
            base_url,
            steps: Vec::new(),
            error: Some(error.to_string()),
            artifacts: Vec::new(),
        }
    }

    pub fn print(&self, format: OutputFormat) {
        if format.is_text() {
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{json}"),
            Err(err) => error!(target = "smoke", error = %err, "report serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_camel_case_and_drops_empty_fields() {
        let report = RunReport {
            ok: true,
            base_url: "http://localhost:8000/".to_string(),
            steps: vec![StepReport {
                name: "navigate".to_string(),
                status: StepStatus::Passed,
                duration_ms: 42,
            }],
            error: None,
            artifacts: vec![],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["baseUrl"], "http://localhost:8000/");
        assert_eq!(value["steps"][0]["status"], "passed");
        assert_eq!(value["steps"][0]["durationMs"], 42);
        assert!(value.get("error").is_none());
        assert!(value.get("artifacts").is_none());
    }

    #[test]
    fn launch_failure_report_has_no_steps_and_carries_the_error() {
        let err = SmokeError::BrowserLaunch("no chromium executable".to_string());
        let report = RunReport::launch_failure("http://localhost:8000/".to_string(), &err);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["steps"].as_array().unwrap().len(), 0);
        assert_eq!(value["error"], "browser launch failed: no chromium executable");
    }

    #[test]
    fn failed_report_carries_error_and_artifacts() {
        let report = RunReport {
            ok: false,
            base_url: "http://localhost:8000/".to_string(),
            steps: vec![],
            error: Some("navigation failed: http://localhost:8000/".to_string()),
            artifacts: vec![PathBuf::from("jules-scratch/verification/error.png")],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(
            value["artifacts"][0],
            "jules-scratch/verification/error.png"
        );
        assert!(
            value["error"]
                .as_str()
                .unwrap()
                .starts_with("navigation failed")
        );
    }
}
