//! The scenario runner: one fixed linear check sequence against the
//! Pequenos Passos homepage, mirroring what a first-time visitor does when
//! opening the physical-health section.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::error::{Result, SmokeError};
use crate::report::{OutputFormat, RunReport, StepReport, StepStatus};

const NAV_TIMEOUT: Duration = Duration::from_secs(30);
const HEADING_TIMEOUT: Duration = Duration::from_secs(10);
const BUTTON_TIMEOUT: Duration = Duration::from_secs(10);
const URL_TIMEOUT: Duration = Duration::from_secs(5);
const SECTION_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const HOME_HEADING: &str = "h1";
const FISICA_BUTTON: &str = r#"button[data-page="fisica"]"#;
const FISICA_HEADING: &str = "#page-fisica h1";

const HOME_TITLE: &str = "Pequenos Passos";
const FISICA_TITLE: &str = "Planejamento de Saúde Física";

pub struct Scenario {
    base_url: String,
    out_dir: PathBuf,
    steps: Vec<StepReport>,
    artifacts: Vec<PathBuf>,
}

impl Scenario {
    pub fn new(base_url: String, out_dir: PathBuf) -> Self {
        Self {
            base_url,
            out_dir,
            steps: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Run the check sequence. On any failure the error line and a
    /// diagnostic screenshot are emitted before the error is returned;
    /// closing the session stays with the caller so it happens exactly once.
    pub async fn run(&mut self, session: &BrowserSession, format: OutputFormat) -> Result<()> {
        match self.run_steps(session, format).await {
            Ok(()) => Ok(()),
            Err(err) => {
                eprintln!("{}", format!("Verification failed: {err}").red());

                let error_path = self.out_dir.join("error.png");
                match session.save_screenshot(&error_path, true).await {
                    Ok(()) => {
                        eprintln!("Error screenshot saved to {}", error_path.display());
                        self.artifacts.push(error_path);
                    }
                    Err(shot_err) => {
                        warn!(target = "smoke", error = %shot_err, "error screenshot failed");
                    }
                }

                Err(err)
            }
        }
    }

    async fn run_steps(&mut self, session: &BrowserSession, format: OutputFormat) -> Result<()> {
        let base = self.base_url.clone();

        info!(target = "smoke", url = %base, "navigate");
        self.step("navigate", session.goto_idle(&base, NAV_TIMEOUT))
            .await?;

        self.step(
            "homepage-heading",
            expect_text(session, HOME_HEADING, HOME_TITLE, HEADING_TIMEOUT),
        )
        .await?;
        if format.is_text() {
            println!("Homepage loaded successfully.");
        }

        info!(target = "smoke", selector = FISICA_BUTTON, "click");
        self.step("fisica-button", async {
            expect_visible(session, FISICA_BUTTON, BUTTON_TIMEOUT).await?;
            session.click(FISICA_BUTTON).await
        })
        .await?;

        let expected_url = fragment_url(&base, "fisica");
        self.step("fragment-url", expect_url(session, &expected_url, URL_TIMEOUT))
            .await?;

        self.step(
            "fisica-heading",
            expect_text(session, FISICA_HEADING, FISICA_TITLE, SECTION_TIMEOUT),
        )
        .await?;
        if format.is_text() {
            println!("Verification successful: Navigation to 'Saúde Física' page confirmed.");
        }

        let shot_path = self.out_dir.join("verification.png");
        self.step("screenshot", session.save_screenshot(&shot_path, true))
            .await?;
        if format.is_text() {
            println!("Screenshot saved to {}", shot_path.display());
        }
        self.artifacts.push(shot_path);

        Ok(())
    }

    async fn step<F>(&mut self, name: &'static str, check: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let start = Instant::now();
        let result = check.await;
        self.steps.push(StepReport {
            name: name.to_string(),
            status: if result.is_ok() {
                StepStatus::Passed
            } else {
                StepStatus::Failed
            },
            duration_ms: start.elapsed().as_millis() as u64,
        });
        result
    }

    pub fn into_report(self, error: Option<&SmokeError>) -> RunReport {
        RunReport {
            ok: error.is_none(),
            base_url: self.base_url,
            steps: self.steps,
            error: error.map(|e| e.to_string()),
            artifacts: self.artifacts,
        }
    }
}

/// Poll until the element's trimmed inner text equals `expected`.
async fn expect_text(
    session: &BrowserSession,
    selector: &str,
    expected: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut last_seen: Option<String> = None;
    loop {
        if let Some(text) = session.element_text(selector).await? {
            if text == expected {
                return Ok(());
            }
            last_seen = Some(text);
        }
        if Instant::now() >= deadline {
            return Err(text_failure(timeout, selector, expected, last_seen));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Failure for a text assertion, distinguishing an element that never
/// appeared from one whose text never matched (possibly empty).
fn text_failure(
    timeout: Duration,
    selector: &str,
    expected: &str,
    last_seen: Option<String>,
) -> SmokeError {
    let ms = timeout.as_millis() as u64;
    match last_seen {
        Some(actual) => SmokeError::TextMismatch {
            ms,
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
        },
        None => SmokeError::ElementNotFound {
            ms,
            selector: selector.to_string(),
        },
    }
}

/// Poll until the element exists and has a non-empty border box.
async fn expect_visible(session: &BrowserSession, selector: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if session.is_visible(selector).await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(SmokeError::Timeout {
                ms: timeout.as_millis() as u64,
                condition: format!("{selector} to become visible"),
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll until `window.location.href` equals `expected`.
async fn expect_url(session: &BrowserSession, expected: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if session.current_url().await? == expected {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(SmokeError::Timeout {
                ms: timeout.as_millis() as u64,
                condition: format!("URL to equal {expected}"),
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// URL the browser reports after a fragment navigation from `base`.
///
/// A bare origin gains the root path in `location.href`, so the expected
/// value is normalized the same way.
pub fn fragment_url(base: &str, fragment: &str) -> String {
    let has_path = base
        .split_once("://")
        .map(|(_, rest)| rest.contains('/'))
        .unwrap_or(true);
    if has_path {
        format!("{base}#{fragment}")
    } else {
        format!("{base}/#{fragment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_url_appends_to_trailing_slash() {
        assert_eq!(
            fragment_url("http://localhost:8000/", "fisica"),
            "http://localhost:8000/#fisica"
        );
    }

    #[test]
    fn fragment_url_inserts_root_path_for_bare_origin() {
        assert_eq!(
            fragment_url("http://localhost:8000", "fisica"),
            "http://localhost:8000/#fisica"
        );
    }

    #[test]
    fn fragment_url_keeps_deeper_paths() {
        assert_eq!(
            fragment_url("http://localhost:8000/app/", "fisica"),
            "http://localhost:8000/app/#fisica"
        );
    }

    #[test]
    fn text_failure_reports_element_not_found_when_never_seen() {
        let err = text_failure(
            Duration::from_secs(5),
            "#page-fisica h1",
            "Planejamento de Saúde Física",
            None,
        );
        assert!(matches!(err, SmokeError::ElementNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "text assertion failed after 5000ms for #page-fisica h1: element not found"
        );
    }

    #[test]
    fn text_failure_keeps_genuinely_empty_text_distinct() {
        let err = text_failure(Duration::from_secs(5), "h1", "Pequenos Passos", Some(String::new()));
        assert!(matches!(err, SmokeError::TextMismatch { .. }));
        assert!(err.to_string().contains("last saw \"\""));
    }

    #[tokio::test]
    async fn step_records_status_and_propagates_result() {
        let mut scenario = Scenario::new(
            "http://localhost:8000/".to_string(),
            PathBuf::from("jules-scratch/verification"),
        );

        scenario.step("ok-step", async { Ok(()) }).await.unwrap();
        let err = scenario
            .step("failing-step", async {
                Err(SmokeError::Timeout {
                    ms: 1,
                    condition: "never".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SmokeError::Timeout { .. }));

        let report = scenario.into_report(Some(&err));
        assert!(!report.ok);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].status, StepStatus::Passed);
        assert_eq!(report.steps[1].status, StepStatus::Failed);
        assert_eq!(report.error.as_deref(), Some(err.to_string().as_str()));
    }
}
