use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmokeError>;

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("timeout after {ms}ms waiting for: {condition}")]
    Timeout { ms: u64, condition: String },

    #[error(
        "text assertion failed after {ms}ms for {selector}: expected {expected:?}, last saw {actual:?}"
    )]
    TextMismatch {
        ms: u64,
        selector: String,
        expected: String,
        actual: String,
    },

    #[error("text assertion failed after {ms}ms for {selector}: element not found")]
    ElementNotFound { ms: u64, selector: String },

    #[error("screenshot failed: {path}")]
    Screenshot {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),
}
