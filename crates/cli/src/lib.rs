//! Browser-driven smoke test for the "Pequenos Passos" page.
//!
//! Launches a headless Chromium, loads the locally served homepage, checks
//! the visible headings, clicks the "Saúde Física" navigation button, checks
//! the resulting URL and section heading, and saves a full-page screenshot.
//! Any failed step produces a diagnostic screenshot and a non-zero exit code.

pub mod browser;
pub mod cli;
pub mod error;
pub mod logging;
pub mod report;
pub mod scenario;
