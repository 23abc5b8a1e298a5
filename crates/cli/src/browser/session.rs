use std::path::Path;
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, EventLifecycleEvent};
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Result, SmokeError};

/// Lifecycle event Chromium emits once no requests have been in flight
/// for its quiet window.
const NETWORK_IDLE: &str = "networkIdle";

/// A launched Chromium with a single page, owned exclusively by the runner.
///
/// The session must be closed exactly once via [`BrowserSession::close`],
/// on both the success and failure paths.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(headless: bool) -> Result<Self> {
        debug!(target = "smoke", headless, "launching chromium");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(1280, 720);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(SmokeError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SmokeError::BrowserLaunch(e.to_string()))?;

        // Pump CDP messages until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!(target = "smoke", "CDP event loop ended");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Navigate to `url` and wait for the `networkIdle` lifecycle event,
    /// bounded by `timeout`.
    ///
    /// The listener is attached before navigation starts so the event cannot
    /// slip past between load and subscription.
    pub async fn goto_idle(&self, url: &str, timeout: Duration) -> Result<()> {
        let mut lifecycle = self.page.event_listener::<EventLifecycleEvent>().await?;

        self.page
            .goto(url)
            .await
            .map_err(|e| SmokeError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })?;

        let idle = async {
            while let Some(event) = lifecycle.next().await {
                if event.name == NETWORK_IDLE {
                    return true;
                }
            }
            false
        };

        match tokio::time::timeout(timeout, idle).await {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(SmokeError::Timeout {
                ms: timeout.as_millis() as u64,
                condition: format!("network idle after navigating to {url}"),
            }),
        }
    }

    /// Current `window.location.href`, which tracks fragment-only changes
    /// that the target's reported URL can lag behind.
    pub async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .evaluate("window.location.href")
            .await?
            .into_value::<String>()?;
        Ok(url)
    }

    /// Trimmed inner text of the first element matching `selector`, or
    /// `None` while no such element exists.
    pub async fn element_text(&self, selector: &str) -> Result<Option<String>> {
        match self.page.find_element(selector).await {
            Ok(element) => Ok(element
                .inner_text()
                .await?
                .map(|text| text.trim().to_string())),
            Err(_) => Ok(None),
        }
    }

    /// Whether the first element matching `selector` exists and has a
    /// non-empty border box.
    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        let visible = self
            .page
            .evaluate(visibility_probe(selector))
            .await?
            .into_value::<bool>()?;
        Ok(visible)
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    /// Capture a PNG screenshot to `path`, creating parent directories first.
    pub async fn save_screenshot(&self, path: &Path, full_page: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();

        self.page
            .save_screenshot(params, path)
            .await
            .map(|_| ())
            .map_err(|e| SmokeError::Screenshot {
                path: path.to_path_buf(),
                source: anyhow::Error::new(e),
            })
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

/// Build the JS expression probing whether `selector` matches a rendered
/// element. Runs inside a single-quoted string, so quotes are escaped.
fn visibility_probe(selector: &str) -> String {
    let escaped = selector.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "(() => {{ const el = document.querySelector('{escaped}'); \
         if (!el) return false; \
         const rect = el.getBoundingClientRect(); \
         return rect.width > 0 && rect.height > 0; }})()"
    )
}
