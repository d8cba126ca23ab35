//! Browser and resource cleanup functionality
//!
//! Runs once per invocation after every render task has finished.

use chromiumoxide::Browser;
use log::{debug, warn};
use std::sync::Arc;

use crate::browser_setup::BrowserWrapper;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Close the browser gracefully and wait for the process to exit
async fn close_browser(mut browser: Browser, errors: &mut Vec<String>) {
    debug!(target: "sitemapper::cleanup", "Closing browser");
    if let Err(e) = browser.close().await {
        warn!(target: "sitemapper::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    }

    // Wait for browser process to fully exit (prevents "not closed manually" warning)
    if let Err(e) = browser.wait().await {
        warn!(target: "sitemapper::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    } else {
        debug!(target: "sitemapper::cleanup", "Browser process exited");
    }
}

impl BrowserWrapper {
    /// Shut the browser down and release its profile directory.
    ///
    /// Order matters: close the browser, remove the profile directory, then
    /// abort the CDP handler, so the browser never loses its connection
    /// mid-close. Callers must drop every renderer clone first; a browser
    /// that is still shared is left to `Drop`, which kills the process.
    pub async fn shutdown(mut self) -> CleanupResult {
        let mut errors = Vec::new();

        if let Some(shared) = self.browser.take() {
            match Arc::try_unwrap(shared) {
                Ok(browser) => close_browser(browser, &mut errors).await,
                Err(still_shared) => {
                    let refs = Arc::strong_count(&still_shared);
                    warn!(
                        target: "sitemapper::cleanup",
                        "Browser still has {refs} strong references, cleanup will happen on drop"
                    );
                    errors.push(format!("Browser still shared by {refs} handles"));
                }
            }
        }

        self.cleanup_temp_dir();

        self.handler.abort();
        if let Err(e) = (&mut self.handler).await
            && !e.is_cancelled()
        {
            warn!(target: "sitemapper::cleanup", "Handler task failed during abort: {e}");
        }

        if errors.is_empty() {
            CleanupResult::Success
        } else {
            CleanupResult::PartialFailure(errors)
        }
    }
}
