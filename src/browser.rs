use crate::config::BrowserConfig;
use crate::driver::DriverBackend;
use crate::element::Target;
use crate::errors::{BrowserError, Result};
use crate::webdriver::WebDriverBackend;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};
use thirtyfour::WebDriver;
use tracing::{info, warn};

/// Interval between condition checks inside the wait operations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default timeout callers typically pass to the wait operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Logged element-interaction facade over a delegate driver.
///
/// Every method resolves its target afresh and performs exactly one
/// delegate operation (the composites below say so explicitly). Failures
/// propagate unchanged from the delegate except where a method's contract
/// converts them: `is_present` maps absence to `false`, and the
/// `wait_for_*` family maps timeouts to `false` plus a warning log line.
///
/// The facade owns its backend and is meant for single-threaded use; the
/// underlying driver session is not safe for concurrent commands.
pub struct Browser<D: DriverBackend> {
    backend: D,
    action_logging: AtomicBool,
    quiet_depth: AtomicU32,
}

/// Re-enables action logging when dropped. Suppression nests: logging
/// resumes only once every outstanding guard is gone.
struct QuietGuard<'a>(&'a AtomicU32);

impl Drop for QuietGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Browser<WebDriverBackend> {
    /// Launch a new driver session from the configuration.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        Ok(Self::with_backend(WebDriverBackend::connect(config).await?))
    }

    /// Wrap an existing thirtyfour session instead of launching one.
    pub fn from_driver(driver: WebDriver) -> Self {
        Self::with_backend(WebDriverBackend::from_driver(driver))
    }
}

impl<D: DriverBackend> Browser<D> {
    pub fn with_backend(backend: D) -> Self {
        Self {
            backend,
            action_logging: AtomicBool::new(true),
            quiet_depth: AtomicU32::new(0),
        }
    }

    pub fn backend(&self) -> &D {
        &self.backend
    }

    /// Turn per-action log lines on or off for this facade.
    pub fn set_action_logging(&self, enabled: bool) {
        self.action_logging.store(enabled, Ordering::Relaxed);
    }

    fn quiet(&self) -> QuietGuard<'_> {
        self.quiet_depth.fetch_add(1, Ordering::Relaxed);
        QuietGuard(&self.quiet_depth)
    }

    fn logging_active(&self) -> bool {
        self.action_logging.load(Ordering::Relaxed) && self.quiet_depth.load(Ordering::Relaxed) == 0
    }

    fn log_info(&self, msg: String) {
        if self.logging_active() {
            info!("{msg}");
        }
    }

    fn log_warning(&self, msg: String) {
        if self.logging_active() {
            warn!("{msg}");
        }
    }

    // ------------------------------------------------------------------
    // Status queries
    // ------------------------------------------------------------------

    /// Whether the element is enabled. Fails if the element is absent.
    pub async fn is_clickable(&self, target: &Target) -> Result<bool> {
        let result = self.backend.is_enabled(target).await?;
        self.log_info(format!(
            "Browser.is_clickable: {target} is {}clickable",
            not(result)
        ));
        Ok(result)
    }

    /// Whether the element exists in the document. Absence is `false`,
    /// never an error.
    pub async fn is_present(&self, target: &Target) -> Result<bool> {
        let result = self.backend.exists(target).await?;
        self.log_info(format!(
            "Browser.is_present: {target} is {}present",
            not(result)
        ));
        Ok(result)
    }

    /// Whether the element is displayed. Fails if the element is absent.
    pub async fn is_visible(&self, target: &Target) -> Result<bool> {
        let result = self.backend.is_displayed(target).await?;
        self.log_info(format!(
            "Browser.is_visible: {target} is {}visible",
            not(result)
        ));
        Ok(result)
    }

    /// Whether a checkbox-like element is checked. Fails if absent.
    pub async fn is_checked(&self, target: &Target) -> Result<bool> {
        let result = self.backend.is_selected(target).await?;
        self.log_info(format!(
            "Browser.is_checked: {target} is {}checked",
            not(result)
        ));
        Ok(result)
    }

    /// Whether an alert is currently open, optionally accepting it.
    pub async fn alert_is_present(&self, accept_if_present: bool) -> Result<bool> {
        let result = {
            let _quiet = self.quiet();
            self.wait_for_alert_present(Duration::ZERO).await?
        };
        if accept_if_present && result {
            {
                let _quiet = self.quiet();
                self.accept_alert().await?;
            }
            self.log_info(
                "Browser.alert_is_present: alert is present, and has been accepted".to_string(),
            );
        } else {
            self.log_info(format!(
                "Browser.alert_is_present: alert is {}present",
                not(result)
            ));
        }
        Ok(result)
    }

    /// Probe the session with a trivial query. Any driver failure reads
    /// as a dead browser.
    pub async fn is_alive(&self) -> bool {
        self.backend.title().await.is_ok()
    }

    // ------------------------------------------------------------------
    // Wait operations
    // ------------------------------------------------------------------
    //
    // All of these return Ok(true) as soon as the condition holds, check
    // the condition at least once even with a zero timeout, and convert
    // expiry into Ok(false) plus a warning line. Delegate failures other
    // than element absence propagate out of the poll loop.

    pub async fn wait_for_visible(&self, target: &Target, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let visible = match self.backend.is_displayed(target).await {
                Ok(displayed) => displayed,
                Err(BrowserError::ElementNotFound(_)) => false,
                Err(e) => return Err(e),
            };
            if visible {
                self.log_info(format!(
                    "Browser.wait_for_visible: {target} is visible within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.log_warning(format!(
            "Browser.wait_for_visible: {target} did not become visible after {timeout:?}"
        ));
        Ok(false)
    }

    /// Absence counts as invisible, matching the delegate's own
    /// invisibility condition.
    pub async fn wait_for_not_visible(&self, target: &Target, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let invisible = match self.backend.is_displayed(target).await {
                Ok(displayed) => !displayed,
                Err(BrowserError::ElementNotFound(_)) => true,
                Err(e) => return Err(e),
            };
            if invisible {
                self.log_info(format!(
                    "Browser.wait_for_not_visible: {target} is invisible within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.log_warning(format!(
            "Browser.wait_for_not_visible: {target} did not become invisible after {timeout:?}"
        ));
        Ok(false)
    }

    pub async fn wait_for_present(&self, target: &Target, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.backend.exists(target).await? {
                self.log_info(format!(
                    "Browser.wait_for_present: {target} is present within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.log_warning(format!(
            "Browser.wait_for_present: {target} did not become present after {timeout:?}"
        ));
        Ok(false)
    }

    /// Composite: wait for invisibility, then re-check absence. Either
    /// part failing counts as a timeout. Inner calls are not logged.
    pub async fn wait_for_not_present(&self, target: &Target, timeout: Duration) -> Result<bool> {
        let gone = {
            let _quiet = self.quiet();
            self.wait_for_not_visible(target, timeout).await? && !self.backend.exists(target).await?
        };
        if gone {
            self.log_info(format!(
                "Browser.wait_for_not_present: {target} is gone within {timeout:?}"
            ));
        } else {
            self.log_warning(format!(
                "Browser.wait_for_not_present: {target} did not leave the document after {timeout:?}"
            ));
        }
        Ok(gone)
    }

    pub async fn wait_for_alert_present(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.backend.alert_text().await?.is_some() {
                self.log_info(format!(
                    "Browser.wait_for_alert_present: alert is present within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.log_warning(format!(
            "Browser.wait_for_alert_present: alert did not appear after {timeout:?}"
        ));
        Ok(false)
    }

    /// Clickable means displayed and enabled; absence keeps the poll going.
    pub async fn wait_for_clickable(&self, target: &Target, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let clickable = match self.backend.is_displayed(target).await {
                Ok(true) => self.backend.is_enabled(target).await?,
                Ok(false) => false,
                Err(BrowserError::ElementNotFound(_)) => false,
                Err(e) => return Err(e),
            };
            if clickable {
                self.log_info(format!(
                    "Browser.wait_for_clickable: {target} is clickable within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        self.log_warning(format!(
            "Browser.wait_for_clickable: {target} did not become clickable after {timeout:?}"
        ));
        Ok(false)
    }

    pub async fn wait_for_url_contains(&self, fragment: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = self.backend.current_url().await?;
            if url.contains(fragment) {
                self.log_info(format!(
                    "Browser.wait_for_url_contains: {url} contains {fragment} within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                self.log_warning(format!(
                    "Browser.wait_for_url_contains: {url} does not contain {fragment} after {timeout:?}"
                ));
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_for_url_equals(&self, expected: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = self.backend.current_url().await?;
            if url == expected {
                self.log_info(format!(
                    "Browser.wait_for_url_equals: url equals {expected} within {timeout:?}"
                ));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                self.log_warning(format!(
                    "Browser.wait_for_url_equals: {url} does not equal {expected} after {timeout:?}"
                ));
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for the element's text to differ from `original_text`. Waits
    /// for visibility first; the inner text reads are not logged.
    pub async fn wait_for_text_change(
        &self,
        target: &Target,
        original_text: &str,
        timeout: Duration,
    ) -> Result<bool> {
        self.wait_for_visible(target, timeout).await?;
        let changed = {
            let _quiet = self.quiet();
            let deadline = Instant::now() + timeout;
            loop {
                if self.backend.text(target).await? != original_text {
                    break true;
                }
                if Instant::now() >= deadline {
                    break false;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        if changed {
            self.log_info(format!(
                "Browser.wait_for_text_change: {target} text changed from {original_text:?} within {timeout:?}"
            ));
        } else {
            self.log_warning(format!(
                "Browser.wait_for_text_change: {target} text did not change from {original_text:?} after {timeout:?}"
            ));
        }
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.log_info(format!("Browser.navigate: navigating to {url}"));
        self.backend.goto(url).await
    }

    pub async fn get_text(&self, target: &Target) -> Result<String> {
        let result = self.backend.text(target).await?;
        self.log_info(format!("Browser.get_text: {target} text is {result:?}"));
        Ok(result)
    }

    /// Clear the element, then type into it. The inner clear is not
    /// logged.
    pub async fn set_text(&self, target: &Target, text: &str) -> Result<()> {
        self.log_info(format!(
            "Browser.set_text: setting text of {target} to {text:?}"
        ));
        {
            let _quiet = self.quiet();
            self.clear_text(target).await?;
        }
        self.backend.send_keys(target, text).await
    }

    pub async fn clear_text(&self, target: &Target) -> Result<()> {
        self.log_info(format!("Browser.clear_text: clearing the text of {target}"));
        self.backend.clear(target).await
    }

    /// Click the element, logging a URL change when the click navigated.
    pub async fn click(&self, target: &Target) -> Result<()> {
        let url_before = self.backend.current_url().await?;
        self.log_info(format!("Browser.click: clicking {target}"));
        self.backend.click(target).await?;
        let url_after = self.backend.current_url().await?;
        if url_before != url_after {
            self.log_info(format!(
                "Browser.click: url changed from {url_before} to {url_after}"
            ));
        }
        Ok(())
    }

    pub async fn mouse_over(&self, target: &Target) -> Result<()> {
        self.log_info(format!("Browser.mouse_over: moving mouse over {target}"));
        self.backend.hover(target).await
    }

    /// Scrolling is done by moving the pointer to the element; the inner
    /// hover is not logged.
    pub async fn scroll_to(&self, target: &Target) -> Result<()> {
        self.log_info(format!("Browser.scroll_to: scrolling to {target}"));
        let _quiet = self.quiet();
        self.mouse_over(target).await
    }

    pub async fn select_by_value(&self, target: &Target, value: &str) -> Result<()> {
        self.log_info(format!(
            "Browser.select_by_value: setting {target} to {value:?}"
        ));
        self.backend.select_by_value(target, value).await
    }

    pub async fn select_by_label(&self, target: &Target, label: &str) -> Result<()> {
        self.log_info(format!(
            "Browser.select_by_label: setting {target} to {label:?}"
        ));
        self.backend.select_by_label(target, label).await
    }

    /// Pick a random option, then log what was chosen.
    pub async fn select_random_option(&self, target: &Target) -> Result<()> {
        self.log_info(format!(
            "Browser.select_random_option: selecting random option for {target}"
        ));
        let count = self.backend.option_count(target).await?;
        if count == 0 {
            return Err(BrowserError::EmptySelect(target.to_string()));
        }
        let index = rand::thread_rng().gen_range(0..count);
        self.backend.select_by_index(target, index).await?;
        let _ = self.selected_option(target).await?;
        Ok(())
    }

    pub async fn selected_option(&self, target: &Target) -> Result<String> {
        let result = self.backend.selected_option_label(target).await?;
        self.log_info(format!(
            "Browser.selected_option: {target} is currently set to {result:?}"
        ));
        Ok(result)
    }

    /// Check the checkbox unless it already is. When the real input
    /// cannot receive the click (hidden behind a styled wrapper), pass
    /// the wrapper target to click instead.
    pub async fn check(&self, target: &Target, wrapper: Option<&Target>) -> Result<()> {
        self.log_info(format!("Browser.check: setting {target} to checked"));
        if self.backend.is_selected(target).await? {
            self.log_info(format!(
                "Browser.check: skipping action as {target} is already checked"
            ));
            return Ok(());
        }
        match wrapper {
            Some(wrapper) => {
                self.log_info(format!(
                    "Browser.check: wrapper element was provided, clicking {wrapper} instead"
                ));
                self.click(wrapper).await
            }
            None => self.click(target).await,
        }
    }

    /// Uncheck the checkbox unless it already is. Same wrapper handling
    /// as `check`.
    pub async fn uncheck(&self, target: &Target, wrapper: Option<&Target>) -> Result<()> {
        self.log_info(format!("Browser.uncheck: setting {target} to unchecked"));
        if !self.backend.is_selected(target).await? {
            self.log_info(format!(
                "Browser.uncheck: skipping action as {target} is already unchecked"
            ));
            return Ok(());
        }
        match wrapper {
            Some(wrapper) => {
                self.log_info(format!(
                    "Browser.uncheck: wrapper element was provided, clicking {wrapper} instead"
                ));
                self.click(wrapper).await
            }
            None => self.click(target).await,
        }
    }

    /// Unconditional sleep. Last resort when no wait operation fits.
    pub async fn delay(&self, length: Duration) {
        self.log_info(format!("Browser.delay: sleeping for {length:?}"));
        tokio::time::sleep(length).await;
    }

    pub async fn get_attribute(&self, target: &Target, attribute: &str) -> Result<Option<String>> {
        let result = self.backend.attr(target, attribute).await?;
        self.log_info(format!(
            "Browser.get_attribute: {attribute} attribute of {target} is {result:?}"
        ));
        Ok(result)
    }

    /// Type into the element without clearing it first.
    pub async fn send_keys(&self, target: &Target, keys: &str) -> Result<()> {
        self.log_info(format!("Browser.send_keys: sending {keys:?} to {target}"));
        self.backend.send_keys(target, keys).await
    }

    pub async fn current_url(&self) -> Result<String> {
        let result = self.backend.current_url().await?;
        self.log_info(format!("Browser.current_url: current url is {result}"));
        Ok(result)
    }

    pub async fn refresh(&self) -> Result<()> {
        self.log_info("Browser.refresh: refreshing the page".to_string());
        self.backend.refresh().await
    }

    pub async fn switch_to_frame(&self, target: &Target) -> Result<()> {
        self.log_info(format!(
            "Browser.switch_to_frame: switching to iframe {target}"
        ));
        self.backend.enter_frame(target).await
    }

    pub async fn switch_to_default_content(&self) -> Result<()> {
        self.log_info("Browser.switch_to_default_content: switching to default content".to_string());
        self.backend.enter_default_frame().await
    }

    pub async fn switch_to_window(&self, index: usize) -> Result<()> {
        self.log_info(format!(
            "Browser.switch_to_window: switching to window at index {index}"
        ));
        self.backend.switch_to_window(index).await
    }

    pub async fn delete_all_cookies(&self) -> Result<()> {
        self.backend.delete_all_cookies().await
    }

    pub async fn accept_alert(&self) -> Result<()> {
        self.log_info("Browser.accept_alert: accepting alert".to_string());
        self.backend.accept_alert().await
    }

    pub async fn back(&self) -> Result<()> {
        self.log_info("Browser.back: returning to the previous page".to_string());
        self.backend.back().await
    }

    /// End the session. The facade is consumed; there is no automatic
    /// cleanup on drop.
    pub async fn quit(mut self) -> Result<()> {
        self.log_info("Browser.quit: quitting the browser".to_string());
        self.backend.quit().await
    }

    /// Like `quit`, but a dead session is not an error.
    pub async fn quit_if_alive(mut self) -> Result<()> {
        if self.is_alive().await {
            self.log_info("Browser.quit_if_alive: quitting the browser".to_string());
            self.backend.quit().await
        } else {
            self.log_info("Browser.quit_if_alive: session already gone, nothing to quit".to_string());
            Ok(())
        }
    }
}

fn not(result: bool) -> &'static str {
    if result {
        ""
    } else {
        "not "
    }
}
