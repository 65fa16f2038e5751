use crate::element::Target;
use crate::errors::Result;
use async_trait::async_trait;

/// Flat surface over the delegate driver. Every element-targeted method
/// resolves the target afresh; implementations must not cache elements.
///
/// Methods that require an existing element return
/// `BrowserError::ElementNotFound` when the lookup fails, so callers can
/// distinguish absence from other driver failures. `exists` never fails
/// for a missing element.
#[async_trait]
pub trait DriverBackend: Send + Sync {
    async fn exists(&self, target: &Target) -> Result<bool>;

    async fn is_displayed(&self, target: &Target) -> Result<bool>;

    async fn is_enabled(&self, target: &Target) -> Result<bool>;

    async fn is_selected(&self, target: &Target) -> Result<bool>;

    async fn click(&self, target: &Target) -> Result<()>;

    async fn send_keys(&self, target: &Target, text: &str) -> Result<()>;

    async fn clear(&self, target: &Target) -> Result<()>;

    async fn text(&self, target: &Target) -> Result<String>;

    async fn attr(&self, target: &Target, name: &str) -> Result<Option<String>>;

    async fn select_by_value(&self, target: &Target, value: &str) -> Result<()>;

    async fn select_by_label(&self, target: &Target, label: &str) -> Result<()>;

    async fn select_by_index(&self, target: &Target, index: usize) -> Result<()>;

    async fn option_count(&self, target: &Target) -> Result<usize>;

    async fn selected_option_label(&self, target: &Target) -> Result<String>;

    /// Move the pointer over the element.
    async fn hover(&self, target: &Target) -> Result<()>;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    async fn refresh(&self) -> Result<()>;

    async fn back(&self) -> Result<()>;

    async fn enter_frame(&self, target: &Target) -> Result<()>;

    async fn enter_default_frame(&self) -> Result<()>;

    /// Switch to the window at the given zero-based handle index.
    async fn switch_to_window(&self, index: usize) -> Result<()>;

    async fn delete_all_cookies(&self) -> Result<()>;

    /// Text of the active alert, or `None` when no alert is present.
    async fn alert_text(&self) -> Result<Option<String>>;

    async fn accept_alert(&self) -> Result<()>;

    /// End the driver session. Further calls fail with `SessionClosed`.
    async fn quit(&mut self) -> Result<()>;
}
