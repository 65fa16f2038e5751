use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::fmt::MakeWriter;
use webwrap::testing::MockDriver;
use webwrap::{Browser, BrowserError, Target, DEFAULT_TIMEOUT};

fn mock_browser() -> Browser<MockDriver> {
    Browser::with_backend(MockDriver::new())
}

fn checkbox() -> Target {
    Target::id("terms").describe("terms checkbox")
}

#[tokio::test]
async fn wait_for_visible_returns_immediately_when_already_true() {
    let browser = mock_browser();
    let target = Target::css("#ready");

    let start = Instant::now();
    let result = browser
        .wait_for_visible(&target, DEFAULT_TIMEOUT)
        .await
        .unwrap();

    assert!(result);
    // Should not have slept through even one full poll interval.
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn wait_for_visible_times_out_with_false() {
    let browser = mock_browser();
    browser.backend().set_displayed(false);
    let target = Target::css("#never");

    let timeout = Duration::from_millis(300);
    let start = Instant::now();
    let result = browser.wait_for_visible(&target, timeout).await.unwrap();

    assert!(!result);
    assert!(start.elapsed() >= timeout);
}

#[tokio::test]
async fn wait_for_visible_sees_late_appearance() {
    let browser = mock_browser();
    browser.backend().displayed_after_polls(2);
    let target = Target::css("#late");

    let result = browser
        .wait_for_visible(&target, Duration::from_secs(2))
        .await
        .unwrap();

    assert!(result);
}

#[tokio::test]
async fn wait_for_present_treats_absence_as_false_not_error() {
    let browser = mock_browser();
    browser.backend().set_present(false);
    let target = Target::id("ghost");

    let result = browser
        .wait_for_present(&target, Duration::from_millis(200))
        .await
        .unwrap();
    assert!(!result);

    assert!(!browser.is_present(&target).await.unwrap());
}

#[tokio::test]
async fn visibility_query_propagates_absence() {
    let browser = mock_browser();
    browser.backend().set_present(false);
    let target = Target::id("ghost");

    let err = browser.is_visible(&target).await.unwrap_err();
    assert!(matches!(err, BrowserError::ElementNotFound(_)));
}

#[tokio::test]
async fn wait_for_not_present_false_while_element_stays_visible() {
    let browser = mock_browser();
    let target = Target::id("banner");

    let result = browser
        .wait_for_not_present(&target, Duration::from_millis(300))
        .await
        .unwrap();
    assert!(!result);
}

#[tokio::test]
async fn wait_for_not_present_false_when_invisible_but_still_in_document() {
    let browser = mock_browser();
    browser.backend().set_displayed(false);
    let target = Target::id("banner");

    let result = browser
        .wait_for_not_present(&target, Duration::from_millis(300))
        .await
        .unwrap();
    assert!(!result);
}

#[tokio::test]
async fn wait_for_not_present_true_once_element_is_gone() {
    let browser = mock_browser();
    browser.backend().set_present(false);
    let target = Target::id("banner");

    let result = browser
        .wait_for_not_present(&target, Duration::from_millis(300))
        .await
        .unwrap();
    assert!(result);
}

#[tokio::test]
async fn check_skips_click_when_already_checked() {
    let browser = mock_browser();
    browser.backend().set_selected(true);

    browser.check(&checkbox(), None).await.unwrap();
    browser.check(&checkbox(), None).await.unwrap();

    assert_eq!(browser.backend().clicks(), 0);
}

#[tokio::test]
async fn uncheck_skips_click_when_already_unchecked() {
    let browser = mock_browser();

    browser.uncheck(&checkbox(), None).await.unwrap();
    browser.uncheck(&checkbox(), None).await.unwrap();

    assert_eq!(browser.backend().clicks(), 0);
}

#[tokio::test]
async fn check_clicks_once_and_is_idempotent_after_that() {
    let browser = mock_browser();

    browser.check(&checkbox(), None).await.unwrap();
    assert_eq!(browser.backend().clicks(), 1);

    // The mock toggles checked state on click, so this is a no-op.
    browser.check(&checkbox(), None).await.unwrap();
    assert_eq!(browser.backend().clicks(), 1);
}

#[tokio::test]
async fn check_clicks_the_wrapper_when_provided() {
    let browser = mock_browser();
    let wrapper = Target::css("label[for=terms]").describe("terms label");

    browser.check(&checkbox(), Some(&wrapper)).await.unwrap();

    assert_eq!(browser.backend().clicks(), 1);
}

#[tokio::test]
async fn liveness_probe_tracks_session_state() {
    let browser = mock_browser();
    assert!(browser.is_alive().await);

    browser.backend().kill();
    assert!(!browser.is_alive().await);
}

#[tokio::test]
async fn quit_if_alive_tolerates_a_dead_session() {
    let browser = mock_browser();
    browser.backend().kill();

    browser.quit_if_alive().await.unwrap();
}

#[tokio::test]
async fn wait_for_url_contains_observes_navigation() {
    let browser = mock_browser();
    browser.navigate("https://example.com/login").await.unwrap();

    assert!(browser
        .wait_for_url_contains("/login", Duration::from_millis(200))
        .await
        .unwrap());
    assert!(!browser
        .wait_for_url_contains("/dashboard", Duration::from_millis(200))
        .await
        .unwrap());
}

#[tokio::test]
async fn wait_for_text_change_detects_new_text() {
    let browser = mock_browser();
    browser.backend().set_text("loading");
    let target = Target::id("status");

    browser.backend().set_text("done");
    let changed = browser
        .wait_for_text_change(&target, "loading", Duration::from_millis(300))
        .await
        .unwrap();
    assert!(changed);

    let unchanged = browser
        .wait_for_text_change(&target, "done", Duration::from_millis(300))
        .await
        .unwrap();
    assert!(!unchanged);
}

#[tokio::test]
async fn alert_is_present_accepts_when_asked() {
    let browser = mock_browser();
    browser.backend().set_alert("Are you sure?");

    assert!(browser.alert_is_present(true).await.unwrap());
    // The alert was accepted, so a second probe finds nothing.
    assert!(!browser.alert_is_present(false).await.unwrap());
}

#[tokio::test]
async fn alert_wait_fails_fast_when_the_session_dies() {
    let browser = mock_browser();
    browser.backend().kill();

    let start = Instant::now();
    let err = browser
        .wait_for_alert_present(Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, BrowserError::SessionClosed));
    // A lost session must surface immediately, not after the timeout.
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn select_random_option_picks_a_real_option() {
    let browser = mock_browser();
    browser.backend().set_options(vec![
        "small".to_string(),
        "medium".to_string(),
        "large".to_string(),
    ]);
    let target = Target::name("size");

    browser.select_random_option(&target).await.unwrap();

    let index = browser.backend().selected_index().unwrap();
    assert!(index < 3);
    let label = browser.selected_option(&target).await.unwrap();
    assert!(["small", "medium", "large"].contains(&label.as_str()));
}

#[tokio::test]
async fn select_random_option_fails_on_empty_select() {
    let browser = mock_browser();
    let target = Target::name("size");

    let err = browser.select_random_option(&target).await.unwrap_err();
    assert!(matches!(err, BrowserError::EmptySelect(_)));
}

#[tokio::test]
async fn set_text_replaces_existing_content() {
    let browser = mock_browser();
    browser.backend().set_text("old value");
    let target = Target::name("email");

    browser.set_text(&target, "user@example.com").await.unwrap();

    assert_eq!(browser.get_text(&target).await.unwrap(), "user@example.com");
}

#[tokio::test]
async fn get_attribute_returns_none_for_missing_attribute() {
    let browser = mock_browser();
    browser.backend().set_attr("href", "/home");
    let target = Target::tag("a");

    assert_eq!(
        browser.get_attribute(&target, "href").await.unwrap(),
        Some("/home".to_string())
    );
    assert_eq!(browser.get_attribute(&target, "rel").await.unwrap(), None);
}

#[tokio::test]
async fn switch_to_window_rejects_a_bad_index() {
    let browser = mock_browser();

    browser.switch_to_window(0).await.unwrap();
    let err = browser.switch_to_window(3).await.unwrap_err();
    assert!(matches!(err, BrowserError::NoSuchWindow(3)));
}

// ---------------------------------------------------------------------
// Log suppression
// ---------------------------------------------------------------------

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (Capture, tracing::subscriber::DefaultGuard) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

#[tokio::test]
async fn scroll_to_logs_only_the_outer_line() {
    let (capture, _guard) = capture_logs();
    let browser = mock_browser();
    let target = Target::id("footer");

    browser.scroll_to(&target).await.unwrap();

    let output = capture.contents();
    assert!(output.contains("Browser.scroll_to"));
    assert!(!output.contains("Browser.mouse_over"));
}

#[tokio::test]
async fn set_text_suppresses_the_inner_clear() {
    let (capture, _guard) = capture_logs();
    let browser = mock_browser();
    let target = Target::name("email");

    browser.set_text(&target, "user@example.com").await.unwrap();

    let output = capture.contents();
    assert!(output.contains("Browser.set_text"));
    assert!(!output.contains("Browser.clear_text"));
}

#[tokio::test]
async fn logging_resumes_after_a_suppressed_composite() {
    let (capture, _guard) = capture_logs();
    let browser = mock_browser();
    let target = Target::id("footer");

    browser.scroll_to(&target).await.unwrap();
    browser.mouse_over(&target).await.unwrap();

    let output = capture.contents();
    assert!(output.contains("Browser.mouse_over"));
}

#[tokio::test]
async fn disabling_action_logging_silences_everything() {
    let (capture, _guard) = capture_logs();
    let browser = mock_browser();
    browser.set_action_logging(false);

    browser.navigate("https://example.com").await.unwrap();
    browser.refresh().await.unwrap();

    assert!(capture.contents().is_empty());
}

#[tokio::test]
async fn timeout_logs_a_warning() {
    let (capture, _guard) = capture_logs();
    let browser = mock_browser();
    browser.backend().set_displayed(false);
    let target = Target::id("never");

    browser
        .wait_for_visible(&target, Duration::from_millis(200))
        .await
        .unwrap();

    let output = capture.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("did not become visible"));
}
