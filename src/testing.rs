//! Scripted in-memory backend for exercising the facade without a real
//! driver process.

use crate::driver::DriverBackend;
use crate::element::Target;
use crate::errors::{BrowserError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

struct MockState {
    alive: bool,
    present: bool,
    displayed: bool,
    enabled: bool,
    selected: bool,
    text: String,
    attrs: Vec<(String, String)>,
    options: Vec<String>,
    selected_index: Option<usize>,
    alert: Option<String>,
    url: String,
    title: String,
    clicks: u32,
    /// When set, `is_displayed` reports false for this many polls before
    /// flipping the element visible.
    displayed_after_polls: Option<u32>,
    window_count: usize,
}

/// A single-element page simulation. All state is behind one lock; the
/// facade is single-threaded so contention never matters.
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                alive: true,
                present: true,
                displayed: true,
                enabled: true,
                selected: false,
                text: String::new(),
                attrs: vec![],
                options: vec![],
                selected_index: None,
                alert: None,
                url: "about:blank".to_string(),
                title: "mock".to_string(),
                clicks: 0,
                displayed_after_polls: None,
                window_count: 1,
            }),
        }
    }

    pub fn set_present(&self, present: bool) {
        self.state.lock().unwrap().present = present;
    }

    pub fn set_displayed(&self, displayed: bool) {
        self.state.lock().unwrap().displayed = displayed;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().enabled = enabled;
    }

    pub fn set_selected(&self, selected: bool) {
        self.state.lock().unwrap().selected = selected;
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().unwrap().text = text.into();
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .attrs
            .push((name.into(), value.into()));
    }

    pub fn set_options(&self, options: Vec<String>) {
        self.state.lock().unwrap().options = options;
    }

    pub fn set_alert(&self, text: impl Into<String>) {
        self.state.lock().unwrap().alert = Some(text.into());
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().unwrap().url = url.into();
    }

    /// Make `is_displayed` report false for `polls` checks, then true.
    pub fn displayed_after_polls(&self, polls: u32) {
        let mut state = self.state.lock().unwrap();
        state.displayed = false;
        state.displayed_after_polls = Some(polls);
    }

    /// Simulate a crashed browser: every call fails from here on.
    pub fn kill(&self) {
        self.state.lock().unwrap().alive = false;
    }

    pub fn clicks(&self) -> u32 {
        self.state.lock().unwrap().clicks
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.lock().unwrap().selected_index
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, MockState>> {
        let state = self.state.lock().unwrap();
        if !state.alive {
            return Err(BrowserError::SessionClosed);
        }
        Ok(state)
    }

    fn element(&self, target: &Target) -> Result<std::sync::MutexGuard<'_, MockState>> {
        let state = self.guard()?;
        if !state.present {
            return Err(BrowserError::ElementNotFound(target.to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl DriverBackend for MockDriver {
    async fn exists(&self, _target: &Target) -> Result<bool> {
        Ok(self.guard()?.present)
    }

    async fn is_displayed(&self, target: &Target) -> Result<bool> {
        let mut state = self.element(target)?;
        if let Some(polls) = state.displayed_after_polls {
            if polls == 0 {
                state.displayed = true;
                state.displayed_after_polls = None;
            } else {
                state.displayed_after_polls = Some(polls - 1);
            }
        }
        Ok(state.displayed)
    }

    async fn is_enabled(&self, target: &Target) -> Result<bool> {
        Ok(self.element(target)?.enabled)
    }

    async fn is_selected(&self, target: &Target) -> Result<bool> {
        Ok(self.element(target)?.selected)
    }

    async fn click(&self, target: &Target) -> Result<()> {
        let mut state = self.element(target)?;
        state.clicks += 1;
        // Checkbox semantics: a click toggles the checked state.
        state.selected = !state.selected;
        Ok(())
    }

    async fn send_keys(&self, target: &Target, text: &str) -> Result<()> {
        self.element(target)?.text.push_str(text);
        Ok(())
    }

    async fn clear(&self, target: &Target) -> Result<()> {
        self.element(target)?.text.clear();
        Ok(())
    }

    async fn text(&self, target: &Target) -> Result<String> {
        Ok(self.element(target)?.text.clone())
    }

    async fn attr(&self, target: &Target, name: &str) -> Result<Option<String>> {
        Ok(self
            .element(target)?
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone()))
    }

    async fn select_by_value(&self, target: &Target, value: &str) -> Result<()> {
        let mut state = self.element(target)?;
        match state.options.iter().position(|option| option == value) {
            Some(index) => {
                state.selected_index = Some(index);
                Ok(())
            }
            None => Err(BrowserError::ElementNotFound(format!(
                "{target} option {value}"
            ))),
        }
    }

    async fn select_by_label(&self, target: &Target, label: &str) -> Result<()> {
        self.select_by_value(target, label).await
    }

    async fn select_by_index(&self, target: &Target, index: usize) -> Result<()> {
        let mut state = self.element(target)?;
        if index >= state.options.len() {
            return Err(BrowserError::ElementNotFound(format!(
                "{target} option index {index}"
            )));
        }
        state.selected_index = Some(index);
        Ok(())
    }

    async fn option_count(&self, target: &Target) -> Result<usize> {
        Ok(self.element(target)?.options.len())
    }

    async fn selected_option_label(&self, target: &Target) -> Result<String> {
        let state = self.element(target)?;
        state
            .selected_index
            .and_then(|index| state.options.get(index).cloned())
            .ok_or_else(|| BrowserError::ElementNotFound(format!("{target} selected option")))
    }

    async fn hover(&self, target: &Target) -> Result<()> {
        self.element(target)?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.guard()?.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.guard()?.url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.guard()?.title.clone())
    }

    async fn refresh(&self) -> Result<()> {
        self.guard()?;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.guard()?;
        Ok(())
    }

    async fn enter_frame(&self, target: &Target) -> Result<()> {
        self.element(target)?;
        Ok(())
    }

    async fn enter_default_frame(&self) -> Result<()> {
        self.guard()?;
        Ok(())
    }

    async fn switch_to_window(&self, index: usize) -> Result<()> {
        let state = self.guard()?;
        if index >= state.window_count {
            return Err(BrowserError::NoSuchWindow(index));
        }
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.guard()?;
        Ok(())
    }

    async fn alert_text(&self) -> Result<Option<String>> {
        Ok(self.guard()?.alert.clone())
    }

    async fn accept_alert(&self) -> Result<()> {
        let mut state = self.guard()?;
        if state.alert.take().is_none() {
            return Err(BrowserError::ElementNotFound("alert".to_string()));
        }
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.state.lock().unwrap().alive = false;
        Ok(())
    }
}
