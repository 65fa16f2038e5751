use crate::errors::BrowserError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

impl FromStr for BrowserKind {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(BrowserError::UnsupportedBrowser(other.to_string())),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Firefox => write!(f, "firefox"),
        }
    }
}

/// Driver configuration, fixed for the lifetime of the facade it creates.
/// No validation happens here; a bad grid host only surfaces when the
/// session is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    /// Connect to a Selenium Grid hub instead of a local driver process.
    pub remote: bool,
    pub headless: bool,
    pub width: u32,
    pub height: u32,
    pub grid_host: String,
    pub grid_port: u16,
    /// Extra startup arguments passed through to the browser.
    pub args: Vec<String>,
    /// Extra capability entries merged into the session capabilities.
    pub capabilities: HashMap<String, serde_json::Value>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            remote: false,
            headless: false,
            width: 1920,
            height: 1080,
            grid_host: "localhost".to_string(),
            grid_port: 4444,
            args: vec![],
            capabilities: HashMap::new(),
        }
    }
}
