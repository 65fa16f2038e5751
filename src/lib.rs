pub mod browser;
pub mod config;
pub mod driver;
pub mod element;
pub mod errors;
pub mod testing;
pub mod webdriver;

pub use browser::{Browser, DEFAULT_TIMEOUT, POLL_INTERVAL};
pub use config::{BrowserConfig, BrowserKind};
pub use driver::DriverBackend;
pub use element::{Strategy, Target};
pub use errors::{BrowserError, Result};
pub use webdriver::WebDriverBackend;
