use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Unsupported browser kind: {0}")]
    UnsupportedBrowser(String),

    #[error("Driver session is closed")]
    SessionClosed,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No window at index {0}")]
    NoSuchWindow(usize),

    #[error("Select element has no options: {0}")]
    EmptySelect(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

// Convert anyhow::Error to BrowserError
impl From<anyhow::Error> for BrowserError {
    fn from(err: anyhow::Error) -> Self {
        BrowserError::AnyhowError(err.to_string())
    }
}
