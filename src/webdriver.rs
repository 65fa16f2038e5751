use crate::config::{BrowserConfig, BrowserKind};
use crate::driver::DriverBackend;
use crate::element::{Strategy, Target};
use crate::errors::{BrowserError, Result};
use async_trait::async_trait;
use thirtyfour::components::SelectElement;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{CapabilitiesHelper, ChromeCapabilities, FirefoxCapabilities};
use url::Url;

const LOCAL_CHROMEDRIVER: &str = "http://localhost:9515";
const LOCAL_GECKODRIVER: &str = "http://localhost:4444";

/// `DriverBackend` over a live thirtyfour WebDriver session.
pub struct WebDriverBackend {
    driver: Option<WebDriver>,
}

impl WebDriverBackend {
    /// Open a new session against a local driver process or a Selenium
    /// Grid hub, per the configuration.
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let endpoint = endpoint_url(config)?;
        let driver = match config.kind {
            BrowserKind::Chrome => {
                WebDriver::new(endpoint.as_str(), chrome_capabilities(config)?).await?
            }
            BrowserKind::Firefox => {
                WebDriver::new(endpoint.as_str(), firefox_capabilities(config)?).await?
            }
        };
        Ok(Self {
            driver: Some(driver),
        })
    }

    /// Wrap an already-created session.
    pub fn from_driver(driver: WebDriver) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    fn core(&self) -> Result<&WebDriver> {
        self.driver.as_ref().ok_or(BrowserError::SessionClosed)
    }

    async fn find(&self, target: &Target) -> Result<WebElement> {
        match self.core()?.find(to_by(target)).await {
            Ok(element) => Ok(element),
            Err(WebDriverError::NoSuchElement(_)) => {
                Err(BrowserError::ElementNotFound(target.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn select(&self, target: &Target) -> Result<SelectElement> {
        let element = self.find(target).await?;
        Ok(SelectElement::new(&element).await?)
    }
}

#[async_trait]
impl DriverBackend for WebDriverBackend {
    async fn exists(&self, target: &Target) -> Result<bool> {
        Ok(!self.core()?.find_all(to_by(target)).await?.is_empty())
    }

    async fn is_displayed(&self, target: &Target) -> Result<bool> {
        Ok(self.find(target).await?.is_displayed().await?)
    }

    async fn is_enabled(&self, target: &Target) -> Result<bool> {
        Ok(self.find(target).await?.is_enabled().await?)
    }

    async fn is_selected(&self, target: &Target) -> Result<bool> {
        Ok(self.find(target).await?.is_selected().await?)
    }

    async fn click(&self, target: &Target) -> Result<()> {
        Ok(self.find(target).await?.click().await?)
    }

    async fn send_keys(&self, target: &Target, text: &str) -> Result<()> {
        Ok(self.find(target).await?.send_keys(text).await?)
    }

    async fn clear(&self, target: &Target) -> Result<()> {
        Ok(self.find(target).await?.clear().await?)
    }

    async fn text(&self, target: &Target) -> Result<String> {
        Ok(self.find(target).await?.text().await?)
    }

    async fn attr(&self, target: &Target, name: &str) -> Result<Option<String>> {
        Ok(self.find(target).await?.attr(name).await?)
    }

    async fn select_by_value(&self, target: &Target, value: &str) -> Result<()> {
        Ok(self.select(target).await?.select_by_value(value).await?)
    }

    async fn select_by_label(&self, target: &Target, label: &str) -> Result<()> {
        Ok(self
            .select(target)
            .await?
            .select_by_exact_text(label)
            .await?)
    }

    async fn select_by_index(&self, target: &Target, index: usize) -> Result<()> {
        Ok(self
            .select(target)
            .await?
            .select_by_index(index as u32)
            .await?)
    }

    async fn option_count(&self, target: &Target) -> Result<usize> {
        Ok(self.select(target).await?.options().await?.len())
    }

    async fn selected_option_label(&self, target: &Target) -> Result<String> {
        let option = self.select(target).await?.first_selected_option().await?;
        Ok(option.text().await?)
    }

    async fn hover(&self, target: &Target) -> Result<()> {
        let element = self.find(target).await?;
        Ok(self
            .core()?
            .action_chain()
            .move_to_element_center(&element)
            .perform()
            .await?)
    }

    async fn goto(&self, url: &str) -> Result<()> {
        Ok(self.core()?.goto(url).await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.core()?.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.core()?.title().await?)
    }

    async fn refresh(&self) -> Result<()> {
        Ok(self.core()?.refresh().await?)
    }

    async fn back(&self) -> Result<()> {
        Ok(self.core()?.back().await?)
    }

    async fn enter_frame(&self, target: &Target) -> Result<()> {
        Ok(self.find(target).await?.enter_frame().await?)
    }

    async fn enter_default_frame(&self) -> Result<()> {
        Ok(self.core()?.enter_default_frame().await?)
    }

    async fn switch_to_window(&self, index: usize) -> Result<()> {
        let handles = self.core()?.windows().await?;
        let handle = handles
            .into_iter()
            .nth(index)
            .ok_or(BrowserError::NoSuchWindow(index))?;
        Ok(self.core()?.switch_to_window(handle).await?)
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        Ok(self.core()?.delete_all_cookies().await?)
    }

    async fn alert_text(&self) -> Result<Option<String>> {
        match self.core()?.get_alert_text().await {
            Ok(text) => Ok(Some(text)),
            Err(WebDriverError::NoSuchAlert(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn accept_alert(&self) -> Result<()> {
        Ok(self.core()?.accept_alert().await?)
    }

    async fn quit(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
        }
        Ok(())
    }
}

fn to_by(target: &Target) -> By {
    match target.strategy {
        Strategy::Css => By::Css(target.locator.clone()),
        Strategy::XPath => By::XPath(target.locator.clone()),
        Strategy::Id => By::Id(target.locator.clone()),
        Strategy::Name => By::Name(target.locator.clone()),
        Strategy::Tag => By::Tag(target.locator.clone()),
        Strategy::ClassName => By::ClassName(target.locator.clone()),
        Strategy::LinkText => By::LinkText(target.locator.clone()),
        // thirtyfour exposes no partial-link-text constructor; emulate
        // the selector with XPath.
        Strategy::PartialLinkText => By::XPath(format!(
            "//a[contains(text(),'{}')]",
            target.locator
        )),
    }
}

fn endpoint_url(config: &BrowserConfig) -> Result<Url> {
    let endpoint = if config.remote {
        Url::parse(&format!(
            "http://{}:{}/wd/hub",
            config.grid_host, config.grid_port
        ))?
    } else {
        match config.kind {
            BrowserKind::Chrome => Url::parse(LOCAL_CHROMEDRIVER)?,
            BrowserKind::Firefox => Url::parse(LOCAL_GECKODRIVER)?,
        }
    };
    Ok(endpoint)
}

fn chrome_capabilities(config: &BrowserConfig) -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    caps.add_arg(&format!("--window-size={},{}", config.width, config.height))?;
    for arg in &config.args {
        caps.add_arg(arg)?;
    }
    if config.headless {
        caps.add_arg("--headless")?;
    }

    // Enable browser console log collection
    caps.insert_base_capability(
        "goog:loggingPrefs".to_string(),
        serde_json::json!({ "browser": "ALL" }),
    );
    for (key, value) in &config.capabilities {
        caps.insert_base_capability(key.clone(), value.clone());
    }

    Ok(caps)
}

fn firefox_capabilities(config: &BrowserConfig) -> Result<FirefoxCapabilities> {
    let mut caps = DesiredCapabilities::firefox();
    caps.add_arg(&format!("--width={}", config.width))?;
    caps.add_arg(&format!("--height={}", config.height))?;
    for arg in &config.args {
        caps.add_arg(arg)?;
    }
    if config.headless {
        caps.add_arg("-headless")?;
    }

    for (key, value) in &config.capabilities {
        caps.insert_base_capability(key.clone(), value.clone());
    }

    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_endpoint_depends_on_browser_kind() {
        let chrome = BrowserConfig::default();
        assert_eq!(endpoint_url(&chrome).unwrap().as_str(), "http://localhost:9515/");

        let firefox = BrowserConfig {
            kind: BrowserKind::Firefox,
            ..Default::default()
        };
        assert_eq!(endpoint_url(&firefox).unwrap().as_str(), "http://localhost:4444/");
    }

    #[test]
    fn partial_link_text_becomes_a_contains_xpath() {
        let by = to_by(&Target::partial_link_text("Next"));
        let rendered = format!("{by:?}");
        assert!(rendered.contains("contains(text(),'Next')"));
    }

    #[test]
    fn remote_endpoint_targets_the_grid_hub() {
        let config = BrowserConfig {
            remote: true,
            grid_host: "grid.internal".to_string(),
            grid_port: 4445,
            ..Default::default()
        };
        assert_eq!(
            endpoint_url(&config).unwrap().as_str(),
            "http://grid.internal:4445/wd/hub"
        );
    }
}
