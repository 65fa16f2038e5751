use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator strategy understood by the delegate driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Css,
    XPath,
    Id,
    Name,
    Tag,
    ClassName,
    LinkText,
    PartialLinkText,
}

/// A (strategy, locator) pair identifying a page element, typically defined
/// once on a page object and passed to every facade call. The facade never
/// caches the resolved element; lookup happens afresh on each interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub strategy: Strategy,
    pub locator: String,
    /// Optional human-readable name used in log lines.
    pub description: Option<String>,
}

impl Target {
    pub fn new(strategy: Strategy, locator: impl Into<String>) -> Self {
        Self {
            strategy,
            locator: locator.into(),
            description: None,
        }
    }

    pub fn css(locator: impl Into<String>) -> Self {
        Self::new(Strategy::Css, locator)
    }

    pub fn xpath(locator: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, locator)
    }

    pub fn id(locator: impl Into<String>) -> Self {
        Self::new(Strategy::Id, locator)
    }

    pub fn name(locator: impl Into<String>) -> Self {
        Self::new(Strategy::Name, locator)
    }

    pub fn tag(locator: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, locator)
    }

    pub fn class_name(locator: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, locator)
    }

    pub fn link_text(locator: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, locator)
    }

    pub fn partial_link_text(locator: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, locator)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}", description),
            None => write!(f, "{:?}[{}]", self.strategy, self.locator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_description_when_present() {
        let target = Target::id("login-submit").describe("login button");
        assert_eq!(target.to_string(), "login button");
    }

    #[test]
    fn display_falls_back_to_strategy_and_locator() {
        let target = Target::css("#main .row");
        assert_eq!(target.to_string(), "Css[#main .row]");
    }

    #[test]
    fn constructors_set_the_strategy() {
        assert_eq!(Target::xpath("//a").strategy, Strategy::XPath);
        assert_eq!(Target::name("q").strategy, Strategy::Name);
        assert_eq!(Target::link_text("Next").strategy, Strategy::LinkText);
    }
}
