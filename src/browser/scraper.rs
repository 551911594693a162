use super::manager::BrowserError;
use crate::scroll::ScrollTarget;
use headless_chrome::browser::tab::element::Element;
use headless_chrome::Tab;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// High-level scraping utilities for a browser tab
pub struct BrowserScraper {
    tab: Arc<Tab>,
    default_timeout: Duration,
}

impl BrowserScraper {
    /// Create a new scraper with the given tab
    pub fn new(tab: Arc<Tab>) -> Self {
        Self::with_timeout(tab, Duration::from_secs(20))
    }

    /// Create a new scraper with a custom default timeout
    pub fn with_timeout(tab: Arc<Tab>, timeout: Duration) -> Self {
        Self {
            tab,
            default_timeout: timeout,
        }
    }

    /// Navigate to a URL and wait for page load
    pub fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        log::info!("Browser navigating to: {}", url);

        self.tab.navigate_to(url).map_err(|e| {
            BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e))
        })?;

        self.tab.wait_until_navigated().map_err(|e| {
            BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e))
        })?;

        Ok(())
    }

    /// Wait for an element matching the given CSS selector
    pub fn wait_for_selector(&self, selector: &str) -> Result<Element<'_>, BrowserError> {
        self.wait_for_selector_with_timeout(selector, self.default_timeout)
    }

    /// Wait for an element with a custom timeout
    pub fn wait_for_selector_with_timeout(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element<'_>, BrowserError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| {
                BrowserError::ElementNotFound(format!(
                    "{} (waited {}s): {}",
                    selector,
                    timeout.as_secs(),
                    e
                ))
            })
    }

    /// Get the HTML content of the page
    pub fn get_html(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }
}

/// Scroll target backed by a live element inside a browser tab
pub struct ElementScroller<'a> {
    element: Element<'a>,
}

impl<'a> ElementScroller<'a> {
    pub fn new(element: Element<'a>) -> Self {
        Self { element }
    }

    fn call(&self, function: &str, args: Vec<Value>) -> Result<u64, BrowserError> {
        let result = self
            .element
            .call_js_fn(function, args, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        result
            .value
            .as_ref()
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0).round() as u64)
            .ok_or_else(|| {
                BrowserError::JavaScriptError(format!("expected a number from `{}`", function))
            })
    }
}

impl ScrollTarget for ElementScroller<'_> {
    type Error = BrowserError;

    fn scroll_by(&mut self, step: u32) -> Result<u64, Self::Error> {
        self.call(
            "function(step) { this.scrollTop += step; return this.scrollTop; }",
            vec![json!(step)],
        )
    }

    fn content_height(&mut self) -> Result<u64, Self::Error> {
        self.call("function() { return this.scrollHeight; }", vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserConfig, BrowserManager};

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_html_extraction() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        let tab = manager.new_tab().unwrap();
        let scraper = BrowserScraper::new(tab);

        scraper.navigate("https://example.com").unwrap();
        let html = scraper.get_html().unwrap();

        assert!(html.contains("Example"));
        assert!(html.len() > 100);
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_element_scroller_reads_height() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        let tab = manager.new_tab().unwrap();
        let scraper = BrowserScraper::new(tab);

        scraper.navigate("https://example.com").unwrap();
        let body = scraper.wait_for_selector("body").unwrap();
        let mut scroller = ElementScroller::new(body);

        assert!(scroller.content_height().unwrap() > 0);
        assert!(scroller.scroll_by(100).is_ok());
    }
}
