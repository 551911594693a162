use super::config::BrowserConfig;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;

/// Keeps the CDP connection open while the scroll loop is between steps
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

/// Owns the browser process for the lifetime of a scrape.
///
/// The process is torn down when the manager is dropped, whether or not the
/// scrape succeeded.
pub struct BrowserManager {
    browser: Arc<Browser>,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch a browser with the given configuration
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let args = Self::launch_args(&config);
        let launch_options = Self::build_launch_options(&config, &args)?;

        match &launch_options.path {
            Some(path) => log::info!("Launching browser from {}", path.display()),
            None => log::info!("Launching browser from the default location"),
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        Ok(Self {
            browser: Arc::new(browser),
            config,
        })
    }

    fn launch_args(config: &BrowserConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            OsString::from("--disable-blink-features=AutomationControlled"),
            OsString::from("--disable-dev-shm-usage"),
            OsString::from("--start-maximized"),
        ];
        if let Some(ua) = &config.user_agent {
            args.push(OsString::from(format!("--user-agent={}", ua)));
        }
        args.extend(config.chrome_flags.iter().map(OsString::from));
        args
    }

    /// Build Chrome launch options from our config
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        args: &'a [OsString],
    ) -> Result<LaunchOptions<'a>, BrowserError> {
        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_size.0, config.window_size.1)))
            .path(config.resolve_executable())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args.iter().map(OsString::as_os_str).collect::<Vec<&OsStr>>())
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))
    }

    /// Create a new tab
    pub fn new_tab(&self) -> Result<Arc<Tab>, BrowserError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))?;
        tab.set_default_timeout(self.config.timeout());
        Ok(tab)
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        log::info!("Shutting down browser");
    }
}

/// Errors that can occur during browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript execution error: {0}")]
    JavaScriptError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_build() {
        let config = BrowserConfig::default();
        let args = BrowserManager::launch_args(&config);
        let options = BrowserManager::build_launch_options(&config, &args);
        assert!(options.is_ok());
    }

    #[test]
    fn test_launch_args_carry_user_agent_and_flags() {
        let config = BrowserConfig {
            user_agent: Some("TestAgent/1.0".to_string()),
            chrome_flags: vec!["--no-sandbox".to_string()],
            ..BrowserConfig::default()
        };
        let args = BrowserManager::launch_args(&config);

        assert!(args
            .iter()
            .any(|arg| arg.to_string_lossy() == "--user-agent=TestAgent/1.0"));
        assert!(args.iter().any(|arg| arg == "--no-sandbox"));
        assert!(args
            .iter()
            .any(|arg| arg.to_string_lossy().contains("AutomationControlled")));
    }

    #[test]
    fn test_explicit_executable_is_passed_through() {
        let config = BrowserConfig {
            executable_path: Some("/opt/chrome/chrome".into()),
            ..BrowserConfig::default()
        };
        let args = BrowserManager::launch_args(&config);
        let options = BrowserManager::build_launch_options(&config, &args).unwrap();
        assert_eq!(options.path, Some("/opt/chrome/chrome".into()));
    }

    #[test]
    #[ignore] // Requires Chrome/Chromium
    fn test_browser_manager_creation() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        assert!(manager.new_tab().is_ok());
    }
}
