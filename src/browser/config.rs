use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the browser executable path
pub const BROWSER_PATH_ENV: &str = "CHROME_PATH";

#[cfg(target_os = "windows")]
const PLATFORM_DEFAULT_PATH: &str = "C:/Program Files/Google/Chrome/Application/chrome.exe";

#[cfg(target_os = "macos")]
const PLATFORM_DEFAULT_PATH: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_DEFAULT_PATH: &str = "/usr/bin/google-chrome";

/// Configuration for browser instances
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// Browser executable. `None` lets the runtime discover one
    pub executable_path: Option<PathBuf>,

    /// Custom user agent
    pub user_agent: Option<String>,

    /// Navigation timeout in seconds
    pub timeout_seconds: u64,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            executable_path: None,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            timeout_seconds: 30,
            chrome_flags: vec![],
        }
    }
}

impl BrowserConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolve the executable: explicit setting, then `CHROME_PATH`,
    /// then the platform default if it exists on disk.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        resolve_executable_from(
            self.executable_path.clone(),
            std::env::var_os(BROWSER_PATH_ENV).map(PathBuf::from),
            Path::new(PLATFORM_DEFAULT_PATH),
        )
    }
}

fn resolve_executable_from(
    configured: Option<PathBuf>,
    from_env: Option<PathBuf>,
    platform_default: &Path,
) -> Option<PathBuf> {
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    if platform_default.exists() {
        return Some(platform_default.to_path_buf());
    }
    None
}
