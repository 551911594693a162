use crate::browser::BrowserConfig;
use crate::reviews::ReviewSelectorConfig;
use crate::scroll::ScrollOptions;
use crate::sentiment::{InferenceConfig, API_TOKEN_ENV, DEFAULT_BATCH_SIZE, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const URL_ENV: &str = "REVIEWS_URL";
pub const COMMENTS_FILE_ENV: &str = "COMMENTS_FILE_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("No review page URL given (use --url, scrape.url or REVIEWS_URL)")]
    MissingUrl,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub clean: CleanConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    /// Business review page to scrape
    #[serde(default)]
    pub url: Option<String>,

    /// Scrollable element holding the lazy review list
    #[serde(default = "default_container_selector")]
    pub container_selector: String,

    /// How long to wait for the container after navigation
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_reviews_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub selectors: ReviewSelectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrollConfig {
    #[serde(default = "default_step_px")]
    pub step_px: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Optional hard bound on scroll steps
    #[serde(default)]
    pub max_steps: Option<u64>,

    /// Count a shrinking list as new content
    #[serde(default = "default_true")]
    pub shrink_resets_timer: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CleanConfig {
    #[serde(default = "default_reviews_output")]
    pub input: PathBuf,

    #[serde(default = "default_cleaned_output")]
    pub output: PathBuf,

    /// Column holding raw comment text
    #[serde(default = "default_review_column")]
    pub column: String,

    /// Name of the cleaned comment column in the output
    #[serde(default = "default_comments_column")]
    pub output_column: String,

    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentimentConfig {
    #[serde(default = "default_cleaned_output")]
    pub input: PathBuf,

    #[serde(default = "default_sentiment_output")]
    pub output: PathBuf,

    #[serde(default = "default_comments_column")]
    pub column: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_chart")]
    pub chart: PathBuf,
}

fn default_true() -> bool { true }
fn default_container_selector() -> String { ".scroll__container".to_string() }
fn default_wait_timeout() -> u64 { 20 }
fn default_reviews_output() -> PathBuf { PathBuf::from("output/reviews.xlsx") }
fn default_cleaned_output() -> PathBuf { PathBuf::from("output/preprocessed_comments.xlsx") }
fn default_sentiment_output() -> PathBuf { PathBuf::from("output/sentiment_comments.xlsx") }
fn default_chart() -> PathBuf { PathBuf::from("output/sentiment_distribution.png") }
fn default_review_column() -> String { "review".to_string() }
fn default_comments_column() -> String { "comments".to_string() }
fn default_step_px() -> u32 { 100 }
fn default_delay_ms() -> u64 { 100 }
fn default_idle_timeout() -> u64 { 40 }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_batch_size() -> usize { DEFAULT_BATCH_SIZE }
fn default_request_timeout() -> u64 { 30 }

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: None,
            container_selector: default_container_selector(),
            wait_timeout_secs: default_wait_timeout(),
            output: default_reviews_output(),
            selectors: ReviewSelectorConfig::default(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: default_step_px(),
            delay_ms: default_delay_ms(),
            idle_timeout_secs: default_idle_timeout(),
            max_steps: None,
            shrink_resets_timer: true,
        }
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input: default_reviews_output(),
            output: default_cleaned_output(),
            column: default_review_column(),
            output_column: default_comments_column(),
            extra_stopwords: Vec::new(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            input: default_cleaned_output(),
            output: default_sentiment_output(),
            column: default_comments_column(),
            model: default_model(),
            endpoint: default_endpoint(),
            batch_size: default_batch_size(),
            request_timeout_secs: default_request_timeout(),
            chart: default_chart(),
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when the file does not exist,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let config = Self::from_toml(&content).map_err(|reason| ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            })?;
            log::info!("Loaded configuration from {}", path.display());
            config
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str::<Config>(content).map_err(|e| e.to_string())
    }

    /// Apply environment overrides, reading variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.scrape.url.is_none() {
            self.scrape.url = lookup(URL_ENV);
        }
        if let Some(path) = lookup(COMMENTS_FILE_ENV) {
            self.sentiment.input = PathBuf::from(path);
        }
    }
}

impl ScrapeConfig {
    pub fn require_url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl ScrollConfig {
    pub fn options(&self) -> ScrollOptions {
        ScrollOptions {
            step: self.step_px,
            delay: Duration::from_millis(self.delay_ms),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            max_steps: self.max_steps,
            shrink_resets_timer: self.shrink_resets_timer,
        }
    }
}

impl SentimentConfig {
    pub fn inference(&self) -> InferenceConfig {
        InferenceConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_token: std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
