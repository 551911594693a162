//! Browser automation for lazily rendered review pages
//!
//! Wraps headless Chrome: launching and tearing down the browser, navigating,
//! waiting for elements, and exposing a page element as a [`ScrollTarget`]
//! for the adaptive scroll loop.
//!
//! # Example
//!
//! ```no_run
//! use map_reviews::browser::{BrowserConfig, BrowserManager, BrowserScraper, ElementScroller};
//! use map_reviews::scroll::{scroll_until_idle, ScrollOptions, SystemClock};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BrowserManager::new(BrowserConfig::default())?;
//! let scraper = BrowserScraper::new(manager.new_tab()?);
//!
//! scraper.navigate("https://example.com")?;
//! let container = scraper.wait_for_selector("body")?;
//! scroll_until_idle(&mut ElementScroller::new(container), &SystemClock, &ScrollOptions::default());
//!
//! let html = scraper.get_html()?;
//! println!("Extracted {} bytes of HTML", html.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`ScrollTarget`]: crate::scroll::ScrollTarget

pub mod config;
pub mod manager;
pub mod scraper;

pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use scraper::{BrowserScraper, ElementScroller};
