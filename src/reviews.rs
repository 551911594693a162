//! Review extraction from rendered page markup
//!
//! Every field is read by a small pure function that returns `None` on any
//! missing element, missing attribute or unparseable value, so one malformed
//! card never affects its neighbours.

use crate::models::ReviewRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

/// CSS selectors for the review markup of the map service
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewSelectorConfig {
    pub card: String,
    pub text: String,
    pub rating: String,
    pub date: String,
}

impl Default for ReviewSelectorConfig {
    fn default() -> Self {
        Self {
            card: "div.business-reviews-card-view__review".to_string(),
            text: "span.business-review-view__body-text".to_string(),
            rating: r#"div.business-review-view__rating span[itemprop="reviewRating"] meta[itemprop="ratingValue"]"#
                .to_string(),
            date: "span.business-review-view__date meta".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid {field} selector `{selector}`: {reason}")]
pub struct SelectorError {
    pub field: &'static str,
    pub selector: String,
    pub reason: String,
}

/// Parsed selectors, ready to run against a document
#[derive(Debug, Clone)]
pub struct ReviewSelectors {
    card: Selector,
    text: Selector,
    rating: Selector,
    date: Selector,
}

impl ReviewSelectors {
    pub fn new(config: &ReviewSelectorConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            card: parse_selector("card", &config.card)?,
            text: parse_selector("text", &config.text)?,
            rating: parse_selector("rating", &config.rating)?,
            date: parse_selector("date", &config.date)?,
        })
    }
}

fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        field,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Extract one record per review card, in document order
pub fn extract_reviews(html: &str, selectors: &ReviewSelectors) -> Vec<ReviewRecord> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .map(|card| extract_review(card, selectors))
        .collect()
}

pub fn extract_review(card: ElementRef<'_>, selectors: &ReviewSelectors) -> ReviewRecord {
    ReviewRecord {
        review_text: extract_text(card, &selectors.text),
        rating: extract_rating(card, &selectors.rating),
        publication_date: extract_date(card, &selectors.date),
    }
}

/// Full text of the first match, whitespace-trimmed; empty counts as missing
pub fn extract_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text: String = card.select(selector).next()?.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `content` attribute of the rating meta tag, kept only inside `[1, 5]`
pub fn extract_rating(card: ElementRef<'_>, selector: &Selector) -> Option<f64> {
    let content = card.select(selector).next()?.value().attr("content")?;
    parse_rating(content)
}

pub fn extract_date(card: ElementRef<'_>, selector: &Selector) -> Option<NaiveDate> {
    let content = card.select(selector).next()?.value().attr("content")?;
    parse_publication_date(content)
}

pub fn parse_rating(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    (1.0..=5.0).contains(&value).then_some(value)
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M",
];

/// Parse a free-form date string; anything unrecognised becomes `None`
pub fn parse_publication_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}
