use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One review card as extracted from the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReviewRecord {
    pub review_text: Option<String>,
    /// Star rating in `[1.0, 5.0]`
    pub rating: Option<f64>,
    pub publication_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// Any other label the model emits, kept verbatim
    Other(String),
    /// Sentinel for missing text or a failed prediction
    Unknown,
}

impl SentimentLabel {
    /// Only the exact class names map onto variants; any other label is kept
    /// verbatim in `Other`.
    pub fn from_model_label(label: &str) -> Self {
        match label {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            "NEUTRAL" => Self::Neutral,
            _ => Self::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Other(label) => label,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single model output
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: SentimentLabel,
    /// Confidence in `[0.0, 1.0]`
    pub score: f64,
}

impl Prediction {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self { label, score }
    }

    /// The `("unknown", 0.0)` fallback
    pub fn unknown() -> Self {
        Self {
            label: SentimentLabel::Unknown,
            score: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRecord {
    pub comment_text: Option<String>,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing() {
        assert_eq!(SentimentLabel::from_model_label("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_model_label("NEGATIVE"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_model_label("NEUTRAL"), SentimentLabel::Neutral);
        assert_eq!(
            SentimentLabel::from_model_label("LABEL_2"),
            SentimentLabel::Other("LABEL_2".to_string())
        );
        assert_eq!(SentimentLabel::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_model_labels_are_stored_verbatim() {
        let negative = SentimentLabel::from_model_label("negative");
        assert_eq!(negative, SentimentLabel::Other("negative".to_string()));
        assert_eq!(negative.as_str(), "negative");

        let pos = SentimentLabel::from_model_label("POS");
        assert_eq!(pos.as_str(), "POS");

        let unknown = SentimentLabel::from_model_label("unknown");
        assert_ne!(unknown, SentimentLabel::Unknown);
        assert_eq!(unknown.as_str(), "unknown");
    }

    #[test]
    fn test_prediction_score_is_clamped() {
        assert_eq!(Prediction::new(SentimentLabel::Positive, 1.3).score, 1.0);
        assert_eq!(Prediction::new(SentimentLabel::Positive, -0.2).score, 0.0);
        assert_eq!(Prediction::new(SentimentLabel::Positive, f64::NAN).score, 0.0);
    }
}
