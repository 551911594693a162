//! Sentiment classification over batches of comments
//!
//! The model itself is remote: [`InferenceClient`] posts each text to a
//! Hugging Face style inference endpoint. Anything implementing
//! [`SentimentModel`] can stand in for it.

use crate::models::{Prediction, SentimentLabel, SentimentRecord};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MODEL: &str = "blanchefort/rubert-base-cased-sentiment";
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("Failed to initialise sentiment model: {0}")]
    Init(String),

    #[error("Inference request failed: {0}")]
    Request(String),

    #[error("Inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected inference response: {0}")]
    Response(String),
}

pub trait SentimentModel {
    fn predict(&self, text: &str) -> Result<Prediction, SentimentError>;

    /// Predict a batch; one result per input, in input order
    fn predict_batch(&self, texts: &[&str]) -> Vec<Result<Prediction, SentimentError>> {
        texts.iter().map(|text| self.predict(text)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

/// Blocking client for a text-classification inference endpoint
pub struct InferenceClient {
    client: reqwest::blocking::Client,
    url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self, SentimentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SentimentError::Init(e.to_string()))?;

        let url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.model.trim_start_matches('/')
        );
        log::info!("Using sentiment model at {}", url);

        Ok(Self {
            client,
            url,
            api_token: config.api_token,
        })
    }
}

impl SentimentModel for InferenceClient {
    fn predict(&self, text: &str) -> Result<Prediction, SentimentError> {
        let mut request = self.client.post(&self.url).json(&json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| SentimentError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SentimentError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(SentimentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_inference_response(&body)
    }
}

/// Pick the highest-scoring label out of an inference response body
fn parse_inference_response(body: &str) -> Result<Prediction, SentimentError> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).map_err(|e| SentimentError::Response(e.to_string()))?;
    let candidates = match parsed {
        InferenceResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(flat) => flat,
    };
    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|best| Prediction::new(SentimentLabel::from_model_label(&best.label), best.score))
        .ok_or_else(|| SentimentError::Response("no labels in response".to_string()))
}

/// Classify every comment in chunks of `batch_size`, preserving input order.
///
/// Missing or blank comments never reach the model; they and any failed
/// prediction get the `("unknown", 0.0)` sentinel.
pub fn analyze_comments<M>(
    model: &M,
    comments: &[Option<String>],
    batch_size: usize,
) -> Vec<SentimentRecord>
where
    M: SentimentModel + ?Sized,
{
    let batch_size = batch_size.max(1);
    let total_batches = comments.len().div_ceil(batch_size);
    let mut records = Vec::with_capacity(comments.len());

    for (n, batch) in comments.chunks(batch_size).enumerate() {
        log::info!(
            "Processing batch {}/{} ({} comments)",
            n + 1,
            total_batches,
            batch.len()
        );

        let texts: Vec<&str> = batch
            .iter()
            .filter_map(|c| c.as_deref().filter(|t| !t.trim().is_empty()))
            .collect();
        let mut predictions = model.predict_batch(&texts).into_iter();

        for comment in batch {
            let prediction = match comment.as_deref().filter(|t| !t.trim().is_empty()) {
                None => Prediction::unknown(),
                Some(text) => match predictions.next() {
                    Some(Ok(prediction)) => prediction,
                    Some(Err(e)) => {
                        log::warn!("Processing text '{}' failed: {}", text, e);
                        Prediction::unknown()
                    }
                    None => {
                        log::warn!("Model returned no result for '{}'", text);
                        Prediction::unknown()
                    }
                },
            };
            records.push(SentimentRecord {
                comment_text: comment.clone(),
                sentiment_label: prediction.label,
                sentiment_score: prediction.score,
            });
        }
    }

    records
}

/// Label counts, most frequent first; ties ordered by label
pub fn label_distribution(records: &[SentimentRecord]) -> Vec<(SentimentLabel, usize)> {
    let mut counts: HashMap<&SentimentLabel, usize> = HashMap::new();
    for record in records {
        *counts.entry(&record.sentiment_label).or_insert(0) += 1;
    }
    let mut distribution: Vec<(SentimentLabel, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.clone(), count))
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    distribution
}
