//! Hugging Face Inference API client for zero-shot classification
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::ClassifierError;
use crate::model::{ZeroShotModel, ZeroShotRequest};
use crate::models::ZeroShotOutput;
use crate::Result;

/// Reusable inference client (connection-pooled)
pub struct HuggingFaceModel {
    client: Client,
    api_token: Option<String>,
    endpoint: String,
    model_id: String,
}

impl HuggingFaceModel {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            endpoint: format!(
                "{}/{}",
                config.inference_url.trim_end_matches('/'),
                config.model_id
            ),
            model_id: config.model_id.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ZeroShotModel for HuggingFaceModel {
    async fn classify(&self, request: &ZeroShotRequest) -> Result<ZeroShotOutput> {
        let body = InferenceRequest::from(request);

        debug!(model = %self.model_id, "Calling zero-shot inference API");

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Inference request failed: {}", e);
            ClassifierError::ModelError(format!("inference request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Inference API error response: {}", error_text);
            return Err(ClassifierError::ModelError(format!(
                "inference API returned {}: {}",
                status, error_text
            )));
        }

        let parsed: InferenceResponse = response.json().await.map_err(|e| {
            error!("Failed to parse inference response: {}", e);
            ClassifierError::InvalidModelResponse(format!("parse error: {}", e))
        })?;

        parsed.into_output()
    }

    fn name(&self) -> &str {
        &self.model_id
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters<'a>,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Parameters<'a> {
    candidate_labels: &'a [String],
    hypothesis_template: &'a str,
    multi_label: bool,
}

#[derive(Debug, Serialize)]
struct Options {
    wait_for_model: bool,
}

impl<'a> From<&'a ZeroShotRequest> for InferenceRequest<'a> {
    fn from(request: &'a ZeroShotRequest) -> Self {
        Self {
            inputs: &request.sequence,
            parameters: Parameters {
                candidate_labels: &request.candidate_labels,
                hypothesis_template: &request.hypothesis_template,
                multi_label: request.multi_label,
            },
            options: Options {
                wait_for_model: true,
            },
        }
    }
}

/// The API has answered in two shapes over time
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Failure { error: String },
    Ranked { labels: Vec<String>, scores: Vec<f64> },
    Pairs(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl InferenceResponse {
    fn into_output(self) -> Result<ZeroShotOutput> {
        let pairs: Vec<(String, f64)> = match self {
            InferenceResponse::Failure { error } => {
                return Err(ClassifierError::ModelError(error));
            }
            InferenceResponse::Ranked { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassifierError::InvalidModelResponse(format!(
                        "{} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                labels.into_iter().zip(scores).collect()
            }
            InferenceResponse::Pairs(items) => {
                items.into_iter().map(|p| (p.label, p.score)).collect()
            }
        };

        if pairs.is_empty() {
            return Err(ClassifierError::InvalidModelResponse(
                "no labels returned".to_string(),
            ));
        }

        Ok(ZeroShotOutput::from_pairs(pairs))
    }
}
