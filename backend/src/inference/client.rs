use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use shared::Prediction;
use std::time::Duration;

use super::{to_predictions, Classifier, InferenceError};
use crate::config::InferenceConfig;

#[derive(Deserialize)]
struct ScoresResponse {
    scores: Vec<f64>,
}

/// Calls an external model server that answers `{"scores": [...]}` with one
/// probability per configured label.
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    labels: Vec<String>,
}

impl HttpClassifier {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            labels: config.labels.clone(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &[u8], media_type: &str) -> Result<Vec<Prediction>, InferenceError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, media_type)
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ScoresResponse = response.json().await?;
        log::debug!("Inference returned {} scores", parsed.scores.len());
        to_predictions(&self.labels, &parsed.scores)
    }
}
