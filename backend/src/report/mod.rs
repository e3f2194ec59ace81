pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use shared::Prediction;

use crate::config::ServerMessages;
use prompt::{build_prompt, rate_limited_report, FindingSummary};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{0}")]
    Request(reqwest::Error),
    #[error("429 rate limit exceeded")]
    RateLimited,
    #[error("{status}: {body}")]
    Api { status: u16, body: String },
    #[error("API yanıtı boş")]
    Empty,
}

/// Drops the request URL so endpoint details never reach a report or a log.
impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        ReportError::Request(err.without_url())
    }
}

/// Produces narrative text for a prompt.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ReportError>;
}

/// Writes the narrative report for a prediction set.
///
/// Never fails: a rate-limited generator yields a structured placeholder
/// report, any other failure yields a one-line error report.
pub async fn compose(
    generator: &dyn ReportGenerator,
    predictions: &[Prediction],
    messages: &ServerMessages,
) -> String {
    let summary = FindingSummary::from_predictions(predictions);
    let prompt = build_prompt(&summary, messages);

    match generator.generate(&prompt).await {
        Ok(text) => text,
        Err(ReportError::RateLimited) => {
            log::warn!("Report generator rate limited, using placeholder report");
            rate_limited_report(&summary, messages)
        }
        Err(err) => {
            log::error!("Report generation failed: {}", err);
            format!("{}: {}", messages.report_api_error, err)
        }
    }
}
