pub mod client;

use async_trait::async_trait;
use shared::Prediction;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Inference service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Expected {expected} scores, got {got}")]
    LabelMismatch { expected: usize, got: usize },
    #[error("Score for {0} is not a number")]
    InvalidScore(String),
}

/// Turns an image into one (label, confidence) pair per known finding.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &[u8], media_type: &str) -> Result<Vec<Prediction>, InferenceError>;
}

/// Pairs raw scores with labels, clamping each score into `[0, 1]`.
pub fn to_predictions(labels: &[String], scores: &[f64]) -> Result<Vec<Prediction>, InferenceError> {
    if labels.len() != scores.len() {
        return Err(InferenceError::LabelMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }

    labels
        .iter()
        .zip(scores)
        .map(|(label, &score)| {
            if score.is_finite() {
                Ok(Prediction::new(label.clone(), score.clamp(0.0, 1.0)))
            } else {
                Err(InferenceError::InvalidScore(label.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["Edema".into(), "Fracture".into()]
    }

    #[test]
    fn scores_are_zipped_with_labels() {
        let predictions = to_predictions(&labels(), &[0.25, 1.2]).unwrap();
        assert_eq!(predictions[0], Prediction::new("Edema", 0.25));
        assert_eq!(predictions[1], Prediction::new("Fracture", 1.0));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = to_predictions(&labels(), &[0.5]).unwrap_err();
        assert!(matches!(err, InferenceError::LabelMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn nan_scores_are_rejected() {
        let err = to_predictions(&labels(), &[f64::NAN, 0.1]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidScore(label) if label == "Edema"));
    }
}
