use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Above this confidence a prediction is `high` and pre-selected.
pub const HIGH_THRESHOLD: f64 = 0.5;
/// Above this confidence (and up to `HIGH_THRESHOLD`) a prediction is `medium`.
pub const MEDIUM_THRESHOLD: f64 = 0.2;

/// A single (label, confidence) pair produced by the inference backend.
///
/// On the wire a prediction is the two-element array `[label, confidence]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::of(self.confidence)
    }
}

impl From<(String, f64)> for Prediction {
    fn from((label, confidence): (String, f64)) -> Self {
        Self { label, confidence }
    }
}

impl From<Prediction> for (String, f64) {
    fn from(prediction: Prediction) -> Self {
        (prediction.label, prediction.confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Each tier is closed on its upper bound: 0.5 is `Medium`, 0.2 is `Low`.
    pub fn of(confidence: f64) -> Self {
        if confidence > HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if confidence > MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Triage policy: only `High` predictions start out confirmed.
pub fn is_default_selected(confidence: f64) -> bool {
    ConfidenceTier::of(confidence) == ConfidenceTier::High
}

/// Labels of the given tier, in input order.
pub fn labels_in_tier(predictions: &[Prediction], tier: ConfidenceTier) -> Vec<&str> {
    predictions
        .iter()
        .filter(|p| p.tier() == tier)
        .map(|p| p.label.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(ConfidenceTier::of(0.5), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::of(0.2), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::of(0.50001), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::of(0.20001), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::of(0.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::of(1.0), ConfidenceTier::High);
    }

    #[test]
    fn default_selection_follows_high_tier() {
        assert!(is_default_selected(0.6));
        assert!(!is_default_selected(0.5));
        assert!(!is_default_selected(0.1));
    }

    #[test]
    fn tier_names_are_lowercase() {
        assert_eq!(ConfidenceTier::High.to_string(), "high");
        assert_eq!(ConfidenceTier::Medium.as_ref(), "medium");
        assert_eq!("low".parse::<ConfidenceTier>().unwrap(), ConfidenceTier::Low);
    }

    #[test]
    fn prediction_reads_array_form() {
        let p: Prediction = serde_json::from_str(r#"["Edema", 0.3]"#).unwrap();
        assert_eq!(p, Prediction::new("Edema", 0.3));
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"["Edema",0.3]"#);
    }

    #[test]
    fn labels_in_tier_keeps_input_order() {
        let predictions = vec![
            Prediction::new("B", 0.9),
            Prediction::new("A", 0.3),
            Prediction::new("C", 0.7),
        ];
        assert_eq!(labels_in_tier(&predictions, ConfidenceTier::High), vec!["B", "C"]);
        assert_eq!(labels_in_tier(&predictions, ConfidenceTier::Medium), vec!["A"]);
        assert!(labels_in_tier(&predictions, ConfidenceTier::Low).is_empty());
    }
}
