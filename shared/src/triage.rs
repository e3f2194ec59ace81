use std::collections::HashSet;

use crate::prediction::{is_default_selected, ConfidenceTier, Prediction};

/// Stable identity of a label, independent of render order.
///
/// Whitespace runs collapse to a single `_`, so `"Pleural  Effusion"` and
/// `"Pleural Effusion"` share the key `Pleural_Effusion`.
pub fn item_key(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("_")
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageItem {
    pub key: String,
    pub label: String,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub selected: bool,
}

impl TriageItem {
    fn from_prediction(prediction: Prediction) -> Self {
        Self {
            key: item_key(&prediction.label),
            tier: prediction.tier(),
            selected: is_default_selected(prediction.confidence),
            label: prediction.label,
            confidence: prediction.confidence,
        }
    }

    /// Confidence as a percentage with one decimal, e.g. `72.0`.
    pub fn percentage(&self) -> String {
        format!("{:.1}", self.confidence * 100.0)
    }
}

/// Selectable predictions in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriageList {
    items: Vec<TriageItem>,
}

impl TriageList {
    /// Orders by confidence descending (ties keep input order), classifies
    /// each prediction and pre-selects the `high` tier.
    ///
    /// A label repeated within one set keeps its first occurrence.
    pub fn render(predictions: Vec<Prediction>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            if seen.insert(item_key(&prediction.label)) {
                unique.push(prediction);
            } else {
                log::warn!("Dropping duplicate prediction label: {}", prediction.label);
            }
        }

        // sort_by is stable
        unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Self {
            items: unique.into_iter().map(TriageItem::from_prediction).collect(),
        }
    }

    pub fn items(&self) -> &[TriageItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TriageItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.get(key).is_some_and(|item| item.selected)
    }

    /// Returns `false` when no item has that key.
    pub fn set_selected(&mut self, key: &str, selected: bool) -> bool {
        match self.items.iter_mut().find(|item| item.key == key) {
            Some(item) => {
                item.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Selected labels, in display order.
    pub fn selected_labels(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.label.clone())
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(pairs: &[(&str, f64)]) -> Vec<Prediction> {
        pairs.iter().map(|(l, c)| Prediction::new(*l, *c)).collect()
    }

    #[test]
    fn only_high_tier_is_preselected() {
        let list = TriageList::render(preds(&[("A", 0.6), ("B", 0.5), ("C", 0.1)]));
        assert_eq!(list.selected_labels(), vec!["A".to_string()]);
        assert_eq!(list.get("B").unwrap().tier, ConfidenceTier::Medium);
        assert_eq!(list.get("C").unwrap().tier, ConfidenceTier::Low);
    }

    #[test]
    fn ties_keep_input_order() {
        let list = TriageList::render(preds(&[("A", 0.3), ("B", 0.3), ("C", 0.9)]));
        assert_eq!(list.labels(), vec!["C", "A", "B"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let input = preds(&[("X", 0.1), ("Y", 0.1), ("Z", 0.1), ("W", 0.4)]);
        let first = TriageList::render(input.clone());
        let second = TriageList::render(input);
        assert_eq!(first, second);
        assert_eq!(first.labels(), vec!["W", "X", "Y", "Z"]);
    }

    #[test]
    fn key_normalizes_whitespace() {
        assert_eq!(item_key("Pleural Effusion"), "Pleural_Effusion");
        assert_eq!(item_key("Enlarged  Cardio\tmediastinum"), "Enlarged_Cardio_mediastinum");
        assert_eq!(item_key("Edema"), "Edema");
    }

    #[test]
    fn selection_is_addressed_by_key() {
        let mut list = TriageList::render(preds(&[("Lung Opacity", 0.1), ("Edema", 0.8)]));
        assert!(!list.is_selected("Lung_Opacity"));
        assert!(list.set_selected("Lung_Opacity", true));
        assert!(list.is_selected("Lung_Opacity"));
        assert!(!list.set_selected("Missing", true));
        assert_eq!(list.selected_labels(), vec!["Edema".to_string(), "Lung Opacity".to_string()]);
    }

    #[test]
    fn duplicate_labels_keep_first_occurrence() {
        let list = TriageList::render(preds(&[("A", 0.1), ("B", 0.4), ("A", 0.9)]));
        assert_eq!(list.labels(), vec!["B", "A"]);
        assert_eq!(list.get("A").unwrap().confidence, 0.1);
    }

    #[test]
    fn percentage_has_one_decimal() {
        let list = TriageList::render(preds(&[("Pneumonia", 0.72), ("Edema", 0.3456)]));
        assert_eq!(list.items()[0].percentage(), "72.0");
        assert_eq!(list.items()[1].percentage(), "34.6");
    }
}
