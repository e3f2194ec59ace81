use chrono::Utc;
use shared::{HistoryRecord, ImageId, Prediction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{DoctorComment, ReviewRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record {0} not found")]
    NotFound(String),
}

pub const DEFAULT_CAPACITY: usize = 500;

/// In-memory review records keyed by image id.
///
/// Not durable: records vanish on restart, and once `capacity` is reached the
/// oldest record is evicted to make room. `history` encodes every stored
/// image on each call, so the capacity also bounds that response.
#[derive(Clone)]
pub struct ReviewStore {
    records: Arc<RwLock<HashMap<Uuid, ReviewRecord>>>,
    capacity: usize,
}

impl Default for ReviewStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn parse_id(image_id: &ImageId) -> Result<Uuid, StoreError> {
    Uuid::parse_str(image_id.as_str().trim()).map_err(|_| StoreError::NotFound(image_id.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Keeps the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub async fn create(
        &self,
        filename: &str,
        media_type: &str,
        image: Vec<u8>,
        predictions: &[Prediction],
    ) -> ImageId {
        let record = ReviewRecord::new(
            sanitize_filename(filename),
            media_type.to_string(),
            image,
            predictions,
        );
        let image_id = record.image_id();
        let mut records = self.records.write().await;
        while records.len() >= self.capacity {
            let Some(oldest) = records
                .values()
                .min_by_key(|record| record.created_at)
                .map(|record| record.id)
            else {
                break;
            };
            records.remove(&oldest);
            log::warn!("Store at capacity {}, evicted review record {}", self.capacity, oldest);
        }
        records.insert(record.id, record);
        log::info!("Stored review record {}", image_id);
        image_id
    }

    pub async fn set_report(&self, image_id: &ImageId, report: String) -> Result<(), StoreError> {
        let id = parse_id(image_id)?;
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(image_id.to_string()))?;
        record.llm_report = Some(report);
        Ok(())
    }

    /// Replaces the confirmed flags of every label. Labels not named in
    /// `confirmed` become unconfirmed; unknown names are ignored.
    pub async fn confirm(
        &self,
        image_id: &ImageId,
        confirmed: &[String],
        patient_name: Option<&str>,
        doctor_comment: Option<&str>,
    ) -> Result<(), StoreError> {
        let id = parse_id(image_id)?;
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(image_id.to_string()))?;

        for label in &mut record.labels {
            label.is_confirmed = confirmed.iter().any(|name| *name == label.disease_name);
        }
        if let Some(name) = non_blank(patient_name) {
            record.patient_name = Some(name.to_string());
        }
        if let Some(comment) = non_blank(doctor_comment) {
            record.comments.push(DoctorComment {
                comment: comment.to_string(),
                created_at: Utc::now(),
            });
        }
        log::info!(
            "Confirmed {} label(s) for {}",
            record.labels.iter().filter(|label| label.is_confirmed).count(),
            image_id
        );
        Ok(())
    }

    pub async fn add_comment(&self, image_id: &ImageId, comment: &str) -> Result<(), StoreError> {
        let id = parse_id(image_id)?;
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(image_id.to_string()))?;
        record.comments.push(DoctorComment {
            comment: comment.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    /// All records, newest first.
    pub async fn history(&self) -> Vec<HistoryRecord> {
        let records = self.records.read().await;
        let mut ordered: Vec<&ReviewRecord> = records.values().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ordered.into_iter().map(ReviewRecord::to_history).collect()
    }

    pub async fn get(&self, image_id: &ImageId) -> Result<ReviewRecord, StoreError> {
        let id = parse_id(image_id)?;
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(image_id.to_string()))
    }
}
