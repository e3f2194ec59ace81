use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use shared::{CommentRecord, HistoryLabel, HistoryRecord, ImageId, Prediction};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredLabel {
    pub disease_name: String,
    pub confidence: f64,
    pub is_confirmed: bool,
}

impl From<&Prediction> for StoredLabel {
    fn from(prediction: &Prediction) -> Self {
        Self {
            disease_name: prediction.label.clone(),
            confidence: prediction.confidence,
            is_confirmed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorComment {
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// One uploaded image together with its predictions and clinician input.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub filename: String,
    pub media_type: String,
    pub image: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub llm_report: Option<String>,
    pub labels: Vec<StoredLabel>,
    pub comments: Vec<DoctorComment>,
}

impl ReviewRecord {
    pub fn new(filename: String, media_type: String, image: Vec<u8>, predictions: &[Prediction]) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            media_type,
            image,
            created_at: Utc::now(),
            patient_name: None,
            llm_report: None,
            labels: predictions.iter().map(StoredLabel::from).collect(),
            comments: Vec::new(),
        }
    }

    pub fn image_id(&self) -> ImageId {
        ImageId::from(self.id.to_string())
    }

    pub fn to_history(&self) -> HistoryRecord {
        HistoryRecord {
            image_id: self.image_id(),
            filename: self.filename.clone(),
            created_at: timestamp(&self.created_at),
            patient_name: self.patient_name.clone(),
            llm_report: self.llm_report.clone(),
            labels: self
                .labels
                .iter()
                .map(|label| HistoryLabel {
                    disease_name: label.disease_name.clone(),
                    confidence: label.confidence,
                    is_confirmed: label.is_confirmed,
                })
                .collect(),
            comments: self
                .comments
                .iter()
                .map(|comment| CommentRecord {
                    comment: comment.comment.clone(),
                    created_at: timestamp(&comment.created_at),
                })
                .collect(),
            media_type: Some(self.media_type.clone()),
            image_base64: Some(STANDARD.encode(&self.image)),
        }
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
