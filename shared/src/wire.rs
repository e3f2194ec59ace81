use derive_more::{Display, From};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TransportError, WorkflowError};
use crate::prediction::Prediction;

/// Identifier of a stored image. Accepts JSON strings and integers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        ImageId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ImageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ImageIdVisitor;

        impl Visitor<'_> for ImageIdVisitor {
            type Value = ImageId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer image id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ImageId, E> {
                Ok(ImageId(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ImageId, E> {
                Ok(ImageId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ImageId, E> {
                Ok(ImageId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ImageId, E> {
                Ok(ImageId(v.to_string()))
            }
        }

        deserializer.deserialize_any(ImageIdVisitor)
    }
}

/// Body of `POST /upload` responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Prediction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A successful upload with every field the review needs.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPayload {
    pub predictions: Vec<Prediction>,
    pub report: String,
    pub image_id: ImageId,
}

impl UploadResponse {
    pub fn accepted(predictions: Vec<Prediction>, report: String, image_id: ImageId) -> Self {
        Self {
            success: true,
            predictions: Some(predictions),
            llm_report: Some(report),
            image_id: Some(image_id),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// `success: true` missing a payload field counts as a malformed response.
    pub fn into_payload(self) -> Result<UploadPayload, WorkflowError> {
        if !self.success {
            return Err(WorkflowError::Backend(self.message.unwrap_or_default()));
        }
        match (self.predictions, self.llm_report, self.image_id) {
            (Some(predictions), Some(report), Some(image_id)) if !image_id.is_blank() => {
                Ok(UploadPayload {
                    predictions,
                    report,
                    image_id,
                })
            }
            _ => Err(TransportError::Malformed {
                status: 200,
                detail: "successful upload without predictions, report or image id".into(),
            }
            .into()),
        }
    }
}

/// Body of `POST /save_predictions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePredictionsRequest {
    pub image_id: ImageId,
    #[serde(default)]
    pub confirmed_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_comment: Option<String>,
}

/// Response of `POST /save_predictions` and `POST /save_comment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<(), WorkflowError> {
        if self.success {
            Ok(())
        } else {
            Err(WorkflowError::Backend(self.message.unwrap_or_default()))
        }
    }
}

/// Body of `POST /save_comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCommentRequest {
    #[serde(default)]
    pub image_id: Option<ImageId>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLabel {
    pub disease_name: String,
    pub confidence: f64,
    pub is_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment: String,
    pub created_at: String,
}

/// A stored review as listed by `GET /api/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub image_id: ImageId,
    pub filename: String,
    pub created_at: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub llm_report: Option<String>,
    #[serde(default)]
    pub labels: Vec<HistoryLabel>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Decodes a JSON response body regardless of HTTP status.
///
/// The backend answers failures with `success: false` bodies on 4xx/5xx, so
/// the status only matters for diagnostics when the body is not JSON.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|err| TransportError::Malformed {
        status,
        detail: err.to_string(),
    })
}
