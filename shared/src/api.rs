use crate::error::TransportError;
use crate::upload::ImageSubmission;
use crate::wire::{HistoryRecord, SavePredictionsRequest, SaveResponse, UploadResponse};
use crate::workflow::{Msg, Request};

/// Backend endpoints consumed by the review client.
///
/// Implementations only move bytes: `success: false` bodies are returned as
/// `Ok` and interpreted by the workflow.
#[allow(async_fn_in_trait)]
pub trait ReviewApi {
    /// `POST /upload` with the image as multipart field `file`.
    async fn upload(&self, submission: &ImageSubmission) -> Result<UploadResponse, TransportError>;

    /// `POST /save_predictions`.
    async fn save_predictions(&self, body: &SavePredictionsRequest) -> Result<SaveResponse, TransportError>;

    /// `GET /api/history`.
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, TransportError>;
}

/// Performs `request` and wraps the outcome in the reply message.
pub async fn execute<A: ReviewApi>(api: &A, request: Request) -> Msg {
    match request {
        Request::Upload { ticket, submission } => Msg::UploadFinished {
            ticket,
            result: api.upload(&submission).await,
        },
        Request::SavePredictions { ticket, body } => Msg::SaveFinished {
            ticket,
            result: api.save_predictions(&body).await,
        },
        Request::SaveHistory { ticket, body } => {
            let result = api.save_predictions(&body).await;
            Msg::HistorySaveFinished {
                image_id: body.image_id,
                ticket,
                result,
            }
        }
        Request::FetchHistory { ticket } => Msg::HistoryFetched {
            ticket,
            result: api.fetch_history().await,
        },
    }
}
