use gloo_net::http::{Request, Response};
use js_sys::{Array, Uint8Array};
use serde::de::DeserializeOwned;
use shared::{
    decode_response, HistoryRecord, ImageSubmission, Messages, ReviewApi, SavePredictionsRequest,
    SaveResponse, TransportError, UploadResponse,
};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

/// Talks to the backend on the page's own origin.
#[derive(Clone, Default)]
pub struct ApiClient;

fn network(err: gloo_net::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

fn js_error(value: JsValue) -> TransportError {
    TransportError::Network(format!("{:?}", value))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;
    decode_response(status, &body)
}

fn upload_form(submission: &ImageSubmission) -> Result<FormData, TransportError> {
    let parts = Array::of1(&Uint8Array::from(submission.bytes()));
    let options = BlobPropertyBag::new();
    options.set_type(submission.media_type());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;

    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", &blob, submission.file_name())
        .map_err(js_error)?;
    Ok(form)
}

impl ApiClient {
    pub async fn fetch_messages(&self) -> Result<Messages, TransportError> {
        let response = Request::get("/api/messages").send().await.map_err(network)?;
        read_json(response).await
    }
}

impl ReviewApi for ApiClient {
    async fn upload(&self, submission: &ImageSubmission) -> Result<UploadResponse, TransportError> {
        let response = Request::post("/upload")
            .body(upload_form(submission)?)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn save_predictions(&self, body: &SavePredictionsRequest) -> Result<SaveResponse, TransportError> {
        let response = Request::post("/save_predictions")
            .json(body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, TransportError> {
        let response = Request::get("/api/history").send().await.map_err(network)?;
        read_json(response).await
    }
}
