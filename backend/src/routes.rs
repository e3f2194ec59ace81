use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{error::InternalError, web, Error, HttpResponse};
use futures::TryStreamExt;
use log::{error, info, warn};
use serde::Deserialize;
use shared::{ImageId, SaveCommentRequest, SaveResponse, UploadResponse};

use crate::config::ServerMessages;
use crate::report::compose;
use crate::state::AppState;
use crate::store::StoreError;

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

enum FilePart {
    Missing,
    TooLarge(usize),
    Received(UploadedFile),
}

/// `image_id` is optional here so a missing id yields a 400 with a message
/// rather than a deserialization error.
#[derive(Deserialize)]
struct SavePredictionsBody {
    #[serde(default)]
    image_id: Option<ImageId>,
    #[serde(default)]
    confirmed_labels: Vec<String>,
    #[serde(default)]
    patient_name: Option<String>,
    #[serde(default)]
    doctor_comment: Option<String>,
}

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    messages: &ServerMessages,
    frontend_dir: Option<String>,
) {
    cfg.app_data(json_config(messages))
        .service(web::resource("/upload").route(web::post().to(upload)))
        .service(web::resource("/save_predictions").route(web::post().to(save_predictions)))
        .service(web::resource("/save_comment").route(web::post().to(save_comment)))
        .service(web::resource("/api/history").route(web::get().to(history)))
        .service(web::resource("/api/messages").route(web::get().to(client_messages)));

    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

/// Malformed JSON bodies are answered with a `{success: false}` body.
fn json_config(messages: &ServerMessages) -> web::JsonConfig {
    let message = messages.invalid_request.clone();
    web::JsonConfig::default().error_handler(move |err, _req| {
        warn!("Rejected JSON body: {}", err);
        let response = HttpResponse::BadRequest().json(SaveResponse::failed(message.clone()));
        InternalError::from_response(err, response).into()
    })
}

async fn read_file_field(
    payload: &mut Multipart,
    limit: usize,
) -> Result<FilePart, Error> {
    let mut file = None;

    while let Some(mut field) = payload.try_next().await? {
        let (name, filename) = match field.content_disposition() {
            Some(disposition) => (
                disposition.get_name().map(String::from),
                disposition.get_filename().map(String::from),
            ),
            None => (None, None),
        };

        if name.as_deref() != Some("file") || file.is_some() {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > limit {
                return Ok(FilePart::TooLarge(bytes.len() + chunk.len()));
            }
            bytes.extend_from_slice(&chunk);
        }

        file = Some(UploadedFile {
            filename: filename.unwrap_or_default(),
            bytes,
        });
    }

    Ok(file.map_or(FilePart::Missing, FilePart::Received))
}

async fn upload(state: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, Error> {
    let messages = &state.locale.server;

    let file = match read_file_field(&mut payload, state.max_upload_bytes).await? {
        FilePart::Received(file) if !file.filename.trim().is_empty() => file,
        FilePart::Received(_) | FilePart::Missing => {
            return Ok(HttpResponse::BadRequest().json(UploadResponse::rejected(&messages.no_file)));
        }
        FilePart::TooLarge(size) => {
            warn!("Upload of at least {} bytes exceeds the {} byte limit", size, state.max_upload_bytes);
            return Ok(HttpResponse::PayloadTooLarge()
                .json(UploadResponse::rejected(&messages.file_too_large)));
        }
    };

    let media_type = match image::guess_format(&file.bytes) {
        Ok(format) => format.to_mime_type(),
        Err(e) => {
            warn!("Rejected upload {}: {}", file.filename, e);
            return Ok(HttpResponse::BadRequest().json(UploadResponse::rejected(&messages.not_an_image)));
        }
    };

    let predictions = match state.classifier.classify(&file.bytes, media_type).await {
        Ok(predictions) => predictions,
        Err(e) => {
            error!("Inference failed for {}: {}", file.filename, e);
            return Ok(HttpResponse::InternalServerError()
                .json(UploadResponse::rejected(&messages.inference_failed)));
        }
    };

    let image_id = state
        .store
        .create(&file.filename, media_type, file.bytes, &predictions)
        .await;

    let report = compose(state.reports.as_ref(), &predictions, messages).await;
    if let Err(e) = state.store.set_report(&image_id, report.clone()).await {
        error!("Failed to attach report to {}: {}", image_id, e);
    }

    info!("Processed upload {} ({} predictions)", image_id, predictions.len());
    Ok(HttpResponse::Ok().json(UploadResponse::accepted(predictions, report, image_id)))
}

fn store_failure(err: StoreError, messages: &ServerMessages) -> HttpResponse {
    match err {
        StoreError::NotFound(id) => {
            warn!("Unknown image id {}", id);
            HttpResponse::NotFound().json(SaveResponse::failed(&messages.image_not_found))
        }
    }
}

async fn save_predictions(
    state: web::Data<AppState>,
    body: web::Json<SavePredictionsBody>,
) -> Result<HttpResponse, Error> {
    let messages = &state.locale.server;
    let body = body.into_inner();

    let image_id = match body.image_id {
        Some(id) if !id.is_blank() => id,
        _ => return Ok(HttpResponse::BadRequest().json(SaveResponse::failed(&messages.image_id_required))),
    };

    let result = state
        .store
        .confirm(
            &image_id,
            &body.confirmed_labels,
            body.patient_name.as_deref(),
            body.doctor_comment.as_deref(),
        )
        .await;

    Ok(match result {
        Ok(()) => HttpResponse::Ok().json(SaveResponse::ok(&messages.predictions_saved)),
        Err(e) => store_failure(e, messages),
    })
}

async fn save_comment(
    state: web::Data<AppState>,
    body: web::Json<SaveCommentRequest>,
) -> Result<HttpResponse, Error> {
    let messages = &state.locale.server;
    let body = body.into_inner();

    let (image_id, comment) = match (body.image_id, body.comment) {
        (Some(id), Some(comment)) if !id.is_blank() && !comment.trim().is_empty() => (id, comment),
        _ => return Ok(HttpResponse::BadRequest().json(SaveResponse::failed(&messages.comment_required))),
    };

    Ok(match state.store.add_comment(&image_id, comment.trim()).await {
        Ok(()) => HttpResponse::Ok().json(SaveResponse::ok(&messages.comment_saved)),
        Err(e) => store_failure(e, messages),
    })
}

async fn history(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.store.history().await)
}

async fn client_messages(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.locale.client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::inference::{Classifier, InferenceError};
    use crate::report::{ReportError, ReportGenerator};
    use crate::store::ReviewStore;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use shared::{HistoryRecord, Messages, Prediction};
    use std::sync::Arc;

    const BOUNDARY: &str = "----reviewboundary";
    const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    struct FixedClassifier(Option<Vec<Prediction>>);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _image: &[u8], _media_type: &str) -> Result<Vec<Prediction>, InferenceError> {
            self.0.clone().ok_or(InferenceError::Status {
                status: 503,
                body: "model offline".into(),
            })
        }
    }

    struct FixedReport;

    #[async_trait]
    impl ReportGenerator for FixedReport {
        async fn generate(&self, _prompt: &str) -> Result<String, ReportError> {
            Ok("Bulgular\nKardiyomegali.".to_string())
        }
    }

    fn predictions() -> Vec<Prediction> {
        vec![
            Prediction::new("Cardiomegaly", 0.82),
            Prediction::new("Edema", 0.31),
            Prediction::new("Fracture", 0.04),
        ]
    }

    fn state(classifier: FixedClassifier, max_upload_bytes: usize) -> AppState {
        AppState {
            store: ReviewStore::new(),
            classifier: Arc::new(classifier),
            reports: Arc::new(FixedReport),
            locale: Arc::new(Locale::default()),
            max_upload_bytes,
        }
    }

    fn multipart(field: &str, filename: &str, content: &[u8]) -> (String, Vec<u8>) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }

    fn upload_request(field: &str, filename: &str, content: &[u8]) -> test::TestRequest {
        let (content_type, body) = multipart(field, filename, content);
        test::TestRequest::post()
            .uri("/upload")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(|cfg| configure_routes(cfg, &ServerMessages::default(), None)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn upload_classifies_stores_and_reports() {
        let state = state(FixedClassifier(Some(predictions())), 1024);
        let store = state.store.clone();
        let app = app!(state);

        let resp = test::call_service(&app, upload_request("file", "chest.png", &PNG).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: UploadResponse = test::read_body_json(resp).await;
        let payload = body.into_payload().unwrap();
        assert_eq!(payload.predictions, predictions());
        assert_eq!(payload.report, "Bulgular\nKardiyomegali.");

        let record = store.get(&payload.image_id).await.unwrap();
        assert_eq!(record.filename, "chest.png");
        assert_eq!(record.media_type, "image/png");
        assert_eq!(record.llm_report.as_deref(), Some("Bulgular\nKardiyomegali."));
    }

    #[actix_web::test]
    async fn upload_rejects_non_images() {
        let app = app!(state(FixedClassifier(Some(predictions())), 1024));
        let resp = test::call_service(&app, upload_request("file", "notes.txt", b"plain text").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: UploadResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.message, Some(ServerMessages::default().not_an_image));
    }

    #[actix_web::test]
    async fn upload_without_file_field_is_rejected() {
        let app = app!(state(FixedClassifier(Some(predictions())), 1024));
        let resp = test::call_service(&app, upload_request("other", "chest.png", &PNG).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, Some(ServerMessages::default().no_file));
    }

    #[actix_web::test]
    async fn upload_over_limit_is_rejected() {
        let app = app!(state(FixedClassifier(Some(predictions())), 4));
        let resp = test::call_service(&app, upload_request("file", "chest.png", &PNG).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, Some(ServerMessages::default().file_too_large));
    }

    #[actix_web::test]
    async fn inference_failure_hides_detail_and_stores_nothing() {
        let state = state(FixedClassifier(None), 1024);
        let store = state.store.clone();
        let app = app!(state);

        let resp = test::call_service(&app, upload_request("file", "chest.png", &PNG).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, Some(ServerMessages::default().inference_failed));
        assert!(store.history().await.is_empty());
    }

    #[actix_web::test]
    async fn save_predictions_validates_and_persists() {
        let state = state(FixedClassifier(Some(predictions())), 1024);
        let store = state.store.clone();
        let image_id = store.create("a.png", "image/png", PNG.to_vec(), &predictions()).await;
        let app = app!(state);

        let missing = test::TestRequest::post()
            .uri("/save_predictions")
            .set_json(serde_json::json!({"confirmed_labels": ["Edema"]}))
            .to_request();
        let resp = test::call_service(&app, missing).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let unknown = test::TestRequest::post()
            .uri("/save_predictions")
            .set_json(serde_json::json!({"image_id": 7, "confirmed_labels": []}))
            .to_request();
        let resp = test::call_service(&app, unknown).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: SaveResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, Some(ServerMessages::default().image_not_found));

        let ok = test::TestRequest::post()
            .uri("/save_predictions")
            .set_json(serde_json::json!({
                "image_id": image_id.as_str(),
                "confirmed_labels": ["Edema"],
                "patient_name": "Mehmet",
            }))
            .to_request();
        let resp = test::call_service(&app, ok).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: SaveResponse = test::read_body_json(resp).await;
        assert!(body.into_result().is_ok());

        let record = store.get(&image_id).await.unwrap();
        assert_eq!(record.patient_name.as_deref(), Some("Mehmet"));
        assert!(record.labels.iter().any(|l| l.disease_name == "Edema" && l.is_confirmed));
    }

    #[actix_web::test]
    async fn malformed_json_gets_failure_body() {
        let app = app!(state(FixedClassifier(Some(predictions())), 1024));
        let req = test::TestRequest::post()
            .uri("/save_predictions")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: SaveResponse = test::read_body_json(resp).await;
        assert_eq!(body, SaveResponse::failed(ServerMessages::default().invalid_request));
    }

    #[actix_web::test]
    async fn comments_require_text_and_appear_in_history() {
        let state = state(FixedClassifier(Some(predictions())), 1024);
        let image_id = state
            .store
            .create("a.png", "image/png", PNG.to_vec(), &predictions())
            .await;
        let app = app!(state);

        let blank = test::TestRequest::post()
            .uri("/save_comment")
            .set_json(serde_json::json!({"image_id": image_id.as_str(), "comment": "  "}))
            .to_request();
        assert_eq!(test::call_service(&app, blank).await.status(), StatusCode::BAD_REQUEST);

        let ok = test::TestRequest::post()
            .uri("/save_comment")
            .set_json(serde_json::json!({"image_id": image_id.as_str(), "comment": "Kontrol grafisi"}))
            .to_request();
        assert_eq!(test::call_service(&app, ok).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let records: Vec<HistoryRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comments[0].comment, "Kontrol grafisi");
    }

    #[actix_web::test]
    async fn client_messages_are_served() {
        let app = app!(state(FixedClassifier(Some(predictions())), 1024));
        let req = test::TestRequest::get().uri("/api/messages").to_request();
        let messages: Messages = test::call_and_read_body_json(&app, req).await;
        assert_eq!(messages, Messages::default());
    }
}
