use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{TranscribeResponse, TranslateResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
struct TranslateForm {
    text: String,
}

/// Full application: routes, state and middleware.
pub fn build_app(state: AppState) -> Router {
    let max_upload_bytes = state.config.system_config.max_upload_bytes;

    Router::new()
        .merge(create_routes(&state))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Mirrors the caller's origin so credentials stay allowed.
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let system_config = &state.config.system_config;
    let index_page = Path::new(&system_config.templates_dir).join("index.html");

    Router::new()
        // Landing page
        .route_service("/", ServeFile::new(index_page))

        // Health check
        .route("/api/health", get(health_check))

        .route("/transcribe", post(transcribe_audio))
        .route("/translate", post(translate_text))

        // Static file serving
        .nest_service("/static", ServeDir::new(&system_config.static_dir))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn validation_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    let message = message.into();
    warn!("Rejected request: {}", message);
    (status, Json(json!({ "error": message })))
}

fn missing_field(name: &str) -> ApiError {
    validation_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("missing form field: {}", name),
    )
}

async fn transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(|name| name.to_string());
        let response = match field.bytes().await {
            Ok(data) => {
                state
                    .transcription
                    .handle_transcribe(data.to_vec(), filename)
                    .await
            }
            // Reading the upload is part of the handler's own failure surface.
            Err(e) => TranscribeResponse::failed(e.body_text()),
        };
        return Ok(Json(response));
    }

    Err(missing_field("file"))
}

async fn translate_text(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = read_text_field(request, &state).await?;
    Ok(Json(state.translation.handle_translate(&text).await))
}

/// Accepts `text` from either a urlencoded or a multipart form body.
async fn read_text_field(request: Request, state: &AppState) -> Result<String, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let Form(form) = Form::<TranslateForm>::from_request(request, state)
            .await
            .map_err(|e| validation_error(e.status(), e.body_text()))?;
        return Ok(form.text);
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| validation_error(e.status(), e.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error(e.status(), e.body_text()))?
    {
        if field.name() == Some("text") {
            return field
                .text()
                .await
                .map_err(|e| validation_error(e.status(), e.body_text()));
        }
    }
    Err(missing_field("text"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::UpstreamError;
    use crate::handlers::fakes::{FakeASR, FakeTranslator};
    use axum::http::HeaderValue;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::sync::Arc;

    struct Harness {
        server: TestServer,
        asr: Arc<FakeASR>,
        translator: Arc<FakeTranslator>,
        _templates: tempfile::TempDir,
    }

    fn harness(
        asr_result: Result<String, UpstreamError>,
        translate_result: Result<String, UpstreamError>,
    ) -> Harness {
        let templates = tempfile::tempdir().unwrap();
        std::fs::write(
            templates.path().join("index.html"),
            "<html><body>Speech translator</body></html>",
        )
        .unwrap();

        let mut config = Config::default();
        config.system_config.templates_dir = templates.path().to_string_lossy().into_owned();

        let asr = Arc::new(FakeASR::returning(asr_result));
        let translator = Arc::new(FakeTranslator::returning(translate_result));
        let state = AppState::with_clients(config, asr.clone(), translator.clone());

        Harness {
            server: TestServer::new(build_app(state)).unwrap(),
            asr,
            translator,
            _templates: templates,
        }
    }

    fn audio_form(len: usize, file_name: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0u8; len])
                .file_name(file_name)
                .mime_type("audio/webm"),
        )
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let h = harness(Ok(String::new()), Ok(String::new()));

        let response = h.server.get("/").await;

        response.assert_status_ok();
        assert!(response.text().contains("Speech translator"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let h = harness(Ok(String::new()), Ok(String::new()));

        let json: Value = h.server.get("/api/health").await.json();

        assert_eq!(json, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_transcribe_short_upload_returns_200_with_error() {
        let h = harness(Ok("unused".to_string()), Ok(String::new()));

        let response = h
            .server
            .post("/transcribe")
            .multipart(audio_form(1999, "clip.webm"))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"text": "", "error": "音訊太短，無法辨識"}));
        assert_eq!(h.asr.calls(), 0);
    }

    #[tokio::test]
    async fn test_transcribe_success_passes_file_name_through() {
        let h = harness(Ok("Testing one two three.".to_string()), Ok(String::new()));

        let response = h
            .server
            .post("/transcribe")
            .multipart(audio_form(8000, "note.ogg"))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"text": "Testing one two three."}));
        let (clip, _) = h.asr.last_clip.lock().unwrap().clone().unwrap();
        assert_eq!(clip.file_name, "note.ogg");
        assert_eq!(clip.len(), 8000);
    }

    #[tokio::test]
    async fn test_transcribe_remote_failure_is_200_with_error() {
        let h = harness(
            Err(UpstreamError::Unavailable("timed out".to_string())),
            Ok(String::new()),
        );

        let response = h
            .server
            .post("/transcribe")
            .multipart(audio_form(8000, "note.webm"))
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["text"], "");
        assert!(json["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_transcribe_without_file_field_is_422() {
        let h = harness(Ok(String::new()), Ok(String::new()));

        let response = h
            .server
            .post("/transcribe")
            .multipart(MultipartForm::new().add_text("other", "value"))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(h.asr.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_urlencoded_form() {
        let h = harness(Ok(String::new()), Ok("  你好  ".to_string()));

        let response = h
            .server
            .post("/translate")
            .form(&[("text", "Hello")])
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"translation": "你好"}));
        assert_eq!(h.translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_translate_multipart_form() {
        let h = harness(Ok(String::new()), Ok("早安".to_string()));

        let response = h
            .server
            .post("/translate")
            .multipart(MultipartForm::new().add_text("text", "Good morning"))
            .await;

        response.assert_json(&json!({"translation": "早安"}));
    }

    #[tokio::test]
    async fn test_translate_multipart_content_type_is_case_insensitive() {
        let h = harness(Ok(String::new()), Ok("謝謝".to_string()));
        let boundary = "XyZtranslateBoundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nThank you\r\n--{b}--\r\n",
            b = boundary
        );

        let response = h
            .server
            .post("/translate")
            .content_type(&format!("Multipart/Form-Data; boundary={}", boundary))
            .bytes(body.into_bytes().into())
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"translation": "謝謝"}));
        assert_eq!(h.translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_translate_blank_text_returns_placeholder() {
        let h = harness(Ok(String::new()), Ok("unused".to_string()));

        let response = h
            .server
            .post("/translate")
            .form(&[("text", "   ")])
            .await;

        response.assert_json(&json!({"translation": "[無法辨識語音內容]"}));
        assert_eq!(h.translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_failure_is_200_with_tagged_translation() {
        let h = harness(
            Ok(String::new()),
            Err(UpstreamError::Rejected {
                status: 401,
                message: "bad key".to_string(),
            }),
        );

        let response = h
            .server
            .post("/translate")
            .form(&[("text", "Hello")])
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        let translation = json["translation"].as_str().unwrap();
        assert!(translation.starts_with("[翻譯失敗："));
        assert!(translation.contains("bad key"));
    }

    #[tokio::test]
    async fn test_translate_without_text_field_is_422() {
        let h = harness(Ok(String::new()), Ok(String::new()));

        let response = h
            .server
            .post("/translate")
            .form(&[("other", "value")])
            .expect_failure()
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(h.translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_cors_mirrors_origin_with_credentials() {
        let h = harness(Ok(String::new()), Ok(String::new()));

        let response = h
            .server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .await;

        response.assert_status_ok();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&HeaderValue::from_static("true"))
        );
    }
}
