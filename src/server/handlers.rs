use super::multipart::read_upload_form;
use super::types::{ErrorResponse, GenerateResponse, GenerateTextRequest, HealthResponse};
use crate::{
    Error, Result,
    documents::DocumentExtractor,
    llm::{ModelClient, Part},
    uploads::{Upload, UploadStore, encode},
};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const TEXT_FAILURE: &str = "Failed to generate text";
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub uploads: UploadStore,
}

pub type HandlerResult = std::result::Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Sent to the model as base64 inline data next to the prompt.
    Inline,
    /// Converted to text and appended to the prompt.
    Document,
}

/// Wording and defaults for one file route.
#[derive(Debug)]
pub struct AttachmentRoute {
    pub field: &'static str,
    pub default_prompt: &'static str,
    pub failure: &'static str,
    pub kind: AttachmentKind,
}

pub const IMAGE_ROUTE: AttachmentRoute = AttachmentRoute {
    field: "image",
    default_prompt: "Describe the image",
    failure: "Failed to generate from image",
    kind: AttachmentKind::Inline,
};

pub const DOCUMENT_ROUTE: AttachmentRoute = AttachmentRoute {
    field: "document",
    default_prompt: "Analyze this document:",
    failure: "Failed to generate from document",
    kind: AttachmentKind::Document,
};

pub const AUDIO_ROUTE: AttachmentRoute = AttachmentRoute {
    field: "audio",
    default_prompt: "Transcribe this audio:",
    failure: "Failed to generate from audio",
    kind: AttachmentKind::Inline,
};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn generate_text(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateTextRequest>, JsonRejection>,
) -> HandlerResult {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected text request body: {}", rejection.body_text());
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: Error::MissingPrompt.to_string(),
                    details: Some(rejection.body_text()),
                }),
            ));
        }
    };

    let Some(prompt) = request.prompt.filter(|p| !p.is_empty()) else {
        return Err(reject(TEXT_FAILURE, Error::MissingPrompt));
    };

    info!("Received text generation request ({} chars)", prompt.len());

    match state.model.generate_content(vec![Part::Text(prompt)]).await {
        Ok(output) => Ok(Json(GenerateResponse { output })),
        Err(e) => Err(reject(TEXT_FAILURE, e)),
    }
}

pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_attachment(&state, &IMAGE_ROUTE, multipart).await
}

pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_attachment(&state, &DOCUMENT_ROUTE, multipart).await
}

pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    generate_from_attachment(&state, &AUDIO_ROUTE, multipart).await
}

async fn generate_from_attachment(
    state: &AppState,
    route: &AttachmentRoute,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    // A body that is not multipart at all carries no file.
    let multipart = multipart.map_err(|rejection| {
        warn!(
            "Rejected {} request without multipart body: {}",
            route.field,
            rejection.body_text()
        );
        reject(route.failure, Error::missing_attachment(route.field))
    })?;

    let form = read_upload_form(multipart, route.field, &state.uploads)
        .await
        .map_err(|e| reject(route.failure, e))?;

    let prompt = form
        .prompt
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| route.default_prompt.to_string());

    let Some(upload) = form.upload else {
        return Err(reject(route.failure, Error::missing_attachment(route.field)));
    };

    info!(
        "Received {} generation request ({}, prompt {} chars)",
        route.field,
        upload.mime_type(),
        prompt.len()
    );

    let result = generate_with_upload(state, route, prompt, &upload).await;
    upload.release().await;

    match result {
        Ok(output) => Ok(Json(GenerateResponse { output })),
        Err(e) => Err(reject(route.failure, e)),
    }
}

async fn generate_with_upload(
    state: &AppState,
    route: &AttachmentRoute,
    prompt: String,
    upload: &Upload,
) -> Result<String> {
    let parts = build_parts(state.extractor.as_ref(), route.kind, prompt, upload).await?;
    state.model.generate_content(parts).await
}

/// Assembles the model input for a staged attachment.
pub async fn build_parts(
    extractor: &dyn DocumentExtractor,
    kind: AttachmentKind,
    prompt: String,
    upload: &Upload,
) -> Result<Vec<Part>> {
    match kind {
        AttachmentKind::Inline => {
            let content = encode(upload).await?;
            Ok(vec![Part::Text(prompt), Part::InlineData(content)])
        }
        AttachmentKind::Document => {
            let text = extractor.extract(upload).await?;
            Ok(vec![Part::Text(document_prompt(&prompt, &text))])
        }
    }
}

pub fn document_prompt(prompt: &str, extracted_text: &str) -> String {
    format!("{}{}{}", prompt, DOCUMENT_SEPARATOR, extracted_text)
}

/// Converts an error into the JSON envelope: 400 for caller mistakes, 500 otherwise.
fn reject(failure: &str, err: Error) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_client_error() {
        warn!("Rejected request: {}", err);
        let body = match err {
            Error::Multipart(details) => ErrorResponse {
                error: "Invalid multipart request".to_string(),
                details: Some(details),
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        };
        return (StatusCode::BAD_REQUEST, Json(body));
    }

    error!("{}: {}", failure, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: failure.to_string(),
            details: Some(err.to_string()),
        }),
    )
}
