//! Page session API handlers.
//!
//! Each handler turns a request into one [`UiEvent`] for the session and
//! answers with the page snapshot that results.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::controller::{GenerationController, UiEvent};
use crate::logo::LogoFile;
use crate::page::PageSnapshot;
use crate::shortcuts::KeyChord;
use crate::style;

use super::super::session::{SessionClosed, SessionHandle};
use super::super::state::{AppState, Session};

type ApiError = (StatusCode, String);

impl From<SessionClosed> for (StatusCode, String) {
    fn from(_: SessionClosed) -> Self {
        (StatusCode::GONE, "Session closed".to_string())
    }
}

/// Response from the create endpoint.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub page: PageSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StyleRequest {
    pub style: String,
}

/// Look up a session and mark it used.
async fn session(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    let session_id = Uuid::parse_str(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()))?;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or((StatusCode::NOT_FOUND, "Session not found or expired".to_string()))?;
    session.touch();
    Ok(session.handle.clone())
}

async fn dispatch(
    state: &AppState,
    id: &str,
    event: UiEvent,
) -> Result<Json<PageSnapshot>, ApiError> {
    let handle = session(state, id).await?;
    Ok(Json(handle.dispatch(event).await?))
}

/// POST /api/sessions - Open a new page.
pub async fn create(State(state): State<Arc<AppState>>) -> Result<Json<CreatedResponse>, ApiError> {
    let config = state.config.generator.clone();
    let controller = tokio::task::spawn_blocking(move || GenerationController::with_raster(config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Processing error: {}", e)))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let handle = SessionHandle::spawn(controller);
    let page = handle.snapshot().await?;

    let id = Uuid::new_v4();
    state.sessions.write().await.insert(id, Session::new(handle));
    info!(session = %id, "session opened");

    Ok(Json(CreatedResponse {
        id: id.to_string(),
        page,
    }))
}

/// GET /api/sessions/:id - Current page.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageSnapshot>, ApiError> {
    let handle = session(&state, &id).await?;
    Ok(Json(handle.snapshot().await?))
}

/// POST /api/sessions/:id/text - The text field changed.
pub async fn text(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TextRequest>,
) -> Result<Json<PageSnapshot>, ApiError> {
    dispatch(&state, &id, UiEvent::TextInput(req.text)).await
}

/// POST /api/sessions/:id/style - A style button was clicked.
pub async fn select_style(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<StyleRequest>,
) -> Result<Json<PageSnapshot>, ApiError> {
    if !style::is_known(&req.style) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unknown style '{}'", req.style),
        ));
    }
    dispatch(&state, &id, UiEvent::StyleSelected(req.style)).await
}

/// POST /api/sessions/:id/logo - A logo file was picked.
///
/// Expects a multipart field named `logo`. The MIME type falls back to a
/// guess from the file name when the part carries none.
pub async fn logo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<PageSnapshot>, ApiError> {
    let mut file: Option<LogoFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("logo") {
            continue;
        }
        let name = field.file_name().unwrap_or("unknown").to_string();
        let mime = match field.content_type() {
            Some(mime) if mime != "application/octet-stream" => mime.to_string(),
            _ => mime_guess::from_path(&name).first_or_octet_stream().to_string(),
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read logo: {}", e)))?;
        file = Some(LogoFile::new(name, mime, bytes.to_vec()));
        break;
    }

    let file = file.ok_or((StatusCode::BAD_REQUEST, "No logo field found".to_string()))?;
    dispatch(&state, &id, UiEvent::LogoSelected(file)).await
}

/// POST /api/sessions/:id/generate - The generate button was clicked.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageSnapshot>, ApiError> {
    dispatch(&state, &id, UiEvent::GenerateClicked).await
}

/// POST /api/sessions/:id/key - A key was pressed on the page.
pub async fn key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(chord): Json<KeyChord>,
) -> Result<Json<PageSnapshot>, ApiError> {
    dispatch(&state, &id, UiEvent::KeyDown(chord)).await
}

/// GET /api/sessions/:id/preview - The mounted render as PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let handle = session(&state, &id).await?;
    let file = handle
        .preview()
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Nothing rendered yet".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.mime),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        file.bytes,
    )
        .into_response())
}

/// POST /api/sessions/:id/download - The download button was clicked.
///
/// Answers with the exported file, or with the page (status 409) when
/// nothing was exported.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let handle = session(&state, &id).await?;

    match handle.download().await? {
        (_, Some(file)) => Ok((
            [
                (header::CONTENT_TYPE, file.mime),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ),
            ],
            file.bytes,
        )
            .into_response()),
        (page, None) => Ok((StatusCode::CONFLICT, Json(page)).into_response()),
    }
}
