//! HTTP handlers for the FIR API

use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{FormRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    Form, Json,
};
use fir_auth::authenticate;

use crate::audit::AuditLogEntry;
use crate::auth::Actor;
use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Root informational message (open mode)
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Government PDF Conversion API. Use /upload and /generate endpoints."
            .to_string(),
    })
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "fir-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.mode,
    })
}

/// Exchange a username and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(form) = form?;
    let auth = state
        .auth
        .as_ref()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("login requires secured mode")))?;

    let username = form.username.ok_or(ApiError::MissingField("username"))?;
    let password = form.password.ok_or(ApiError::MissingField("password"))?;

    // Argon2 verification is CPU-bound
    let credentials = Arc::clone(&auth.credentials);
    let candidate = username.clone();
    let user = tokio::task::spawn_blocking(move || {
        authenticate(credentials.as_ref(), &candidate, &password)
    })
    .await?;

    let Some(user) = user else {
        tracing::info!(username = %username, "Rejected login");
        return Err(ApiError::BadCredentials);
    };

    let access_token = auth
        .tokens
        .issue(&user.username)
        .map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!(username = %user.username, "Issued access token");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Extract the text of an uploaded PDF
pub async fn upload(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = upload.ok_or(ApiError::MissingField("file"))?;

    let temp_dir = state.temp_dir.clone();
    let size = bytes.len();
    let extracted_text =
        tokio::task::spawn_blocking(move || fir_pdf::extract_upload(&bytes, &temp_dir)).await??;

    tracing::info!(
        user = actor.username().unwrap_or("-"),
        size,
        chars = extracted_text.len(),
        "Extracted text from upload"
    );

    state
        .record(&actor, "Uploaded PDF and extracted text")
        .await?;

    Ok(Json(UploadResponse { extracted_text }))
}

/// Render an FIR report and store it for download
pub async fn generate(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Form(form) = form?;
    let renderer = state.renderer;
    let form = form.into_fir_form(renderer.layout())?;

    let rendered = tokio::task::spawn_blocking(move || renderer.render(&form)).await??;
    let name = state.documents.save(&rendered.bytes).await?;

    tracing::info!(
        user = actor.username().unwrap_or("-"),
        name = %name,
        pages = rendered.page_count,
        lines = rendered.line_count,
        "Generated FIR"
    );

    state
        .record(&actor, &format!("Generated FIR PDF {}", name))
        .await?;

    Ok(Json(GenerateResponse {
        download_link: format!("/download/{}", name),
    }))
}

/// Stream a previously generated report
pub async fn download(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(filename): Path<String>,
) -> Result<(StatusCode, [(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    let bytes = state.documents.read(&filename).await?;

    state
        .record(&actor, &format!("Downloaded {}", filename))
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

/// Most recent audit rows for the caller (secured mode)
pub async fn audit_recent(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditLogEntry>>, ApiError> {
    let Query(query) = query?;
    let (Some(auth), Some(username)) = (&state.auth, actor.username()) else {
        return Err(ApiError::Unauthorized);
    };

    let entries = auth.audit.recent(username, query.effective_limit()).await?;

    state.record(&actor, "Viewed audit log").await?;

    Ok(Json(entries))
}
