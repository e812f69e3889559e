//! Error types for the FIR API

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, QueryRejection},
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use fir_pdf::PdfError;
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Incorrect username or password")]
    BadCredentials,

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid file name")]
    InvalidFileName,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("File not found")]
    FileNotFound,

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName => ApiError::InvalidFileName,
            StorageError::NotFound => ApiError::FileNotFound,
            StorageError::Io(e) => ApiError::Internal(e.into()),
        }
    }
}

impl ApiError {
    /// Map an axum body or extractor rejection onto our error body
    fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            ApiError::UnsupportedMediaType(message)
        } else {
            ApiError::InvalidRequest(message)
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let message = match std::error::Error::source(&err) {
            Some(cause) => format!("Invalid multipart body: {}", cause),
            None => format!("Invalid multipart body: {}", err),
        };
        Self::from_rejection(err.status(), message)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::InactiveUser | ApiError::BadCredentials => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::MissingField(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidFileName => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone())
            }
            ApiError::FileNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Pdf(PdfError::Parse(e)) => {
                tracing::warn!("Rejected unparseable PDF: {}", e);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Could not parse PDF".to_string(),
                )
            }
            ApiError::Pdf(e) => {
                tracing::error!("PDF error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "PDF error".to_string())
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        let mut response = (status, body).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
