use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ml_client::MlError;
use crate::state::AppState;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `NotFound` covers both "does not exist" and "belongs to someone else";
/// callers must not be able to tell the two apart.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{message}")]
    UpstreamUnavailable {
        message: String,
        #[source]
        source: MlError,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps an ML service failure with the user-facing message for the
    /// operation that was being attempted.
    pub fn upstream(message: impl Into<String>) -> impl FnOnce(MlError) -> AppError {
        let message = message.into();
        move |source| AppError::UpstreamUnavailable { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            AppError::InvalidArgument(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthenticated(msg)
            | AppError::PayloadTooLarge(msg) => (msg.clone(), None),
            AppError::UpstreamUnavailable { message, source } => {
                tracing::error!("ML service error: {message}: {source}");
                (message.clone(), Some(source.to_string()))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    "A database error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "An internal server error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let mut response = (status, Json(json!({ "message": message }))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail { message, detail });
        }
        response
    }
}

/// Diagnostic cause attached to server-side error responses. Only turned
/// into an `error` body field by `expose_error_detail`.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    message: String,
    detail: String,
}

/// Adds the `error` field to error bodies outside production.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if state.config.is_production() {
        return response;
    }
    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail { message, detail }) => (
            response.status(),
            Json(json!({ "message": message, "error": detail })),
        )
            .into_response(),
        None => response,
    }
}
