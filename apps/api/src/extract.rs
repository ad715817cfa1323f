use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use uuid::Uuid;

use crate::errors::AppError;

/// `axum::Json` whose rejections are reported as `InvalidArgument` with the
/// usual `{message}` body instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Parses a client-supplied record id. A malformed id can never name an
/// existing record, so it is reported as `NotFound` like any unknown id.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}

/// Treats an absent or whitespace-only field as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
