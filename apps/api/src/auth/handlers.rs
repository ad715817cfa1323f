use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{non_blank, ApiJson};
use crate::models::user::{PublicUser, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn avatar_url(name: &str) -> Result<String, AppError> {
    Url::parse_with_params(
        "https://ui-avatars.com/api/",
        &[("name", name), ("background", "4F46E5"), ("color", "fff")],
    )
    .map(String::from)
    .map_err(|e| AppError::Internal(e.into()))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthenticated("Invalid credentials".to_string())
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(req.name),
        non_blank(req.email),
        non_blank(req.password),
    ) else {
        return Err(AppError::InvalidArgument(
            "Please provide all required fields".to_string(),
        ));
    };
    let name = name.trim().to_string();
    let email = normalize_email(&email);

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(crate::store::duplicate_email());
    }

    let user = User {
        id: Uuid::new_v4(),
        avatar: avatar_url(&name)?,
        name,
        email,
        password_hash: hash_password(password).await?,
        created_at: Utc::now(),
    };
    state.users.create(&user).await?;
    info!("Registered user {}", user.id);

    let token = state.tokens.issue(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (non_blank(req.email), non_blank(req.password)) else {
        return Err(AppError::InvalidArgument(
            "Please provide email and password".to_string(),
        ));
    };

    let user = state
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(password, user.password_hash.clone()).await? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: PublicUser::from(&user),
    }))
}

/// GET /api/auth/user
pub async fn handle_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    // A token can outlive its account.
    let user = state
        .users
        .get(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;
    Ok(Json(json!({ "user": PublicUser::from(&user) })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn handle_logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}
