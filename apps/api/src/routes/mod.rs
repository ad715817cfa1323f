pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::handlers as auth;
use crate::errors::expose_error_detail;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let api = Router::new()
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/user", get(auth::handle_current_user))
        .route("/auth/logout", post(auth::handle_logout))
        // Resume
        .route(
            "/resume/upload",
            post(resume::handle_upload).layer(upload_limit),
        )
        .route("/resume/analysis/:id", get(resume::handle_get_analysis))
        .route("/resume/list", get(resume::handle_list))
        .route("/resume/match-job", post(resume::handle_match_job))
        .route("/resume/match-role", post(resume::handle_match_role))
        // Interview
        .route("/interview/start", post(interview::handle_start))
        .route("/interview/answer", post(interview::handle_answer))
        .route("/interview/result/:id", get(interview::handle_result))
        .route("/interview/history", get(interview::handle_history));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            expose_error_detail,
        ))
        .with_state(state)
}
