//! Route modules for the Study Buddy server
//!
//! Endpoints:
//! - GET  / - Session status and pending flash messages
//! - POST /upload - Upload a PDF (`pdf_file` multipart field)
//! - POST /generate_study_guide - Generate a study guide from the upload
//! - POST /generate_quiz - Generate a quiz (`num_questions` form field)
//! - GET  /download_study_guide - Download the study guide as PDF
//! - GET  /download_quiz - Download the quiz as PDF
//! - GET  /clear - Reset the session and delete its artifacts
//! - GET  /health, /api/v1/health - Liveness check

pub mod download;
pub mod generate;
pub mod health;
pub mod index;
pub mod upload;

#[cfg(test)]
mod tests;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, INTERNAL_ERROR_MESSAGE};
use crate::session::{session_layer, FlashLevel, SessionId};
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let body_limit = state.config().upload.max_bytes;

    Router::new()
        .route("/", get(index::index))
        .route("/upload", post(upload::upload))
        .route("/generate_study_guide", post(generate::study_guide))
        .route("/generate_quiz", post(generate::quiz))
        .route("/download_study_guide", get(download::study_guide))
        .route("/download_quiz", get(download::quiz))
        .route("/clear", get(index::clear))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        // Probes stay outside the session layer so they never mint cookies
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Turn a handler result into a response
///
/// Errors are queued as a `danger` flash. Oversized uploads and internal
/// errors keep their status code; everything else redirects home.
pub(crate) async fn respond(state: &AppState, session_id: SessionId, result: Result<Response, AppError>) -> Response {
    let err = match result {
        Ok(response) => return response,
        Err(err) => err,
    };

    let message = err.to_string();
    tracing::debug!(session_id = %session_id, code = err.code(), message = %message, "Request failed");
    state
        .sessions()
        .update(session_id, |s| s.flash(FlashLevel::Danger, message))
        .await;

    match err {
        AppError::PayloadTooLarge { .. } | AppError::Internal(_) => {
            let mut response = err.into_response();
            response
                .headers_mut()
                .insert(header::LOCATION, HeaderValue::from_static("/"));
            response
        }
        _ => Redirect::to("/").into_response(),
    }
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": INTERNAL_ERROR_MESSAGE,
            "code": "INTERNAL_ERROR",
        })),
    )
        .into_response()
}
