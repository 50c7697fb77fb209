//! Session status and reset

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::session::{Flash, FlashLevel, SessionId, SessionState};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub pdf_filename: Option<String>,
    pub has_text: bool,
    pub has_study_guide: bool,
    pub has_quiz: bool,
    /// Pending messages; reading them consumes them
    pub flashes: Vec<Flash>,
}

impl IndexResponse {
    fn from_session(session: &mut SessionState) -> Self {
        Self {
            service: "study-buddy-server",
            version: env!("CARGO_PKG_VERSION"),
            pdf_filename: session.pdf_filename.clone(),
            has_text: session.extracted_text.is_some(),
            has_study_guide: session.study_guide_id.is_some(),
            has_quiz: session.quiz_id.is_some(),
            flashes: session.take_flashes(),
        }
    }
}

/// GET /
///
/// Read-only for visitors without a stored session.
pub async fn index(State(state): State<AppState>, Extension(session_id): Extension<SessionId>) -> Json<IndexResponse> {
    let response = state
        .sessions()
        .inspect(session_id, IndexResponse::from_session)
        .await
        .unwrap_or_else(|| IndexResponse::from_session(&mut SessionState::new()));

    Json(response)
}

/// GET /clear
pub async fn clear(State(state): State<AppState>, Extension(session_id): Extension<SessionId>) -> Response {
    state.sessions().reset(session_id, state.artifacts()).await;
    state
        .sessions()
        .update(session_id, |s| {
            s.flash(FlashLevel::Info, "Session cleared. You can upload a new PDF.")
        })
        .await;

    Redirect::to("/").into_response()
}
