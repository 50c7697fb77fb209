//! Download Routes
//!
//! - GET /download_study_guide
//! - GET /download_quiz
//!
//! The stored artifact is rendered to PDF on every request and sent as an
//! attachment named after the uploaded file.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::artifacts::{ArtifactError, ArtifactKind};
use crate::error::AppError;
use crate::generation::Quiz;
use crate::render::RenderedDocument;
use crate::session::SessionId;
use crate::state::AppState;

/// GET /download_study_guide
pub async fn study_guide(State(state): State<AppState>, Extension(session_id): Extension<SessionId>) -> Response {
    let result = download(&state, session_id, ArtifactKind::StudyGuide).await;
    super::respond(&state, session_id, result).await
}

/// GET /download_quiz
pub async fn quiz(State(state): State<AppState>, Extension(session_id): Extension<SessionId>) -> Response {
    let result = download(&state, session_id, ArtifactKind::Quiz).await;
    super::respond(&state, session_id, result).await
}

fn missing_message(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::StudyGuide => "No study guide found. Please generate a study guide first.",
        ArtifactKind::Quiz => "No quiz found. Please generate a quiz first.",
    }
}

fn stale_message(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::StudyGuide => "Study guide file not found. Please generate a new study guide.",
        ArtifactKind::Quiz => "Quiz file not found. Please generate a new quiz.",
    }
}

fn noun(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::StudyGuide => "study guide PDF",
        ArtifactKind::Quiz => "quiz PDF",
    }
}

async fn download(state: &AppState, session_id: SessionId, kind: ArtifactKind) -> Result<Response, AppError> {
    let session = state.sessions().get(session_id).await.unwrap_or_default();
    let id = session
        .artifact_id(kind)
        .ok_or_else(|| AppError::NotFound(missing_message(kind).into()))?;

    let content = state.artifacts().get(id, kind).await.map_err(|e| match e {
        ArtifactError::NotFound { .. } => {
            tracing::warn!(session_id = %session_id, kind = %kind, artifact_id = %id, "Stale artifact reference");
            AppError::NotFound(stale_message(kind).into())
        }
        other => AppError::from(other),
    })?;

    let renderer = state.renderer().clone();
    let format = state.generator().guide_format();
    let source_name = session.pdf_filename;

    let task = match kind {
        ArtifactKind::StudyGuide => tokio::task::spawn_blocking(move || {
            renderer.render_study_guide(&content, format, source_name.as_deref())
        }),
        ArtifactKind::Quiz => {
            let quiz = Quiz::parse(&content).map_err(|e| AppError::generation(noun(kind), e))?;
            tokio::task::spawn_blocking(move || renderer.render_quiz(&quiz, source_name.as_deref()))
        }
    };

    let document = task
        .await
        .map_err(AppError::internal)?
        .map_err(|e| AppError::generation(noun(kind), e))?;

    tracing::info!(
        session_id = %session_id,
        kind = %kind,
        file_name = %document.file_name,
        pages = document.page_count,
        "Serving PDF"
    );

    Ok(pdf_attachment(document))
}

/// `attachment` response with both a plain and an RFC 5987 filename
fn pdf_attachment(document: RenderedDocument) -> Response {
    let ascii_name: String = document
        .file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_name,
        urlencoding::encode(&document.file_name)
    );

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}
