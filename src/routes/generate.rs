//! Generation Routes
//!
//! - POST /generate_study_guide - returns `{ studyGuide, pdfFilename }`
//! - POST /generate_quiz - returns `{ quiz, pdfFilename }`
//!
//! A successful generation stores the raw output as an artifact and replaces
//! the session's previous artifact of the same kind.

use axum::{
    extract::{rejection::FormRejection, State},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactId, ArtifactKind};
use crate::error::AppError;
use crate::generation::Quiz;
use crate::session::SessionId;
use crate::state::AppState;

const NO_TEXT_MESSAGE: &str = "No PDF text found. Please upload a PDF first.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGuideResponse {
    pub study_guide: String,
    pub pdf_filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub quiz: Quiz,
    pub pdf_filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizForm {
    pub num_questions: Option<String>,
}

/// POST /generate_study_guide
pub async fn study_guide(State(state): State<AppState>, Extension(session_id): Extension<SessionId>) -> Response {
    let result = generate_study_guide(&state, session_id).await;
    super::respond(&state, session_id, result).await
}

/// POST /generate_quiz
pub async fn quiz(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    form: Result<Form<QuizForm>, FormRejection>,
) -> Response {
    // A missing or unreadable form means "use the default count"
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let result = generate_quiz(&state, session_id, form).await;
    super::respond(&state, session_id, result).await
}

async fn generate_study_guide(state: &AppState, session_id: SessionId) -> Result<Response, AppError> {
    let (text, pdf_filename) = session_text(state, session_id).await?;

    let guide = state
        .generator()
        .generate_study_guide(&text)
        .await
        .map_err(|e| AppError::generation("study guide", e))?;

    let id = state
        .artifacts()
        .put(ArtifactKind::StudyGuide, &guide)
        .await
        .map_err(|e| AppError::generation("study guide", e))?;
    replace_artifact(state, session_id, ArtifactKind::StudyGuide, id).await;

    Ok(Json(StudyGuideResponse {
        study_guide: guide,
        pdf_filename,
    })
    .into_response())
}

async fn generate_quiz(state: &AppState, session_id: SessionId, form: QuizForm) -> Result<Response, AppError> {
    let config = &state.config().generation;
    let num_questions = parse_question_count(
        form.num_questions.as_deref(),
        config.default_questions,
        config.max_questions,
    )?;

    let (text, pdf_filename) = session_text(state, session_id).await?;

    let generated = state
        .generator()
        .generate_quiz(&text, num_questions)
        .await
        .map_err(|e| AppError::generation("quiz", e))?;

    let id = state
        .artifacts()
        .put(ArtifactKind::Quiz, &generated.json)
        .await
        .map_err(|e| AppError::generation("quiz", e))?;
    replace_artifact(state, session_id, ArtifactKind::Quiz, id).await;

    Ok(Json(QuizResponse {
        quiz: generated.quiz,
        pdf_filename,
    })
    .into_response())
}

/// Extracted text and filename of the session's upload
async fn session_text(state: &AppState, session_id: SessionId) -> Result<(String, Option<String>), AppError> {
    let session = state.sessions().get(session_id).await.unwrap_or_default();
    let text = session
        .extracted_text
        .ok_or_else(|| AppError::NotFound(NO_TEXT_MESSAGE.into()))?;
    Ok((text, session.pdf_filename))
}

/// Point the session at a new artifact and delete the one it replaces
async fn replace_artifact(state: &AppState, session_id: SessionId, kind: ArtifactKind, id: ArtifactId) {
    let previous = state
        .sessions()
        .update(session_id, |s| s.set_artifact_id(kind, id))
        .await;

    tracing::info!(session_id = %session_id, kind = %kind, artifact_id = %id, "Stored generated artifact");

    if let Some(previous) = previous {
        state.artifacts().delete(previous, kind).await;
    }
}

/// Validate `num_questions`; blank or missing means `default`
fn parse_question_count(raw: Option<&str>, default: u32, max: u32) -> Result<u32, AppError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(default);
    }

    let invalid = || AppError::Validation(format!("Number of questions must be between 1 and {}.", max));
    let count: u32 = raw.parse().map_err(|_| invalid())?;
    if count == 0 || count > max {
        return Err(invalid());
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_count() {
        assert_eq!(parse_question_count(None, 5, 50).unwrap(), 5);
        assert_eq!(parse_question_count(Some(" "), 5, 50).unwrap(), 5);
        assert_eq!(parse_question_count(Some("12"), 5, 50).unwrap(), 12);
        assert_eq!(parse_question_count(Some("50"), 5, 50).unwrap(), 50);
    }

    #[test]
    fn test_parse_question_count_rejects_out_of_range() {
        for raw in ["0", "51", "-3", "five", "2.5"] {
            assert!(matches!(
                parse_question_count(Some(raw), 5, 50),
                Err(AppError::Validation(_))
            ));
        }
    }
}
