//! Upload Route
//!
//! POST /upload - multipart form with a single `pdf_file` field. The PDF is
//! extracted in memory; only the text and the sanitized filename are kept.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::error::AppError;
use crate::extract::extract_text;
use crate::session::{FlashLevel, SessionId};
use crate::state::AppState;

/// Multipart field carrying the PDF
pub const UPLOAD_FIELD: &str = "pdf_file";

/// Used when sanitizing leaves nothing usable of the client filename
const FALLBACK_FILENAME: &str = "document.pdf";

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = handle_upload(&state, session_id, multipart).await;
    super::respond(&state, session_id, result).await
}

async fn handle_upload(
    state: &AppState,
    session_id: SessionId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let limit = state.config().upload.max_bytes;
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload without a multipart body");
        AppError::Validation("No file part".into())
    })?;

    let (client_name, data) = read_pdf_field(&mut multipart, limit)
        .await?
        .ok_or_else(|| AppError::Validation("No file part".into()))?;

    if client_name.is_empty() {
        return Err(AppError::Validation("No selected file".into()));
    }
    if !allowed_file(&client_name) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a PDF file.".into(),
        ));
    }

    let file_name = safe_pdf_name(&client_name);
    tracing::info!(session_id = %session_id, file_name = %file_name, bytes = data.len(), "Processing upload");

    let text = extract_text(state.extractor(), data.to_vec())
        .await?
        .ok_or_else(|| {
            AppError::Extraction("Could not extract text from PDF. Please try another file.".into())
        })?;

    let chars = text.chars().count();
    state
        .sessions()
        .update(session_id, |s| {
            s.extracted_text = Some(text);
            s.pdf_filename = Some(file_name);
            s.flash(FlashLevel::Success, "PDF uploaded and processed successfully!");
        })
        .await;

    tracing::info!(session_id = %session_id, chars, "Stored extracted text");
    Ok(Redirect::to("/").into_response())
}

/// Find the `pdf_file` field, returning its client filename and content
async fn read_pdf_field(multipart: &mut Multipart, limit: usize) -> Result<Option<(String, Bytes)>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok(Some((file_name, data)));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(limit, "Upload exceeds the size limit");
        AppError::payload_too_large(limit)
    } else {
        AppError::Validation(format!("Invalid upload: {}", err.body_text()))
    }
}

/// Whether the filename has a `.pdf` extension (any case)
pub fn allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Reduce a client filename to a safe ASCII name
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are
/// stripped, so `../../etc/passwd` becomes `etc_passwd`.
pub fn secure_filename(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

fn safe_pdf_name(client_name: &str) -> String {
    let name = secure_filename(client_name);
    let has_stem = name
        .rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if has_stem {
        name
    } else {
        FALLBACK_FILENAME.to_string()
    }
}
