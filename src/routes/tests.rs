//! End-to-end tests through the full router with a scripted model

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use super::build_router;
use crate::config::Config;
use crate::generation::mock::MockModel;
use crate::generation::GenerationError;
use crate::render::{Block, DocumentRenderer};
use crate::state::AppState;

const BOUNDARY: &str = "study-buddy-test-boundary";
const FIXTURE_TEXT: &str = "Hello World. This is a test.";
const GUIDE: &str = "# Hello\n\n- World\n\nThis guide explains the greeting used in the uploaded test document.";
const QUIZ: &str = r#"```json
[
  {"question": "What is greeted?", "options": ["World", "Moon", "Sun", "Sea"], "answer": "World"},
  {"question": "What kind of document?", "options": ["Novel", "Test", "Poem", "Map"], "answer": "Test"}
]
```"#;

/// Browser stand-in that keeps the session cookie between requests
struct TestClient {
    app: Router,
    state: AppState,
    model: Arc<MockModel>,
    cookie: Option<String>,
}

impl TestClient {
    fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
        Self::with_config(Config::default(), replies)
    }

    fn with_config(config: Config, replies: Vec<Result<String, GenerationError>>) -> Self {
        let model = Arc::new(MockModel::new(replies));
        let state = AppState::with_model(config, model.clone()).unwrap();
        Self {
            app: build_router(state.clone()),
            state,
            model,
            cookie: None,
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(form.to_string())).await
    }

    async fn upload(&mut self, field: &str, file_name: &str, data: &[u8]) -> Response {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let builder = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        self.send(builder, Body::from(body)).await
    }

    /// GET / as JSON (drains flashes)
    async fn status(&mut self) -> Value {
        let response = self.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    /// Messages of all pending flashes
    async fn flash_messages(&mut self) -> Vec<String> {
        self.status().await["flashes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["message"].as_str().unwrap().to_string())
            .collect()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn fixture_pdf() -> Vec<u8> {
    DocumentRenderer::default()
        .render_blocks(&[Block::Paragraph(FIXTURE_TEXT.to_string())])
        .unwrap()
        .0
}

fn assert_redirect_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}

// ============================================================================
// Session basics
// ============================================================================

#[tokio::test]
async fn test_read_only_visits_create_no_session() {
    let mut client = TestClient::new(vec![]);

    for _ in 0..3 {
        let status = client.status().await;
        assert_eq!(status["hasText"], false);
        assert_eq!(status["flashes"].as_array().unwrap().len(), 0);
    }

    assert!(client.cookie.is_none());
    assert_eq!(client.state.sessions().session_count().await, 0);
}

#[tokio::test]
async fn test_first_write_sets_session_cookie() {
    let mut client = TestClient::new(vec![]);

    client.upload("pdf_file", "", &fixture_pdf()).await;

    assert!(client.cookie.as_deref().unwrap().starts_with("study_session="));
    assert_eq!(client.state.sessions().session_count().await, 1);
    assert_eq!(client.flash_messages().await, vec!["No selected file"]);
}

#[tokio::test]
async fn test_tampered_cookie_gets_fresh_session() {
    let mut client = TestClient::new(vec![]);
    client.cookie = Some("study_session=not-a-signed-value".into());

    client.upload("pdf_file", "", &fixture_pdf()).await;

    let cookie = client.cookie.clone().unwrap();
    assert_ne!(cookie, "study_session=not-a-signed-value");
    assert!(cookie.starts_with("study_session="));
    assert_eq!(client.flash_messages().await, vec!["No selected file"]);
}

#[tokio::test]
async fn test_health_does_not_create_sessions() {
    let mut client = TestClient::new(vec![]);

    let response = client.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(response).await["status"], "healthy");
    assert_eq!(client.state.sessions().session_count().await, 0);
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_extracts_text() {
    let mut client = TestClient::new(vec![Ok(GUIDE.into())]);

    let response = client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    assert_redirect_home(&response);

    let status = client.status().await;
    assert_eq!(status["hasText"], true);
    assert_eq!(status["pdfFilename"], "hello.pdf");
    assert_eq!(status["flashes"][0]["level"], "success");
    assert_eq!(status["flashes"][0]["message"], "PDF uploaded and processed successfully!");

    // The extracted text is what the model gets to see
    client.post_form("/generate_study_guide", "").await;
    let prompts = client.model.prompts.lock().unwrap();
    assert!(prompts[0].contains("Hello World"));
}

#[tokio::test]
async fn test_upload_validation_messages() {
    let mut client = TestClient::new(vec![]);

    let response = client.upload("other_field", "hello.pdf", &fixture_pdf()).await;
    assert_redirect_home(&response);
    assert_eq!(client.flash_messages().await, vec!["No file part"]);

    client.upload("pdf_file", "", &fixture_pdf()).await;
    assert_eq!(client.flash_messages().await, vec!["No selected file"]);

    client.upload("pdf_file", "notes.docx", b"PK\x03\x04").await;
    assert_eq!(
        client.flash_messages().await,
        vec!["Invalid file type. Please upload a PDF file."]
    );

    let status = client.status().await;
    assert_eq!(status["hasText"], false);
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let mut client = TestClient::new(vec![]);

    let response = client.post_form("/upload", "pdf_file=nope").await;

    assert_redirect_home(&response);
    assert_eq!(client.flash_messages().await, vec!["No file part"]);
}

#[tokio::test]
async fn test_upload_of_non_pdf_content() {
    let mut client = TestClient::new(vec![]);

    let response = client.upload("pdf_file", "fake.pdf", b"definitely not a pdf").await;

    assert_redirect_home(&response);
    let messages = client.flash_messages().await;
    assert!(messages[0].starts_with("Error processing PDF"));
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let mut config = Config::default();
    config.upload.max_bytes = 2 * 1024 * 1024;
    let mut client = TestClient::with_config(config, vec![]);

    let big = vec![b'x'; 3 * 1024 * 1024];
    let response = client.upload("pdf_file", "big.pdf", &big).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        json_body(response).await["error"],
        "File too large! Maximum size is 2MB."
    );
    assert_eq!(
        client.flash_messages().await,
        vec!["File too large! Maximum size is 2MB."]
    );
}

// ============================================================================
// Generation and downloads
// ============================================================================

#[tokio::test]
async fn test_generate_without_upload() {
    let mut client = TestClient::new(vec![Ok(GUIDE.into())]);

    let response = client.post_form("/generate_study_guide", "").await;
    assert_redirect_home(&response);

    let response = client.post_form("/generate_quiz", "num_questions=3").await;
    assert_redirect_home(&response);

    assert_eq!(
        client.flash_messages().await,
        vec![
            "No PDF text found. Please upload a PDF first.",
            "No PDF text found. Please upload a PDF first.",
        ]
    );
    assert!(client.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_study_guide_flow() {
    let mut client = TestClient::new(vec![Ok(GUIDE.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;

    let response = client.post_form("/generate_study_guide", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["studyGuide"], GUIDE);
    assert_eq!(body["pdfFilename"], "hello.pdf");

    let response = client.get("/download_study_guide").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("filename=\"study_guide_hello.pdf\""));

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
    assert!(page_count(&bytes) >= 1);
}

#[tokio::test]
async fn test_quiz_flow() {
    let mut client = TestClient::new(vec![Ok(QUIZ.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;

    let response = client.post_form("/generate_quiz", "num_questions=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let questions = body["quiz"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for question in questions {
        assert_eq!(question["options"].as_array().unwrap().len(), 4);
    }
    assert!(client.model.prompts.lock().unwrap()[0].contains("with 2 questions"));

    let response = client.get("/download_quiz").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("quiz_hello.pdf"));
    assert!(!body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_quiz_default_question_count() {
    let mut client = TestClient::new(vec![Ok(QUIZ.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;

    let response = client.post_form("/generate_quiz", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(client.model.prompts.lock().unwrap()[0].contains("with 5 questions"));
}

#[tokio::test]
async fn test_zero_questions_is_rejected() {
    let mut client = TestClient::new(vec![Ok(QUIZ.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    client.flash_messages().await;

    let response = client.post_form("/generate_quiz", "num_questions=0").await;

    assert_redirect_home(&response);
    assert_eq!(
        client.flash_messages().await,
        vec!["Number of questions must be between 1 and 50."]
    );
    assert!(client.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_quiz_creates_no_artifact() {
    let mut client = TestClient::new(vec![Ok(r#"[{"question": "Q", "options": ["a", "b"], "answer": "a"}]"#.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    client.flash_messages().await;

    let response = client.post_form("/generate_quiz", "num_questions=1").await;

    assert_redirect_home(&response);
    let status = client.status().await;
    assert_eq!(status["hasQuiz"], false);
    assert!(status["flashes"][0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Error generating quiz"));
}

#[tokio::test]
async fn test_provider_failure_is_flashed() {
    let mut client = TestClient::new(vec![Err(GenerationError::Api {
        status: 503,
        body: "overloaded".into(),
    })]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    client.flash_messages().await;

    let response = client.post_form("/generate_study_guide", "").await;

    assert_redirect_home(&response);
    let status = client.status().await;
    assert_eq!(status["hasStudyGuide"], false);
    assert_eq!(status["flashes"][0]["level"], "danger");
}

#[tokio::test]
async fn test_downloads_before_generation() {
    let mut client = TestClient::new(vec![]);

    let response = client.get("/download_study_guide").await;
    assert_redirect_home(&response);
    let response = client.get("/download_quiz").await;
    assert_redirect_home(&response);

    assert_eq!(
        client.flash_messages().await,
        vec![
            "No study guide found. Please generate a study guide first.",
            "No quiz found. Please generate a quiz first.",
        ]
    );
}

#[tokio::test]
async fn test_regeneration_replaces_previous_artifact() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.artifact_dir = Some(temp_dir.path().to_path_buf());
    let mut client = TestClient::with_config(config, vec![Ok("# First".into()), Ok("# Second".into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;

    client.post_form("/generate_study_guide", "").await;
    client.post_form("/generate_study_guide", "").await;

    let guides = std::fs::read_dir(temp_dir.path().join("study_guide")).unwrap().count();
    assert_eq!(guides, 1);
}

#[tokio::test]
async fn test_download_with_missing_artifact_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.artifact_dir = Some(temp_dir.path().to_path_buf());
    let mut client = TestClient::with_config(config, vec![Ok(GUIDE.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    client.post_form("/generate_study_guide", "").await;
    client.flash_messages().await;

    for entry in std::fs::read_dir(temp_dir.path().join("study_guide")).unwrap() {
        std::fs::remove_file(entry.unwrap().path()).unwrap();
    }

    let response = client.get("/download_study_guide").await;

    assert_redirect_home(&response);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    assert!(body_bytes(response).await.is_empty());

    let status = client.status().await;
    assert_eq!(status["hasStudyGuide"], true);
    assert_eq!(status["flashes"][0]["level"], "danger");
    assert_eq!(
        status["flashes"][0]["message"],
        "Study guide file not found. Please generate a new study guide."
    );
}

// ============================================================================
// Clear
// ============================================================================

#[tokio::test]
async fn test_clear_resets_session_and_artifacts() {
    let mut client = TestClient::new(vec![Ok(GUIDE.into())]);
    client.upload("pdf_file", "hello.pdf", &fixture_pdf()).await;
    client.post_form("/generate_study_guide", "").await;
    client.flash_messages().await;

    let response = client.get("/clear").await;
    assert_redirect_home(&response);

    let status = client.status().await;
    assert_eq!(status["hasText"], false);
    assert_eq!(status["hasStudyGuide"], false);
    assert_eq!(status["pdfFilename"], Value::Null);
    assert_eq!(status["flashes"][0]["level"], "info");
    assert_eq!(
        status["flashes"][0]["message"],
        "Session cleared. You can upload a new PDF."
    );

    let response = client.get("/download_study_guide").await;
    assert_redirect_home(&response);
}
