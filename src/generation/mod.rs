//! Study Material Generation
//!
//! Builds prompts from extracted text, calls the language model and
//! validates what comes back.
//!
//! Providers:
//! - Gemini (`generateContent` REST API)

mod gemini;
pub mod prompts;
pub mod quiz;

use std::sync::Arc;

use async_trait::async_trait;

pub use gemini::GeminiProvider;
pub use quiz::{strip_code_fences, Question, Quiz, QuizError};

use crate::render::InputFormat;

/// Generation error types
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Language model not configured: {0}")]
    NotConfigured(String),

    #[error("Language model request failed: {0}")]
    Request(String),

    #[error("Language model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Language model returned no text")]
    EmptyResponse,

    #[error("Failed to generate a valid quiz: {0}")]
    InvalidQuiz(#[from] QuizError),
}

/// Text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name for logging
    fn name(&self) -> &str;

    /// Complete a prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Quiz as returned by the model and as validated
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    /// JSON text with fences removed, as stored
    pub json: String,
    pub quiz: Quiz,
}

/// Prompting and response handling on top of a [`LanguageModel`]
#[derive(Clone)]
pub struct StudyGenerator {
    model: Arc<dyn LanguageModel>,
    max_input_chars: usize,
    guide_format: InputFormat,
}

impl StudyGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, max_input_chars: usize, guide_format: InputFormat) -> Self {
        Self {
            model,
            max_input_chars,
            guide_format,
        }
    }

    pub fn guide_format(&self) -> InputFormat {
        self.guide_format
    }

    /// Generate a study guide in the configured format
    pub async fn generate_study_guide(&self, text: &str) -> Result<String, GenerationError> {
        let text = truncate_chars(text, self.max_input_chars);
        let prompt = prompts::study_guide_prompt(text, self.guide_format);

        let guide = self.model.generate(&prompt).await.map_err(|e| {
            tracing::error!(model = self.model.name(), error = %e, "Error generating study guide");
            e
        })?;

        let guide = guide.trim();
        if guide.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::info!(model = self.model.name(), chars = guide.len(), "Generated study guide");
        Ok(guide.to_string())
    }

    /// Generate and validate a quiz of `num_questions` questions
    ///
    /// The model may return a different number of questions; any count is
    /// accepted as long as every question is valid.
    pub async fn generate_quiz(&self, text: &str, num_questions: u32) -> Result<GeneratedQuiz, GenerationError> {
        let text = truncate_chars(text, self.max_input_chars);
        let prompt = prompts::quiz_prompt(text, num_questions);

        let reply = self.model.generate(&prompt).await.map_err(|e| {
            tracing::error!(model = self.model.name(), error = %e, "Error generating quiz");
            e
        })?;

        let json = strip_code_fences(&reply);
        let quiz = Quiz::parse(json).map_err(|e| {
            tracing::error!(model = self.model.name(), error = %e, "Model returned an invalid quiz");
            e
        })?;

        if quiz.len() != num_questions as usize {
            tracing::debug!(requested = num_questions, received = quiz.len(), "Quiz size differs from request");
        }

        Ok(GeneratedQuiz {
            json: json.to_string(),
            quiz,
        })
    }
}

/// Keep at most `max_chars` characters, cutting on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            tracing::warn!(max_chars, original_chars = text.chars().count(), "Text truncated to fit the model input limit");
            &text[..cut]
        }
        None => text,
    }
}

// ============================================================================
// Test support
// ============================================================================
