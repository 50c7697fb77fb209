//! Quiz model and validation of model output

use serde::{Deserialize, Serialize};

/// Every question carries exactly this many options
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Quiz validation errors
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Quiz is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Quiz must be a JSON array of questions")]
    NotAnArray,

    #[error("Question {index} is malformed: {reason}")]
    MalformedQuestion { index: usize, reason: String },

    #[error("Question {index} has {count} options, expected {expected}", expected = OPTIONS_PER_QUESTION)]
    WrongOptionCount { index: usize, count: usize },

    #[error("Question {index}: answer is not one of the options")]
    AnswerNotInOptions { index: usize },

    #[error("Quiz has no questions")]
    Empty,
}

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// Validated quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quiz(Vec<Question>);

impl Quiz {
    /// Parse and validate quiz JSON
    ///
    /// Any invalid question rejects the whole quiz. Question numbers in
    /// errors are 1-based.
    pub fn parse(json: &str) -> Result<Self, QuizError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Array(items) = value else {
            return Err(QuizError::NotAnArray);
        };

        if items.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut questions = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let index = i + 1;
            let question: Question =
                serde_json::from_value(item).map_err(|e| QuizError::MalformedQuestion {
                    index,
                    reason: e.to_string(),
                })?;

            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(QuizError::WrongOptionCount {
                    index,
                    count: question.options.len(),
                });
            }

            if !question.options.iter().any(|o| *o == question.answer) {
                return Err(QuizError::AnswerNotInOptions { index });
            }

            questions.push(question);
        }

        Ok(Self(questions))
    }

    pub fn questions(&self) -> &[Question] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pull the JSON payload out of a model reply that may be wrapped in fences
///
/// With a ```` ```json ```` marker the text after it up to the next fence is
/// used; otherwise the text between the first pair of ```` ``` ```` fences.
pub fn strip_code_fences(reply: &str) -> &str {
    if let Some((_, after)) = reply.split_once("```json") {
        let body = after.split("```").next().unwrap_or(after);
        return body.trim();
    }

    let mut parts = reply.split("```");
    match (parts.next(), parts.next()) {
        (Some(_), Some(inside)) => inside.trim(),
        _ => reply.trim(),
    }
}
