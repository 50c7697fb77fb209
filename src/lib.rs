//! Study Buddy Server Library
//!
//! Upload a PDF, extract its text, have a language model write a study guide
//! or a multiple-choice quiz from it and download either one as a PDF.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `artifacts`: Generated study guides and quizzes on disk
//! - `session`: Signed-cookie sessions with flash messages
//! - `extract`: PDF text extraction
//! - `generation`: Prompting, the Gemini client and quiz validation
//! - `render`: Markdown/plain-text to PDF rendering
//! - `routes`: HTTP handlers and the router

pub mod artifacts;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
