//! Configuration management for Study Buddy Server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::render::InputFormat;

/// Development fallback for `SESSION_SECRET`
pub const DEFAULT_SESSION_SECRET: &str = "default-secret-key-for-development";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub gemini: GeminiConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Persistent artifact root. When unset a temporary directory is created
    /// at startup and removed on shutdown.
    pub artifact_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    pub idle_timeout_hours: i64,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub max_input_chars: usize,
    pub default_questions: u32,
    pub max_questions: u32,
    pub guide_format: InputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig { artifact_dir: None },
            session: SessionConfig {
                secret: DEFAULT_SESSION_SECRET.to_string(),
                cookie_name: "study_session".to_string(),
                idle_timeout_hours: 24,
            },
            upload: UploadConfig {
                max_bytes: 16 * 1024 * 1024,
            },
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-2.0-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                timeout: Duration::from_secs(120),
            },
            generation: GenerationConfig {
                max_input_chars: 30_000,
                default_questions: 5,
                max_questions: 50,
                guide_format: InputFormat::Markdown,
            },
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// [`Config::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set, using the development secret");
            defaults.session.secret.clone()
        });

        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not found in environment variables");
        }

        let guide_format = match env::var("GUIDE_FORMAT").as_deref() {
            Ok("plain") | Ok("text") => InputFormat::PlainText,
            _ => defaults.generation.guide_format,
        };

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("PORT", defaults.server.port),
            },
            storage: StorageConfig {
                artifact_dir: env::var("ARTIFACT_DIR").ok().map(PathBuf::from),
            },
            session: SessionConfig {
                secret,
                cookie_name: defaults.session.cookie_name,
                idle_timeout_hours: parse_var("SESSION_IDLE_HOURS", defaults.session.idle_timeout_hours),
            },
            upload: UploadConfig {
                max_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.upload.max_bytes),
            },
            gemini: GeminiConfig {
                api_key,
                model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
                base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini.base_url),
                timeout: Duration::from_secs(parse_var(
                    "GEMINI_TIMEOUT_SECS",
                    defaults.gemini.timeout.as_secs(),
                )),
            },
            generation: GenerationConfig {
                max_input_chars: parse_var("MAX_INPUT_CHARS", defaults.generation.max_input_chars),
                default_questions: parse_var(
                    "DEFAULT_QUIZ_QUESTIONS",
                    defaults.generation.default_questions,
                ),
                max_questions: parse_var("MAX_QUIZ_QUESTIONS", defaults.generation.max_questions),
                guide_format,
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
