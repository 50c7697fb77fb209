//! Application state management

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tempfile::TempDir;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::extract::TextExtractor;
use crate::generation::{GeminiProvider, GenerationError, LanguageModel, StudyGenerator};
use crate::render::DocumentRenderer;
use crate::session::SessionStore;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to prepare artifact directory {path}: {source}")]
    ArtifactDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize language model: {0}")]
    Model(#[from] GenerationError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    artifacts: ArtifactStore,
    sessions: SessionStore,
    generator: StudyGenerator,
    extractor: Arc<dyn TextExtractor>,
    renderer: DocumentRenderer,
    cookie_key: Key,
    /// Owns the default artifact root; removed when the state is dropped
    _scratch: Option<TempDir>,
}

impl AppState {
    /// Create the state with the Gemini provider
    pub fn new(config: Config) -> Result<Self, StateError> {
        let model = Arc::new(GeminiProvider::new(&config.gemini)?);
        Self::with_model(config, model)
    }

    /// Create the state around any language model
    pub fn with_model(config: Config, model: Arc<dyn LanguageModel>) -> Result<Self, StateError> {
        let (root, scratch) = match &config.storage.artifact_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|source| StateError::ArtifactDir {
                    path: dir.clone(),
                    source,
                })?;
                (dir.clone(), None)
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("study-buddy-")
                    .tempdir()
                    .map_err(|source| StateError::ArtifactDir {
                        path: std::env::temp_dir(),
                        source,
                    })?;
                (dir.path().to_path_buf(), Some(dir))
            }
        };

        tracing::info!(
            root = %root.display(),
            temporary = scratch.is_some(),
            model = model.name(),
            "Artifact store ready"
        );

        let generator = StudyGenerator::new(
            model,
            config.generation.max_input_chars,
            config.generation.guide_format,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                artifacts: ArtifactStore::with_local_storage(root),
                sessions: SessionStore::new(config.session.idle_timeout_hours),
                generator,
                extractor: default_extractor(),
                renderer: DocumentRenderer::default(),
                cookie_key: derive_cookie_key(&config.session.secret),
                config,
                _scratch: scratch,
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.inner.artifacts
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn generator(&self) -> &StudyGenerator {
        &self.inner.generator
    }

    pub fn extractor(&self) -> Arc<dyn TextExtractor> {
        self.inner.extractor.clone()
    }

    pub fn renderer(&self) -> &DocumentRenderer {
        &self.inner.renderer
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}

/// Derive the 64-byte cookie signing key from the configured secret
pub fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(feature = "mupdf-extract")]
fn default_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(crate::extract::MupdfBackend)
}

#[cfg(not(feature = "mupdf-extract"))]
fn default_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(crate::extract::PdfExtractBackend)
}
