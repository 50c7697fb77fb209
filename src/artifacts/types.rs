//! Artifact types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque artifact identifier
pub type ArtifactId = Uuid;

/// Kind of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    StudyGuide,
    Quiz,
}

impl ArtifactKind {
    /// Name used for directories, file names and downloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StudyGuide => "study_guide",
            Self::Quiz => "quiz",
        }
    }

    /// File extension of the stored raw content
    pub fn extension(&self) -> &'static str {
        match self {
            Self::StudyGuide => "md",
            Self::Quiz => "json",
        }
    }

    /// Human-readable label used in document titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::StudyGuide => "Study Guide",
            Self::Quiz => "Quiz",
        }
    }

    /// Relative storage path for an artifact of this kind
    pub fn relative_path(&self, id: ArtifactId) -> String {
        format!(
            "{kind}/{id}_{kind}.{ext}",
            kind = self.as_str(),
            id = id,
            ext = self.extension()
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact store errors
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{kind} artifact {id} not found")]
    NotFound { kind: ArtifactKind, id: ArtifactId },

    #[error("Failed to write {kind} artifact: {source}")]
    StorageWrite {
        kind: ArtifactKind,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {kind} artifact {id}: {source}")]
    StorageRead {
        kind: ArtifactKind,
        id: ArtifactId,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {kind} artifact {id}: {source}")]
    StorageDelete {
        kind: ArtifactKind,
        id: ArtifactId,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact content is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
