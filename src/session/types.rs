//! Session state types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::artifacts::{ArtifactId, ArtifactKind, ArtifactStore};

/// Opaque session identifier carried in the signed cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// One-shot user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Per-user session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub extracted_text: Option<String>,
    pub pdf_filename: Option<String>,
    pub study_guide_id: Option<ArtifactId>,
    pub quiz_id: Option<ArtifactId>,
    pub flashes: Vec<Flash>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            extracted_text: None,
            pdf_filename: None,
            study_guide_id: None,
            quiz_id: None,
            flashes: Vec::new(),
            created_at: now,
            last_seen: now,
        }
    }

    /// Artifact id held for `kind`, if any
    pub fn artifact_id(&self, kind: ArtifactKind) -> Option<ArtifactId> {
        match kind {
            ArtifactKind::StudyGuide => self.study_guide_id,
            ArtifactKind::Quiz => self.quiz_id,
        }
    }

    /// Point `kind` at a new artifact, returning the id it replaces
    pub fn set_artifact_id(&mut self, kind: ArtifactKind, id: ArtifactId) -> Option<ArtifactId> {
        let slot = match kind {
            ArtifactKind::StudyGuide => &mut self.study_guide_id,
            ArtifactKind::Quiz => &mut self.quiz_id,
        };
        slot.replace(id)
    }

    /// All artifact references held by this session
    pub fn artifacts(&self) -> Vec<(ArtifactKind, ArtifactId)> {
        [ArtifactKind::StudyGuide, ArtifactKind::Quiz]
            .into_iter()
            .filter_map(|kind| self.artifact_id(kind).map(|id| (kind, id)))
            .collect()
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    /// Clear all fields, returning the artifact references that were dropped
    ///
    /// The caller owns deleting the returned artifacts.
    pub fn clear(&mut self) -> Vec<(ArtifactKind, ArtifactId)> {
        let detached = self.artifacts();

        self.extracted_text = None;
        self.pdf_filename = None;
        self.study_guide_id = None;
        self.quiz_id = None;
        self.flashes.clear();

        detached
    }

    /// Clear all fields and delete every referenced artifact
    ///
    /// Deletion failures are logged by the store and never stop the reset.
    pub async fn reset(&mut self, artifacts: &ArtifactStore) {
        delete_all(artifacts, self.clear()).await;
    }

    /// Whether the session has been idle for longer than `idle_hours`
    ///
    /// A timeout too large to represent never expires.
    pub fn is_expired(&self, idle_hours: i64, now: DateTime<Utc>) -> bool {
        chrono::Duration::try_hours(idle_hours)
            .and_then(|idle| self.last_seen.checked_add_signed(idle))
            .map_or(false, |deadline| deadline < now)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort deletion of detached artifact references
pub(crate) async fn delete_all(artifacts: &ArtifactStore, detached: Vec<(ArtifactKind, ArtifactId)>) {
    for (kind, id) in detached {
        artifacts.delete(id, kind).await;
    }
}
