//! Artifact store front-end and storage backends

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::types::{ArtifactError, ArtifactId, ArtifactKind};

// ============================================================================
// Storage Trait
// ============================================================================

/// Trait for artifact storage backends
///
/// Backends report every failure; the [`ArtifactStore`] front-end decides
/// which of them are fatal.
#[async_trait::async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Persist content for `(kind, id)`
    async fn write(&self, kind: ArtifactKind, id: ArtifactId, content: &[u8]) -> Result<(), ArtifactError>;

    /// Read content back, `ArtifactError::NotFound` when absent
    async fn read(&self, kind: ArtifactKind, id: ArtifactId) -> Result<Vec<u8>, ArtifactError>;

    /// Remove content, `ArtifactError::NotFound` when absent
    async fn remove(&self, kind: ArtifactKind, id: ArtifactId) -> Result<(), ArtifactError>;
}

// ============================================================================
// Artifact Store
// ============================================================================

/// Artifact store with a pluggable backend
#[derive(Clone)]
pub struct ArtifactStore {
    backend: Arc<dyn ArtifactStorage>,
}

impl ArtifactStore {
    /// Create with local filesystem storage rooted at `root`
    pub fn with_local_storage(root: PathBuf) -> Self {
        Self::with_backend(Arc::new(LocalArtifactStorage::new(root)))
    }

    /// Create with a custom backend
    pub fn with_backend(backend: Arc<dyn ArtifactStorage>) -> Self {
        Self { backend }
    }

    /// Store `content` under a freshly generated identifier
    pub async fn put(&self, kind: ArtifactKind, content: &str) -> Result<ArtifactId, ArtifactError> {
        let id = Uuid::new_v4();
        self.backend.write(kind, id, content.as_bytes()).await?;

        tracing::debug!(
            artifact_id = %id,
            kind = %kind,
            bytes = content.len(),
            "Stored artifact"
        );

        Ok(id)
    }

    /// Read an artifact back
    pub async fn get(&self, id: ArtifactId, kind: ArtifactKind) -> Result<String, ArtifactError> {
        let bytes = self.backend.read(kind, id).await?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Best-effort removal
    ///
    /// A missing artifact is not an error. Any other failure is logged and
    /// swallowed so cleanup never blocks a session reset.
    pub async fn delete(&self, id: ArtifactId, kind: ArtifactKind) {
        match self.backend.remove(kind, id).await {
            Ok(()) => {
                tracing::debug!(artifact_id = %id, kind = %kind, "Deleted artifact");
            }
            Err(ArtifactError::NotFound { .. }) => {
                tracing::debug!(artifact_id = %id, kind = %kind, "Artifact already gone");
            }
            Err(e) => {
                tracing::warn!(
                    artifact_id = %id,
                    kind = %kind,
                    error = %e,
                    "Could not remove artifact"
                );
            }
        }
    }
}

// ============================================================================
// Local Filesystem Storage
// ============================================================================

/// Local filesystem artifact storage
pub struct LocalArtifactStorage {
    root: PathBuf,
}

impl LocalArtifactStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn artifact_path(&self, kind: ArtifactKind, id: ArtifactId) -> PathBuf {
        self.root.join(kind.relative_path(id))
    }
}

#[async_trait::async_trait]
impl ArtifactStorage for LocalArtifactStorage {
    async fn write(&self, kind: ArtifactKind, id: ArtifactId, content: &[u8]) -> Result<(), ArtifactError> {
        let path = self.artifact_path(kind, id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ArtifactError::StorageWrite { kind, source })?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|source| ArtifactError::StorageWrite { kind, source })
    }

    async fn read(&self, kind: ArtifactKind, id: ArtifactId) -> Result<Vec<u8>, ArtifactError> {
        let path = self.artifact_path(kind, id);
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound => ArtifactError::NotFound { kind, id },
            _ => ArtifactError::StorageRead { kind, id, source },
        })
    }

    async fn remove(&self, kind: ArtifactKind, id: ArtifactId) -> Result<(), ArtifactError> {
        let path = self.artifact_path(kind, id);
        tokio::fs::remove_file(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound => ArtifactError::NotFound { kind, id },
            _ => ArtifactError::StorageDelete { kind, id, source },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let content = "# Photosynthesis\n\n- Light reactions\n- Calvin cycle ✓\n";
        let id = store.put(ArtifactKind::StudyGuide, content).await.unwrap();

        let retrieved = store.get(id, ArtifactKind::StudyGuide).await.unwrap();
        assert_eq!(retrieved.as_bytes(), content.as_bytes());

        let on_disk = temp_dir
            .path()
            .join("study_guide")
            .join(format!("{}_study_guide.md", id));
        assert!(on_disk.exists());
    }

    #[tokio::test]
    async fn test_ids_are_unique_per_put() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let a = store.put(ArtifactKind::Quiz, "[]").await.unwrap();
        let b = store.put(ArtifactKind::Quiz, "[]").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let result = store.get(Uuid::new_v4(), ArtifactKind::Quiz).await;
        assert!(matches!(result, Err(ArtifactError::NotFound { kind: ArtifactKind::Quiz, .. })));
    }

    #[tokio::test]
    async fn test_kind_is_part_of_the_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let id = store.put(ArtifactKind::StudyGuide, "guide").await.unwrap();
        let result = store.get(id, ArtifactKind::Quiz).await;
        assert!(matches!(result, Err(ArtifactError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_and_tolerates_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let id = store.put(ArtifactKind::Quiz, "[]").await.unwrap();
        store.delete(id, ArtifactKind::Quiz).await;
        assert!(matches!(
            store.get(id, ArtifactKind::Quiz).await,
            Err(ArtifactError::NotFound { .. })
        ));

        // Second delete hits a missing file and must stay silent
        store.delete(id, ArtifactKind::Quiz).await;
    }

    #[tokio::test]
    async fn test_write_failure_is_storage_write() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the kind directory should be
        std::fs::write(temp_dir.path().join("quiz"), b"blocker").unwrap();
        let store = ArtifactStore::with_local_storage(temp_dir.path().to_path_buf());

        let result = store.put(ArtifactKind::Quiz, "[]").await;
        assert!(matches!(result, Err(ArtifactError::StorageWrite { .. })));
    }
}
