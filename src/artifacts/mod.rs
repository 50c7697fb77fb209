//! Artifact Store
//!
//! Generated study guides and quizzes are persisted under opaque identifiers
//! so that sessions only carry ids, never the content itself.
//!
//! Layout on disk:
//!
//! ```text
//! {root}/study_guide/{id}_study_guide.md
//! {root}/quiz/{id}_quiz.json
//! ```

pub mod store;
pub mod types;

pub use store::{ArtifactStorage, ArtifactStore, LocalArtifactStorage};
pub use types::{ArtifactError, ArtifactId, ArtifactKind};
