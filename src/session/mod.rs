//! Server-side sessions
//!
//! The client only holds a signed cookie with an opaque session id. The
//! state itself (extracted text, filename, artifact ids, flash messages)
//! lives in the [`SessionStore`].

pub mod middleware;
pub mod store;
pub mod types;

pub use middleware::session_layer;
pub use store::SessionStore;
pub use types::{Flash, FlashLevel, SessionId, SessionState};
