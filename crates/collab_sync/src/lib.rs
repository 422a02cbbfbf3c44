//! # Collaborative Editing Sync Core
//!
//! Keeps a replicated document and its cursor consistent while patches
//! computed against a remote snapshot arrive from the synchronization
//! transport.
//!
//! ## Architecture
//!
//! - **Offsets**: linear offsets to (row, column) positions and back
//! - **Cursor**: selection snapshots with text fingerprints for fuzzy relocation
//! - **Engine**: drift-tolerant patch application with tracked offsets
//! - **Session**: the shared-document adapter the transport talks to
//! - **Manager**: owns the single active session and switches between files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use collab_sync::{Patch, SyncEngine};
//!
//! let engine = SyncEngine::default();
//! let patches = Patch::make("The quick brown fox", "The quick red fox", engine.config());
//!
//! let mut cursor = [19];
//! let text = engine.apply_patches(&patches, "Well, The quick brown fox", &mut cursor);
//! assert_eq!(text, "Well, The quick red fox");
//! ```

pub mod config;
pub mod cursor;
pub mod diff;
pub mod engine;
pub mod host;
pub mod manager;
pub mod matcher;
pub mod offsets;
pub mod patch;
pub mod protocol;
pub mod session;

pub use config::MatchConfig;
pub use cursor::CursorContext;
pub use diff::{Diff, Op};
pub use engine::{PatchOutcome, PatchReport, SyncEngine};
pub use host::{DocumentHost, SessionUi, Transport};
pub use manager::SessionManager;
pub use offsets::{offsets_to_range, range_to_offsets, Position, Range};
pub use patch::{patches_from_text, patches_to_text, Patch};
pub use protocol::{Collaborator, CursorMetadata};
pub use session::ShareSession;

/// Common result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur during sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] anyhow::Error),
}
