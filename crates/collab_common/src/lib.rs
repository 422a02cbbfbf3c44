//! Common types and errors for the collaboration plugin
//!
//! This crate provides the error type and identity types shared by the
//! configuration layer and the synchronization core.

pub mod telemetry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error types shared across the collaboration crates
#[derive(Error, Debug)]
pub enum CollabError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Who is editing what: the inputs a shared-session key is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Handle of the local user
    pub user: String,

    /// Project name, possibly already owner-qualified (`owner+project`)
    pub project: String,

    /// File path relative to the project root
    pub path: String,
}

impl SessionIdentity {
    pub fn new(
        user: impl Into<String>,
        project: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            project: project.into(),
            path: path.into(),
        }
    }

    /// Key the transport uses to identify the shared document.
    ///
    /// Projects owned by somebody else already carry an `owner+` prefix;
    /// our own projects get qualified with the local user.
    pub fn key(&self) -> String {
        if self.project.contains('+') {
            format!("{}/{}", self.project, self.path)
        } else {
            format!("{}+{}/{}", self.user, self.project, self.path)
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CollabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_qualifies_own_project() {
        let identity = SessionIdentity::new("carl", "notes", "src/todo.txt");
        assert_eq!(identity.key(), "carl+notes/src/todo.txt");
    }

    #[test]
    fn test_key_keeps_shared_project_owner() {
        let identity = SessionIdentity::new("carl", "alice+notes", "readme");
        assert_eq!(identity.key(), "alice+notes/readme");
    }
}
