//! Messages exchanged with the synchronization transport

use serde::{Deserialize, Serialize};

/// One entry of the collaborator list reported by the server
///
/// The server may report the same user several times (one per live
/// session), and includes the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub handle: String,
}

impl Collaborator {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }
}

/// Cursor metadata attached to outbound syncs: `{"c":{"s":1,"e":4}}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorMetadata {
    #[serde(rename = "c")]
    pub cursor: CursorSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSpan {
    #[serde(rename = "s")]
    pub start: usize,
    #[serde(rename = "e")]
    pub end: usize,
}

impl CursorMetadata {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            cursor: CursorSpan { start, end },
        }
    }

    /// Serialize metadata to a JSON string
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize metadata from a JSON string
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
