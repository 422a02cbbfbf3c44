//! Seams to the outside world: the editor, its chrome, and the transport
//!
//! The core never reaches into the editor directly. Everything it reads or
//! changes goes through these traits, which the embedding application
//! implements.

use crate::offsets::{Position, Range};
use std::time::Duration;

/// The editor's text model and view, as seen by a shared session
pub trait DocumentHost {
    /// Whole document text, lines joined with `\n`
    fn text(&self) -> String;

    /// Replace the whole document text
    fn set_text(&mut self, text: &str);

    /// Document lines without separators
    fn lines(&self) -> Vec<String> {
        self.text().split('\n').map(String::from).collect()
    }

    /// Current selection, ordered
    fn selection(&self) -> Range;

    /// Move the cursor, optionally extending the selection to `to`
    fn move_cursor(&mut self, to: Position, extend_selection: bool);

    /// Whether `ch` separates words
    fn is_delimiter(&self, ch: char) -> bool {
        !(ch.is_alphanumeric() || ch == '_')
    }

    fn is_read_only(&self) -> bool;

    fn set_read_only(&mut self, read_only: bool);
}

/// Editor chrome a session reports to
pub trait SessionUi {
    /// Replace the collaborator list; the local user comes first
    fn set_collaborators(&mut self, handles: &[String]);

    /// Show a collaboration error banner
    fn show_error(&mut self, message: &str);
}

/// The synchronization transport (e.g. a mobwrite-style polling client)
pub trait Transport {
    /// Start synchronizing the document with this key
    fn share(&mut self, key: &str);

    /// Stop synchronizing these documents
    fn unshare(&mut self, keys: &[String]);

    /// Feed a message from the server into the transport
    fn reflect(&mut self, message: &str);

    /// Ask for the next poll after `delay`
    fn schedule_poll(&mut self, delay: Duration);
}
