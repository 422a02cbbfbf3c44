//! Editor chrome that remembers what it was told

use collab_sync::SessionUi;

#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    pub rosters: Vec<Vec<String>>,
    pub errors: Vec<String>,
}

impl RecordingUi {
    /// Roster currently on screen
    pub fn roster(&self) -> Option<&[String]> {
        self.rosters.last().map(Vec::as_slice)
    }
}

impl SessionUi for RecordingUi {
    fn set_collaborators(&mut self, handles: &[String]) {
        self.rosters.push(handles.to_vec());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
