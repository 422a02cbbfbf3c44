//! Shared-document session adapter
//!
//! A [`ShareSession`] is what the synchronization transport talks to for one
//! shared file. It reads and writes the host document, keeps the cursor in
//! place across remote changes, renders the collaborator roster and puts the
//! editor into read-only mode when the transport reports a failure.

use crate::engine::{PatchReport, SyncEngine};
use crate::host::{DocumentHost, SessionUi};
use crate::offsets::range_to_offsets;
use crate::patch::Patch;
use crate::protocol::{Collaborator, CursorMetadata};
use crate::{Result, SyncError};
use collab_common::SessionIdentity;

const LOSS_WARNING: &str = "Warning: Changes since the last sync could be lost";

type FirstSync = Box<dyn FnOnce()>;

/// Adapter between one shared document and the transport
pub struct ShareSession<H, U> {
    identity: SessionIdentity,
    key: String,
    host: H,
    ui: U,
    engine: SyncEngine,

    /// Present until the first sync completes
    on_first_sync: Option<FirstSync>,

    error_raised: bool,
    read_only_before_error: bool,

    /// Last roster pushed to the UI
    roster: Vec<String>,
}

impl<H: DocumentHost, U: SessionUi> ShareSession<H, U> {
    pub fn new(identity: SessionIdentity, host: H, ui: U, engine: SyncEngine) -> Self {
        let key = identity.key();
        Self {
            identity,
            key,
            host,
            ui,
            engine,
            on_first_sync: Some(Box::new(|| {})),
            error_raised: false,
            read_only_before_error: false,
            roster: Vec::new(),
        }
    }

    /// Run `callback` once, when the first sync completes.
    pub fn with_first_sync(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_first_sync = Some(Box::new(callback));
        self
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// Key the transport shares this document under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_synced(&self) -> bool {
        self.on_first_sync.is_none()
    }

    pub fn is_error_raised(&self) -> bool {
        self.error_raised
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Collaborators as last shown, local user first
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Current document text.
    ///
    /// Before the first sync the host buffer holds nothing meaningful, so
    /// reading it is an error unless `allow_unsynced` is set.
    pub fn get_text(&self, allow_unsynced: bool) -> Result<String> {
        if !allow_unsynced && !self.is_synced() {
            return Err(SyncError::IllegalState(format!(
                "text of {} read before the first sync",
                self.key
            )));
        }
        Ok(self.host.text())
    }

    /// Replace the document text with the server's copy.
    pub fn set_text(&mut self, text: &str) {
        let cursor = self.engine.capture_cursor(&self.host);
        self.host.set_text(text);
        self.engine.restore_cursor(&mut self.host, &cursor);

        self.sync_done();
    }

    /// Merge remote patches into the document, keeping the cursor in place.
    pub fn patch_text(&mut self, patches: &[Patch]) -> PatchReport {
        let old_text = self.host.text();
        let mut cursor = self.engine.capture_cursor(&self.host);
        let mut offsets = [cursor.start_offset, cursor.end_offset];

        let report = self
            .engine
            .apply_patches_with_report(patches, &old_text, &mut offsets);

        if report.text != old_text {
            self.host.set_text(&report.text);

            cursor.start_offset = offsets[0];
            cursor.end_offset = offsets[1];
            if cursor.start_offset >= cursor.end_offset {
                cursor.collapsed = true;
            }
            self.engine.restore_cursor(&mut self.host, &cursor);
        }

        self.sync_done();
        report
    }

    /// The transport synced but had nothing to change.
    pub fn sync_without_change(&mut self) {
        self.sync_done();
    }

    /// Finish a sync: fire the first-sync callback and recover from errors.
    pub fn sync_done(&mut self) {
        if let Some(callback) = self.on_first_sync.take() {
            tracing::info!(key = %self.key, "first sync completed");
            callback();
        }

        if self.error_raised {
            if !self.read_only_before_error {
                self.host.set_read_only(false);
            }
            self.error_raised = false;
            tracing::info!(key = %self.key, "recovered from collaboration error");
        }
    }

    /// Show who else is editing. Returns whether the roster changed.
    pub fn report_collaborators(&mut self, entries: &[Collaborator]) -> bool {
        let me = &self.identity.user;

        // Stale sessions on the server repeat users.
        let mut handles: Vec<String> = Vec::with_capacity(entries.len() + 1);
        for entry in entries {
            if entry.handle != *me && !handles.contains(&entry.handle) {
                handles.push(entry.handle.clone());
            }
        }
        handles.sort();
        handles.insert(0, me.clone());

        if handles == self.roster {
            return false;
        }

        self.ui.set_collaborators(&handles);
        self.roster = handles;
        true
    }

    /// The transport failed. Tell the user and stop local edits.
    pub fn raise_error(&mut self, message: &str, recoverable: bool) {
        let prefix = if recoverable { "" } else { "Fatal " };
        tracing::error!(key = %self.key, recoverable, "collaboration error: {}", message);
        self.ui
            .show_error(&format!("{prefix}Collaboration Error: {message}\n{LOSS_WARNING}"));

        if !self.error_raised {
            self.read_only_before_error = self.host.is_read_only();
            self.host.set_read_only(true);
            self.error_raised = true;
        }
    }

    /// Cursor offsets as JSON metadata for the next outbound sync
    pub fn metadata(&self) -> Result<String> {
        let (start, end) = range_to_offsets(&self.host.lines(), &self.host.selection());
        CursorMetadata::new(start, end).to_json()
    }
}
