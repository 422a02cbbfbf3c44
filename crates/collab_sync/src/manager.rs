//! The one shared document at a time
//!
//! Editing a different file moves sharing along with it: the previous
//! document is unshared before the new one is registered with the
//! transport.

use crate::config::MatchConfig;
use crate::engine::SyncEngine;
use crate::host::{DocumentHost, SessionUi, Transport};
use crate::session::ShareSession;
use collab_common::SessionIdentity;
use collab_config::Config;
use std::time::Duration;

/// Owns the transport and at most one active [`ShareSession`]
pub struct SessionManager<T, H, U> {
    transport: T,
    active: Option<ShareSession<H, U>>,
    engine: SyncEngine,
    poll_interval: Duration,
    /// Local user, from `[session] user`
    user: String,
}

impl<T: Transport, H: DocumentHost, U: SessionUi> SessionManager<T, H, U> {
    pub fn new(transport: T, config: &Config) -> crate::Result<Self> {
        let matching = MatchConfig::try_from(&config.matching)?;
        Ok(Self {
            transport,
            active: None,
            engine: SyncEngine::new(matching),
            poll_interval: config.session.poll_interval(),
            user: config.session.user.clone(),
        })
    }

    /// Build a session for `path` in `project` as the configured local user,
    /// using this manager's matching settings.
    pub fn session(&self, project: &str, path: &str, host: H, ui: U) -> ShareSession<H, U> {
        let identity = SessionIdentity::new(self.user.as_str(), project, path);
        ShareSession::new(identity, host, ui, self.engine.clone())
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Make `session` the shared document.
    ///
    /// Returns the previously active session after unsharing it. Switching to
    /// the key that is already shared changes nothing and drops `session`.
    pub fn switch_target(&mut self, session: ShareSession<H, U>) -> Option<ShareSession<H, U>> {
        if let Some(current) = &self.active {
            if current.key() == session.key() {
                tracing::debug!(key = %session.key(), "already shared");
                return None;
            }
        }

        let previous = self.close();

        tracing::info!(key = %session.key(), "sharing");
        self.transport.share(session.key());
        self.active = Some(session);

        previous
    }

    /// Unshare and return the active session, if any.
    pub fn close(&mut self) -> Option<ShareSession<H, U>> {
        let previous = self.active.take()?;
        tracing::info!(key = %previous.key(), "unsharing");
        self.transport.unshare(&[previous.key().to_string()]);
        Some(previous)
    }

    /// Hand a server message to the transport and schedule the next poll.
    pub fn deliver(&mut self, message: &str) {
        self.transport.reflect(message);
        self.transport.schedule_poll(self.poll_interval);
    }

    pub fn active(&self) -> Option<&ShareSession<H, U>> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ShareSession<H, U>> {
        self.active.as_mut()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
