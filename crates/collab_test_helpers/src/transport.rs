//! Transport double that records every call

use collab_sync::Transport;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Share(String),
    Unshare(Vec<String>),
    Reflect(String),
    SchedulePoll(Duration),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    pub calls: Vec<TransportCall>,
}

impl RecordingTransport {
    /// Keys currently shared, in share order
    pub fn shared(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for call in &self.calls {
            match call {
                TransportCall::Share(key) => keys.push(key.clone()),
                TransportCall::Unshare(gone) => keys.retain(|k| !gone.contains(k)),
                _ => {}
            }
        }
        keys
    }
}

impl Transport for RecordingTransport {
    fn share(&mut self, key: &str) {
        self.calls.push(TransportCall::Share(key.to_string()));
    }

    fn unshare(&mut self, keys: &[String]) {
        self.calls.push(TransportCall::Unshare(keys.to_vec()));
    }

    fn reflect(&mut self, message: &str) {
        self.calls.push(TransportCall::Reflect(message.to_string()));
    }

    fn schedule_poll(&mut self, delay: Duration) {
        self.calls.push(TransportCall::SchedulePoll(delay));
    }
}
