//! Shared test utilities for the collaboration test suites
//!
//! This crate provides in-memory stand-ins for the editor, its chrome and
//! the transport, so sessions can be driven without a browser or a server.
//!
//! # Modules
//!
//! - [`host`]: In-memory document with a selection and read-only flag
//! - [`ui`]: Records roster updates and error banners
//! - [`transport`]: Records share/unshare/poll calls
//! - [`workspace`]: Temporary projects with a config file
//! - [`logging`]: Test logging configuration
//! - [`assertions`]: Domain-specific assertion helpers
//!
//! # Example
//!
//! ```rust
//! use collab_test_helpers::prelude::*;
//!
//! let mut host = MemoryHost::new("hello\nworld");
//! host.select(Position::new(1, 2), Position::new(1, 2));
//! assert_eq!(host.text(), "hello\nworld");
//! ```

pub mod assertions;
pub mod host;
pub mod logging;
pub mod transport;
pub mod ui;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::host::MemoryHost;
    pub use crate::logging::{capture_logs, init_test_logging, suppress_logs};
    pub use crate::transport::{RecordingTransport, TransportCall};
    pub use crate::ui::RecordingUi;
    pub use crate::workspace::{project_with_config, temp_dir};
    pub use collab_sync::{DocumentHost, Position, Range, SessionUi, Transport};
    pub use predicates::Predicate;
}
