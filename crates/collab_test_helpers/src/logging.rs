//! Test logging configuration utilities
//!
//! Global test logging goes through the test writer so it only shows up for
//! failing tests. [`capture_logs`] collects the output of a single closure
//! for tests that assert on diagnostics (dropped patches, raised errors).

use std::io;
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize tracing for tests with custom log level
///
/// Only the first call per test process installs a subscriber; `RUST_LOG`
/// overrides `level` when set.
pub fn init_test_logging(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .compact()
            .try_init();
    });
}

/// Suppress all logs for clean test output
pub fn suppress_logs() {
    init_test_logging("error");
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Buffer {
    type Writer = Buffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a scoped subscriber and return its result with the log text.
///
/// # Example
///
/// ```rust
/// use collab_test_helpers::logging::capture_logs;
///
/// let (_, logs) = capture_logs("warn", || tracing::warn!("patch failed"));
/// assert!(logs.contains("patch failed"));
/// ```
pub fn capture_logs<R>(level: &str, f: impl FnOnce() -> R) -> (R, String) {
    let buffer = Buffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().expect("log buffer poisoned").clone();
    (result, String::from_utf8_lossy(&bytes).into_owned())
}
