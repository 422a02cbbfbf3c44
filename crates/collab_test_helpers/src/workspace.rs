//! Temporary project directories for config tests

use assert_fs::prelude::*;
use assert_fs::TempDir;
use collab_config::CONFIG_FILE;

/// Create a temporary directory for testing
///
/// The directory will be automatically cleaned up when the `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a project whose `.collab/config.toml` holds `toml`
///
/// # Example
///
/// ```rust
/// use collab_test_helpers::workspace::project_with_config;
///
/// let project = project_with_config("[session]\nuser = \"carl\"\n");
/// assert!(project.path().join(".collab/config.toml").exists());
/// ```
pub fn project_with_config(toml: &str) -> TempDir {
    let project = temp_dir();
    project
        .child(CONFIG_FILE)
        .write_str(toml)
        .expect("Failed to write config file");
    project
}
