//! Shared test helpers for the agent configuration crates.
//!
//! Provides an environment-variable guard that restores the previous state
//! on drop, and a temporary config file helper. Tests that touch process
//! environment variables are process-global and must also be serialized;
//! the crates use `serial_test` for that.

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Sets environment variables for the duration of a scope, restoring the
/// previous values (or absence) on drop.
///
/// Tests using this must run under `#[serial]`.
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }

    fn save(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.save(key);
        std::env::set_var(key, value);
    }

    pub fn unset(&mut self, key: &str) {
        self.save(key);
        std::env::remove_var(key);
    }
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // Restore in reverse so nested set/unset of the same key unwinds.
        for (key, value) in self.saved.drain(..).rev() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Write a config file into a fresh temporary directory, returning the
/// directory guard (keep it alive) and the file path.
pub fn write_temp_config(file_name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join(file_name);
    let mut file = std::fs::File::create(&path).expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    (dir, path)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
