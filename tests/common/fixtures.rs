//! Environment helpers for tests that load configuration in-process.

use std::ffi::OsString;
use std::path::Path;

const CONFIG_ENV: &str = "PAGEWISE_CONFIG";

/// RAII guard that points PAGEWISE_CONFIG at `path` and restores it on drop.
///
/// Snapshots the current value before setting it, and restores the original
/// value (or removes it) on drop, even if the test panics.
///
/// # Example
///
/// ```ignore
/// #[test]
/// #[serial]
/// fn test_with_config() {
///     let dir = tempfile::TempDir::new().unwrap();
///     let _guard = ConfigEnvGuard::new(&dir.path().join("config.yaml"));
///     // Config::load() now reads from the temp directory
/// }
/// ```
pub struct ConfigEnvGuard {
    original: Option<OsString>,
}

impl ConfigEnvGuard {
    /// # Safety
    /// This modifies the process environment. Tests using this should be marked with `#[serial]`.
    pub fn new(path: &Path) -> Self {
        let original = std::env::var_os(CONFIG_ENV);
        // SAFETY: Tests using this should be marked #[serial] to ensure single-threaded access
        unsafe { std::env::set_var(CONFIG_ENV, path) };
        Self { original }
    }
}

impl Drop for ConfigEnvGuard {
    fn drop(&mut self) {
        // SAFETY: Tests using ConfigEnvGuard are marked #[serial]
        match &self.original {
            Some(value) => unsafe { std::env::set_var(CONFIG_ENV, value) },
            None => unsafe { std::env::remove_var(CONFIG_ENV) },
        }
    }
}
