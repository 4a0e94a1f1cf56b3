//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir (settings + shortcut table):
//!   Windows: %APPDATA%\transcript-reconcile\
//!   macOS:   ~/Library/Application Support/transcript-reconcile/
//!   Linux:   ~/.config/transcript-reconcile/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `shortcuts.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `shortcuts.json`.
    pub shortcuts_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "transcript-reconcile";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let shortcuts_file = config_dir.join("shortcuts.json");

        Self {
            config_dir,
            settings_file,
            shortcuts_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
