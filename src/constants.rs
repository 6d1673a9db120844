//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and file-format keys so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "chlog";

/// Crate version, shown by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "chlog.toml";

/// Directory name under `~/.config/` for the global config.
pub const CONFIG_DIR: &str = "chlog";

/// Default changelog path used by `chlog init`.
pub const DEFAULT_CHANGELOG_FILE: &str = "changelog.json";

/// Field holding the entry list in a keyed changelog document.
pub const ENTRIES_KEY: &str = "entries";

/// Line that introduces each commit in the prompt.
pub const COMMIT_SENTINEL: &str = "--- COMMIT ---";

/// Maximum length of a derived change id.
pub const ID_MAX_LEN: usize = 40;

/// Tag vocabulary used when none is configured (Keep a Changelog categories).
pub const DEFAULT_TAGS: &[&str] = &["added", "changed", "removed", "deprecated", "security", "fixed"];

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "CHLOG_PROVIDER";
pub const ENV_MODEL: &str = "CHLOG_MODEL";
pub const ENV_API_KEY: &str = "CHLOG_API_KEY";
pub const ENV_BASE_URL: &str = "CHLOG_BASE_URL";
