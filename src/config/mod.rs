//! Configuration loading and layering.
//!
//! Handles `chlog.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{ChangelogConfig, Config, ConfigError, OutputConfig, Overrides, ProviderConfig, parse_date, starter_config};
