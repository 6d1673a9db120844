//! chlog: AI-generated changelog entries from git history (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod env;
pub mod history;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod schema;
pub mod store;
pub mod validate;
