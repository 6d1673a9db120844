//! Shared types used across all modules.
//!
//! This module defines the changelog data model and the provider
//! registry. Other modules import from here rather than reaching into
//! each other's internals.

pub mod changelog;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

pub use changelog::{ChangelogChange, ChangelogEntry, ReleaseInfo};

/// Supported LLM provider backends.
///
/// The set is closed: a name that does not parse here is rejected before
/// any HTTP client exists.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderName {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProviderName::iter()
            .find(|p| p.to_string() == wanted)
            .ok_or_else(|| {
                format!(
                    "unsupported provider: '{s}'. Supported: {}",
                    ProviderName::names().join(", ")
                )
            })
    }
}

impl ProviderName {
    /// Names of every supported provider, in listing order.
    pub fn names() -> Vec<String> {
        ProviderName::iter().map(|p| p.to_string()).collect()
    }

    /// Models known to work with structured output, default first.
    pub fn supported_models(self) -> &'static [&'static str] {
        match self {
            ProviderName::OpenAI => &["gpt-4o-mini", "gpt-4.1-mini"],
            ProviderName::Gemini => &["gemini-2.0-flash"],
        }
    }

    /// The model used when none is configured.
    pub fn default_model(self) -> &'static str {
        self.supported_models()[0]
    }

    pub fn is_supported_model(self, model: &str) -> bool {
        self.supported_models().contains(&model)
    }

    /// Returns the provider-specific environment variable name for the API key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::OpenAI => "OPENAI_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Public API endpoint, overridable with `base_url`.
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderName::OpenAI => "https://api.openai.com/v1",
            ProviderName::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}
