//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `--config <path>`, or `chlog.toml` in the working directory
//! 4. `~/.config/chlog/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! Invalid values halt loading. Nothing is silently replaced by a default
//! except an unset model, which becomes the provider's first supported one.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{CONFIG_DIR, CONFIG_FILENAME, DEFAULT_TAGS, ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_PROVIDER};
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    #[error("invalid model '{model}' for provider '{provider}'. Supported models are: {supported}")]
    InvalidModel {
        model: String,
        provider: ProviderName,
        supported: String,
    },

    #[error("invalid date '{0}'. Use YYYY-MM-DD format")]
    InvalidDate(String),

    #[error("the tag vocabulary must not be empty")]
    EmptyTags,

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub changelog: ChangelogConfig,
    pub output: OutputConfig,
}

/// LLM provider configuration.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    /// `None` until resolved to the provider's default model.
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Transport timeout for the model call. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// The configured model, or the provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.name.default_model())
    }
}

/// Changelog file and tag vocabulary.
#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    /// Changelog to update. When unset the entry is only printed.
    pub file: Option<PathBuf>,
    pub tags: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: None,
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Terminal output options.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub pretty: bool,
    pub verbose: bool,
}

/// Values given on the command line. `None`/`false`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub file: Option<PathBuf>,
    pub tags: Vec<String>,
    pub pretty: bool,
    pub verbose: bool,
}

/// On-disk layout; every field optional so layers only override what they set.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    provider: ProviderSection,
    changelog: ChangelogSection,
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct ProviderSection {
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct ChangelogSection {
    file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct OutputSection {
    pretty: Option<bool>,
    verbose: Option<bool>,
}

impl Config {
    /// Load configuration with file and environment layering.
    ///
    /// `explicit` is a `--config` path and must exist; otherwise
    /// `chlog.toml` in `cwd` is used when present.
    pub fn load(explicit: Option<&Path>, cwd: &Path, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge_file(&global_path)?;
            }
        }

        // Layer 3: explicit or working-directory config
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                config.merge_file(path)?;
            }
            None => {
                let local_path = cwd.join(CONFIG_FILENAME);
                if local_path.exists() {
                    config.merge_file(&local_path)?;
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env)?;

        Ok(config)
    }

    /// Apply CLI flags, then fill in and check whatever is still derived.
    ///
    /// The provider-specific API key variable is consulted here, after the
    /// provider is final.
    pub fn resolve(mut self, overrides: Overrides, env: &Env) -> Result<Self, ConfigError> {
        if let Some(name) = overrides.provider {
            self.provider.name = name.parse().map_err(ConfigError::InvalidProvider)?;
        }
        if overrides.model.is_some() {
            self.provider.model = overrides.model;
        }
        if overrides.api_key.is_some() {
            self.provider.api_key = overrides.api_key;
        }
        if overrides.base_url.is_some() {
            self.provider.base_url = overrides.base_url;
        }
        if overrides.file.is_some() {
            self.changelog.file = overrides.file;
        }
        if !overrides.tags.is_empty() {
            self.changelog.tags = overrides.tags;
        }
        self.output.pretty |= overrides.pretty;
        self.output.verbose |= overrides.verbose;

        if self.provider.api_key.is_none() {
            self.provider.api_key = env.var(self.provider.name.api_key_env_var());
        }

        let name = self.provider.name;
        let model = self
            .provider
            .model
            .get_or_insert_with(|| name.default_model().to_string());
        // Custom endpoints serve models outside the registry.
        if self.provider.base_url.is_none() && !name.is_supported_model(model) {
            return Err(ConfigError::InvalidModel {
                model: model.clone(),
                provider: name,
                supported: name.supported_models().join(", "),
            });
        }

        self.changelog.tags.retain(|t| !t.trim().is_empty());
        if self.changelog.tags.is_empty() {
            return Err(ConfigError::EmptyTags);
        }

        Ok(self)
    }

    /// Load a config file and merge it over `self`.
    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.merge(file, base_dir)
    }

    /// Merge a parsed file over `self`. Relative changelog paths are taken
    /// relative to the directory of the file that set them.
    fn merge(&mut self, other: ConfigFile, base_dir: &Path) -> Result<(), ConfigError> {
        let provider = other.provider;
        if let Some(name) = provider.name {
            self.provider.name = name.parse().map_err(ConfigError::InvalidProvider)?;
        }
        if provider.model.is_some() {
            self.provider.model = provider.model;
        }
        if provider.api_key.is_some() {
            self.provider.api_key = provider.api_key;
        }
        if provider.base_url.is_some() {
            self.provider.base_url = provider.base_url;
        }
        if provider.timeout_secs.is_some() {
            self.provider.timeout_secs = provider.timeout_secs;
        }

        if let Some(file) = other.changelog.file {
            self.changelog.file = Some(base_dir.join(file));
        }
        if let Some(tags) = other.changelog.tags {
            self.changelog.tags = tags.iter().map(|t| t.trim().to_string()).collect();
        }

        if let Some(pretty) = other.output.pretty {
            self.output.pretty = pretty;
        }
        if let Some(verbose) = other.output.verbose {
            self.output.verbose = verbose;
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) -> Result<(), ConfigError> {
        if let Some(val) = env.var(ENV_PROVIDER) {
            self.provider.name = val
                .parse()
                .map_err(|e| ConfigError::InvalidProvider(format!("{ENV_PROVIDER}: {e}")))?;
        }
        if let Some(val) = env.var(ENV_MODEL) {
            self.provider.model = Some(val);
        }
        if let Some(val) = env.var(ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }
        if let Some(val) = env.var(ENV_API_KEY) {
            self.provider.api_key = Some(val);
        }
        Ok(())
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join("config.toml"))
    }
}

/// Render a starter `chlog.toml` for `provider` writing to `file`.
pub fn starter_config(provider: ProviderName, file: &Path) -> Result<String, ConfigError> {
    let config = ConfigFile {
        provider: ProviderSection {
            name: Some(provider.to_string()),
            model: Some(provider.default_model().to_string()),
            ..ProviderSection::default()
        },
        changelog: ChangelogSection {
            file: Some(file.to_path_buf()),
            tags: None,
        },
        output: OutputSection {
            pretty: Some(false),
            verbose: Some(false),
        },
    };
    Ok(toml::to_string(&config)?)
}

/// Check a `YYYY-MM-DD` date, returning it unchanged.
pub fn parse_date(date: &str) -> Result<String, ConfigError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ConfigError::InvalidDate(date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.model(), "gpt-4o-mini");
        assert_eq!(config.changelog.tags.len(), DEFAULT_TAGS.len());
        assert!(config.changelog.file.is_none());
        assert!(!config.output.pretty);
    }

    #[test]
    fn loads_local_config_from_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chlog.toml"),
            r#"
[provider]
name = "gemini"
timeout_secs = 30

[changelog]
file = "CHANGELOG.json"
tags = ["feature", "fix"]

[output]
pretty = true
"#,
        )
        .unwrap();

        let config = Config::load(None, dir.path(), &no_env()).unwrap();
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.timeout_secs, Some(30));
        assert_eq!(config.changelog.file, Some(dir.path().join("CHANGELOG.json")));
        assert_eq!(config.changelog.tags, vec!["feature", "fix"]);
        assert!(config.output.pretty);
    }

    #[test]
    fn file_tags_are_trimmed_like_flag_tags() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chlog.toml"),
            "[changelog]\ntags = [\" fixed \", \"added\", \"  \"]\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path(), &no_env())
            .unwrap()
            .resolve(Overrides::default(), &Env::mock([("OPENAI_API_KEY", "k")]))
            .unwrap();
        assert_eq!(config.changelog.tags, vec!["fixed", "added"]);
    }

    #[test]
    fn explicit_config_resolves_file_relative_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("conf");
        std::fs::create_dir(&nested).unwrap();
        let path = nested.join("custom.toml");
        std::fs::write(&path, "[changelog]\nfile = \"../changelog.json\"\n").unwrap();

        let config = Config::load(Some(&path), dir.path(), &no_env()).unwrap();
        assert_eq!(config.changelog.file, Some(nested.join("../changelog.json")));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path(), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chlog.toml"), "not valid {{ toml").unwrap();
        let err = Config::load(None, dir.path(), &no_env()).unwrap_err();
        assert!(err.to_string().contains("parse"), "got: {err}");
    }

    #[test]
    fn unknown_provider_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chlog.toml"), "[provider]\nname = \"claude\"\n").unwrap();
        let err = Config::load(None, dir.path(), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProvider(_)), "got: {err:?}");
    }

    #[test]
    fn env_vars_override_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chlog.toml"), "[provider]\nname = \"openai\"\n").unwrap();
        let env = Env::mock([
            ("CHLOG_PROVIDER", "gemini"),
            ("CHLOG_API_KEY", "env-key"),
            ("CHLOG_BASE_URL", "http://localhost:8080"),
        ]);
        let config = Config::load(None, dir.path(), &env).unwrap();
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.provider.base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn invalid_env_provider_halts() {
        let env = Env::mock([("CHLOG_PROVIDER", "not-a-provider")]);
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(None, dir.path(), &env).unwrap_err();
        assert!(err.to_string().contains("CHLOG_PROVIDER"), "got: {err}");
    }

    #[test]
    fn resolve_applies_flags_and_provider_key() {
        let env = Env::mock([("GEMINI_API_KEY", "g-key"), ("OPENAI_API_KEY", "o-key")]);
        let overrides = Overrides {
            provider: Some("gemini".into()),
            pretty: true,
            ..Overrides::default()
        };
        let config = Config::default().resolve(overrides, &env).unwrap();
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.provider.model.as_deref(), Some("gemini-2.0-flash"));
        assert!(config.output.pretty);
    }

    #[test]
    fn resolve_prefers_explicit_api_key() {
        let env = Env::mock([("OPENAI_API_KEY", "o-key")]);
        let overrides = Overrides {
            api_key: Some("flag-key".into()),
            ..Overrides::default()
        };
        let config = Config::default().resolve(overrides, &env).unwrap();
        assert_eq!(config.provider.api_key.as_deref(), Some("flag-key"));
    }

    #[test]
    fn resolve_rejects_unknown_provider_flag() {
        let overrides = Overrides {
            provider: Some("llama".into()),
            ..Overrides::default()
        };
        let err = Config::default().resolve(overrides, &no_env()).unwrap_err();
        assert!(err.to_string().contains("unsupported provider: 'llama'"), "got: {err}");
    }

    #[test]
    fn resolve_rejects_model_of_other_provider() {
        let overrides = Overrides {
            provider: Some("gemini".into()),
            model: Some("gpt-4o-mini".into()),
            ..Overrides::default()
        };
        let err = Config::default().resolve(overrides, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModel { .. }), "got: {err:?}");
        assert!(err.to_string().contains("gemini-2.0-flash"));
    }

    #[test]
    fn resolve_accepts_any_model_with_custom_base_url() {
        let overrides = Overrides {
            model: Some("llama3.1".into()),
            base_url: Some("http://localhost:11434/v1".into()),
            ..Overrides::default()
        };
        let config = Config::default().resolve(overrides, &no_env()).unwrap();
        assert_eq!(config.provider.model(), "llama3.1");
    }

    #[test]
    fn resolve_rejects_blank_tag_vocabulary() {
        let overrides = Overrides {
            tags: vec![" ".into()],
            ..Overrides::default()
        };
        let err = Config::default().resolve(overrides, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTags));
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(parse_date("2024-01-01").unwrap(), "2024-01-01");
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("01/02/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn starter_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let rendered = starter_config(ProviderName::Gemini, Path::new("changelog.json")).unwrap();
        assert!(!rendered.contains("api_key"));
        std::fs::write(dir.path().join("chlog.toml"), rendered).unwrap();

        let config = Config::load(None, dir.path(), &no_env()).unwrap();
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.model(), "gemini-2.0-flash");
        assert_eq!(config.changelog.file, Some(dir.path().join("changelog.json")));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let provider = ProviderConfig {
            api_key: Some("sk-secret".into()),
            ..ProviderConfig::default()
        };
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
