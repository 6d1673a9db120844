//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

use chlog::config::Overrides;
use chlog::constants::DEFAULT_CHANGELOG_FILE;

/// Generate changelog entries from git history with an LLM.
#[derive(Parser, Debug)]
#[command(name = chlog::constants::APP_NAME, version = chlog::constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Generate a changelog entry for a commit range.
    Generate(Box<GenerateArgs>),

    /// List supported providers and models.
    Models(ModelsArgs),

    /// Create a changelog file with title, description and repository metadata.
    Init(InitArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Version of the release (default: the release date).
    pub version: Option<String>,

    // --- Range ---
    /// Start of the commit range (exclusive).
    #[arg(short, long, default_value = "HEAD~1")]
    pub from: String,

    /// End of the commit range (inclusive).
    #[arg(short, long, default_value = "HEAD")]
    pub to: String,

    /// Release date in YYYY-MM-DD format (default: today).
    #[arg(short, long)]
    pub date: Option<String>,

    // --- Provider ---
    /// LLM provider: openai, gemini.
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model name (default: the provider's first supported model).
    #[arg(short, long)]
    pub model: Option<String>,

    /// API key for the provider.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL of an API-compatible server.
    #[arg(long)]
    pub base_url: Option<String>,

    // --- Output ---
    /// Changelog file to prepend the entry to.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Pretty-print the generated entry.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Comma-separated tag vocabulary.
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Print the commit range and debug logs.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Config file to use instead of ./chlog.toml.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// The flags that participate in config layering.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            file: self.file.clone(),
            tags: self.tags.iter().map(|t| t.trim().to_string()).collect(),
            pretty: self.pretty,
            verbose: self.verbose,
        }
    }
}

/// Arguments for the `models` subcommand.
#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Provider to list, or "all".
    #[arg(short, long, default_value = "all")]
    pub provider: String,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Changelog file to create.
    #[arg(long, default_value = DEFAULT_CHANGELOG_FILE)]
    pub file: PathBuf,

    /// Changelog title (default: the current directory name).
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Repository URL.
    #[arg(long, default_value = "")]
    pub repository: String,

    /// Also write a starter chlog.toml pointing at the changelog file.
    #[arg(long, default_value_t = false)]
    pub with_config: bool,

    /// Provider recorded in the starter config.
    #[arg(short, long, default_value = "openai", requires = "with_config")]
    pub provider: String,

    /// Overwrite existing files.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
