//! chlog: AI-generated changelog entries from git history.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use chlog::config;
use chlog::env;
use chlog::history;
use chlog::models;
use chlog::pipeline;
use chlog::providers;
use chlog::store;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use strum::IntoEnumIterator;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cli::args::{Cli, Command, GenerateArgs, InitArgs, ModelsArgs};
use config::Config;
use env::Env;
use history::GitHistory;
use models::{ProviderName, ReleaseInfo};
use pipeline::{GenerateRequest, Generator};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(*args).await,
        Command::Models(args) => run_models(args),
        Command::Init(args) => run_init(args),
    }
}

/// Send logs to stderr. `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "chlog=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Generate an entry, print it and optionally prepend it to the changelog.
async fn run_generate(args: GenerateArgs) -> Result<()> {
    let env = Env::real();
    let cwd = std::env::current_dir().context("failed to determine working directory")?;

    let config = Config::load(args.config.as_deref(), &cwd, &env)
        .context("failed to load configuration")?
        .resolve(args.overrides(), &env)
        .context("invalid configuration")?;
    init_logging(config.output.verbose);
    tracing::debug!(?config, "resolved configuration");

    let date = match &args.date {
        Some(d) => config::parse_date(d)?,
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    let version = args.version.clone().unwrap_or_else(|| date.clone());

    // Bad refs and a missing git binary should fail before any API client exists.
    let git = GitHistory::new(&cwd);
    git.ensure_installed().await?;
    git.verify_ref(&args.from).await?;
    git.verify_ref(&args.to).await?;

    let provider = providers::build_provider(&config.provider)?;
    let mut generator = Generator::new(
        Arc::new(git),
        Arc::from(provider),
        config.provider.model(),
        &config.changelog.tags,
    );
    if config.output.verbose {
        let (from, to) = (args.from.clone(), args.to.clone());
        generator = generator.on_commit_log(move |lines| cli::print_commit_log(&from, &to, lines));
    }

    let request = GenerateRequest {
        release: ReleaseInfo {
            version,
            date,
            from_ref: args.from.clone(),
            to_ref: args.to.clone(),
        },
        file: config.changelog.file.clone(),
    };
    let outcome = generator
        .run(&request)
        .await
        .context("failed to generate changelog entry")?;

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&outcome.entry)?
    } else {
        serde_json::to_string(&outcome.entry)?
    };
    println!("{json}");

    cli::print_usage(&outcome.usage);
    if let Some(path) = &outcome.written_to {
        eprintln!("{} {}", "Changelog updated:".green(), path.display());
    }
    Ok(())
}

/// List providers, their models and API key variables.
fn run_models(args: ModelsArgs) -> Result<()> {
    let providers = if args.provider.eq_ignore_ascii_case("all") {
        ProviderName::iter().collect()
    } else {
        let name: ProviderName = args
            .provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        vec![name]
    };
    print!("{}", cli::render_models(&providers));
    Ok(())
}

/// Write a keyed changelog file, and optionally a starter config.
fn run_init(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let title = args.title.clone().unwrap_or_else(|| default_title(&cwd));

    // Check the config target first so a refusal leaves nothing half-written.
    let starter = if args.with_config {
        let provider: ProviderName = args
            .provider
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let config_path = cwd.join(chlog::constants::CONFIG_FILENAME);
        if config_path.exists() && !args.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            );
        }
        Some((provider, config_path))
    } else {
        None
    };

    let document = store::ChangelogDocument {
        title,
        description: args.description.clone(),
        repository: args.repository.clone(),
        entries: Vec::new(),
    };
    store::init(&args.file, &document, args.force)?;
    eprintln!("{} {}", "Created".green(), args.file.display());

    if let Some((provider, config_path)) = starter {
        let rendered = config::starter_config(provider, &args.file)?;
        std::fs::write(&config_path, rendered)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        eprintln!("{} {}", "Created".green(), config_path.display());
        eprintln!(
            "{}",
            format!(
                "Set {} (or {}) to your API key before running `chlog generate`.",
                provider.api_key_env_var(),
                chlog::constants::ENV_API_KEY
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Name of the working directory, or "Changelog".
fn default_title(cwd: &Path) -> String {
    cwd.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| "Changelog".to_string())
}
