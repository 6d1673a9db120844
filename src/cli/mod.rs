//! CLI command definitions and terminal output.
//!
//! Uses clap derive macros for argument definitions. Generated JSON goes
//! to stdout; everything meant for a human goes to stderr.

pub mod args;

use std::io::Write;

use colored::Colorize;

use chlog::models::ProviderName;
use chlog::providers::TokenUsage;

/// Print the commits a run is about to describe.
pub fn print_commit_log(from: &str, to: &str, lines: &[String]) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(
        handle,
        "{} {}..{} ({} commits)",
        "Commits".bold(),
        from.cyan(),
        to.cyan(),
        lines.len()
    );
    for line in lines {
        match line.split_once(' ') {
            Some((hash, subject)) => {
                let _ = writeln!(handle, "  {} {}", hash.yellow(), subject);
            }
            None => {
                let _ = writeln!(handle, "  {}", line.yellow());
            }
        }
    }
    let _ = writeln!(handle);
}

/// Print the token usage summary.
pub fn print_usage(usage: &TokenUsage) {
    eprintln!(
        "{} {} input, {} output",
        "Tokens used:".dimmed(),
        usage.input_tokens.to_string().bold(),
        usage.output_tokens.to_string().bold(),
    );
}

/// Render the provider/model listing. The first model of each provider is its default.
pub fn render_models(providers: &[ProviderName]) -> String {
    let mut out = String::new();
    for (i, provider) in providers.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{}  {}\n",
            provider.to_string().bold(),
            format!("(API key: {})", provider.api_key_env_var()).dimmed()
        ));
        for (j, model) in provider.supported_models().iter().enumerate() {
            if j == 0 {
                out.push_str(&format!("  {} {}\n", model, "(default)".green()));
            } else {
                out.push_str(&format!("  {model}\n"));
            }
        }
    }
    out
}
