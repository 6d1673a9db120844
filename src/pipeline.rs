//! End-to-end generation: history → prompt → model → validate → normalize → store.
//!
//! Every stage is awaited in order. Nothing is written unless all earlier
//! stages succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::history::{HistoryError, HistorySource};
use crate::models::{ChangelogEntry, ReleaseInfo};
use crate::normalize::normalize;
use crate::prompt;
use crate::providers::{ChangelogProvider, ProviderError, TokenUsage};
use crate::schema::SchemaDefinition;
use crate::store::{self, StoreError};
use crate::validate::{SchemaViolation, validate};

/// Errors from a generation run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no commits between '{from}' and '{to}'")]
    EmptyRange { from: String, to: String },
}

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub release: ReleaseInfo,
    /// Changelog to prepend the entry to. `None` only returns the entry.
    pub file: Option<PathBuf>,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub entry: ChangelogEntry,
    pub usage: TokenUsage,
    /// `"<short hash> <subject>"` lines for the range, newest first.
    pub commit_log: Vec<String>,
    pub written_to: Option<PathBuf>,
}

/// Receives the commit list before the model is called.
pub type CommitLogListener = Box<dyn Fn(&[String]) + Send + Sync>;

/// Runs the generation stages against a history source and a model backend.
pub struct Generator {
    history: Arc<dyn HistorySource>,
    provider: Arc<dyn ChangelogProvider>,
    model: String,
    schema: SchemaDefinition,
    on_commit_log: Option<CommitLogListener>,
}

impl Generator {
    pub fn new(
        history: Arc<dyn HistorySource>,
        provider: Arc<dyn ChangelogProvider>,
        model: impl Into<String>,
        tags: &[String],
    ) -> Self {
        Self {
            history,
            provider,
            model: model.into(),
            schema: SchemaDefinition::changelog_entry(tags),
            on_commit_log: None,
        }
    }

    /// Report the commit list as soon as it is known, ahead of the model call.
    pub fn on_commit_log(mut self, listener: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.on_commit_log = Some(Box::new(listener));
        self
    }

    pub async fn run(&self, request: &GenerateRequest) -> Result<GenerateOutcome, PipelineError> {
        let release = &request.release;
        let (from, to) = (release.from_ref.as_str(), release.to_ref.as_str());

        let ids = self.history.commit_range(from, to).await?;
        if ids.is_empty() {
            return Err(PipelineError::EmptyRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let commit_log = self.history.log_range(from, to).await?;
        tracing::debug!(commits = ids.len(), from, to, "collected commit range");
        if let Some(listener) = &self.on_commit_log {
            listener(&commit_log);
        }

        let mut blobs = Vec::with_capacity(ids.len());
        for id in &ids {
            blobs.push(self.history.commit_details(id).await?);
        }

        let prompt = prompt::build(self.schema.tag_vocabulary(), &blobs);
        tracing::debug!(prompt_len = prompt.len(), model = %self.model, "sending prompt");

        let generation = self.provider.generate(&prompt, &self.schema, &self.model).await?;
        tracing::info!(
            input_tokens = generation.usage.input_tokens,
            output_tokens = generation.usage.output_tokens,
            "model responded"
        );

        let entry = validate(&generation.raw_text, &self.schema)?;
        let entry = normalize(entry, release);

        if let Some(path) = &request.file {
            let mut changelog = store::load(path)?;
            changelog.prepend(entry.clone());
            store::save(path, &changelog.shape, &changelog.entries)?;
        }

        Ok(GenerateOutcome {
            entry,
            usage: generation.usage,
            commit_log,
            written_to: request.file.clone(),
        })
    }
}
