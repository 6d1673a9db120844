//! Git CLI wrapper for reading commit ranges.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{HistoryError, HistorySource};

/// History reader backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_root: PathBuf,
}

impl GitHistory {
    /// Read history of the repository containing `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Fail early when `git` cannot be executed at all.
    pub async fn ensure_installed(&self) -> Result<(), HistoryError> {
        self.git(&["--version"]).await.map(|_| ())
    }

    /// Check that `reference` resolves to a commit.
    pub async fn verify_ref(&self, reference: &str) -> Result<(), HistoryError> {
        let target = format!("{reference}^{{commit}}");
        match self.git(&["rev-parse", "--verify", "--quiet", &target]).await {
            Ok(_) => Ok(()),
            Err(HistoryError::Git(_)) => Err(HistoryError::InvalidRef(reference.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn verify_range(&self, from: &str, to: &str) -> Result<(), HistoryError> {
        self.verify_ref(from).await?;
        self.verify_ref(to).await
    }

    /// Run git with `args` in the repository and return stdout.
    async fn git(&self, args: &[&str]) -> Result<String, HistoryError> {
        let output = tokio::process::Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => HistoryError::ToolUnavailable(e.to_string()),
                _ => HistoryError::Git(format!("failed to run git: {e}")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::Git(format!(
                "git {} failed ({}): {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            )));
        }

        // Diffs of binary or legacy-encoded files are not always UTF-8.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn non_empty_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl HistorySource for GitHistory {
    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<String>, HistoryError> {
        self.verify_range(from, to).await?;
        let range = format!("{from}..{to}");
        let out = self.git(&["log", "--pretty=format:%h %s", &range]).await?;
        Ok(non_empty_lines(&out))
    }

    async fn commit_range(&self, from: &str, to: &str) -> Result<Vec<String>, HistoryError> {
        self.verify_range(from, to).await?;
        let range = format!("{from}..{to}");
        let out = self.git(&["rev-list", "--reverse", &range]).await?;
        Ok(non_empty_lines(&out))
    }

    async fn commit_details(&self, id: &str) -> Result<String, HistoryError> {
        self.git(&["show", "--no-color", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    async fn run_git(dir: &Path, args: &[&str]) {
        let status = tokio::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .unwrap()
            .status;
        assert!(status.success(), "git {args:?} failed");
    }

    /// Create a repo with one commit per message; each touches its own file.
    async fn repo_with_commits(messages: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        run_git(p, &["init", "-b", "main"]).await;
        run_git(p, &["config", "user.email", "test@test.com"]).await;
        run_git(p, &["config", "user.name", "Test"]).await;
        run_git(p, &["config", "commit.gpgsign", "false"]).await;
        for (i, msg) in messages.iter().enumerate() {
            tokio::fs::write(p.join(format!("file{i}.txt")), format!("content {i}\n"))
                .await
                .unwrap();
            run_git(p, &["add", "."]).await;
            run_git(p, &["commit", "-m", msg]).await;
        }
        dir
    }

    #[tokio::test]
    async fn commit_range_is_oldest_first() {
        let dir = repo_with_commits(&["init", "fix: null check", "feat: add retry"]).await;
        let history = GitHistory::new(dir.path());

        let commits = history.commit_range("HEAD~2", "HEAD").await.unwrap();
        assert_eq!(commits.len(), 2);

        let first = history.commit_details(&commits[0]).await.unwrap();
        let second = history.commit_details(&commits[1]).await.unwrap();
        assert!(first.contains("fix: null check"));
        assert!(second.contains("feat: add retry"));
        assert!(second.contains("+content 2"), "details should include the diff");
    }

    #[tokio::test]
    async fn log_range_lists_short_hash_and_subject() {
        let dir = repo_with_commits(&["init", "fix: null check", "feat: add retry"]).await;
        let history = GitHistory::new(dir.path());

        let lines = history.log_range("HEAD~2", "HEAD").await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" feat: add retry"), "got: {lines:?}");
        assert!(lines[1].ends_with(" fix: null check"), "got: {lines:?}");
    }

    #[tokio::test]
    async fn empty_range_yields_no_commits() {
        let dir = repo_with_commits(&["init"]).await;
        let history = GitHistory::new(dir.path());
        let commits = history.commit_range("HEAD", "HEAD").await.unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn unknown_ref_is_invalid_ref() {
        let dir = repo_with_commits(&["init"]).await;
        let history = GitHistory::new(dir.path());
        let err = history.commit_range("v9.9.9", "HEAD").await.unwrap_err();
        match err {
            HistoryError::InvalidRef(r) => assert_eq!(r, "v9.9.9"),
            other => panic!("expected InvalidRef, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_repo_dir_rejects_refs() {
        let dir = tempfile::tempdir().unwrap();
        let history = GitHistory::new(dir.path());
        let err = history.verify_ref("HEAD").await.unwrap_err();
        assert!(matches!(err, HistoryError::InvalidRef(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn git_is_installed() {
        let dir = tempfile::tempdir().unwrap();
        GitHistory::new(dir.path()).ensure_installed().await.unwrap();
    }
}
