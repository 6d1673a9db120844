//! Changelog entry and change types, as persisted and as returned by models.

use serde::{Deserialize, Serialize};

/// One discrete, user-visible change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogChange {
    /// Short, succinct title.
    pub title: String,
    /// End-user friendly description.
    pub description: String,
    /// What the change means for users of the software.
    pub impact: String,
    /// Commit identifiers this change came from. Never empty.
    pub commits: Vec<String>,
    /// Tags from the configured vocabulary. Never empty.
    pub tags: Vec<String>,
    /// Slug derived from `title`; models never set it.
    #[serde(default)]
    pub id: String,
}

/// One changelog release.
///
/// `version`, `date`, `from_ref` and `to_ref` belong to the caller. Models
/// are told to leave them blank and whatever they return is overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub from_ref: String,
    #[serde(default)]
    pub to_ref: String,
    pub changes: Vec<ChangelogChange>,
}

/// Caller-supplied release metadata injected into every generated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    /// ISO calendar date (`YYYY-MM-DD`).
    pub date: String,
    pub from_ref: String,
    pub to_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_output_without_caller_fields_parses() {
        let json = r#"{"changes":[{"title":"T","description":"D","impact":"I","commits":["abc"],"tags":["fixed"]}]}"#;
        let entry: ChangelogEntry = serde_json::from_str(json).unwrap();
        assert!(entry.version.is_empty());
        assert!(entry.from_ref.is_empty());
        assert_eq!(entry.changes[0].id, "");
    }

    #[test]
    fn serializes_with_snake_case_refs() {
        let entry = ChangelogEntry {
            version: "1.0.0".into(),
            date: "2024-01-01".into(),
            from_ref: "v0.9.0".into(),
            to_ref: "v1.0.0".into(),
            changes: vec![],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["from_ref"], "v0.9.0");
        assert_eq!(value["to_ref"], "v1.0.0");
    }
}
