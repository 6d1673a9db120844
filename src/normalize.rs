//! Post-processing of validated entries.
//!
//! The caller owns version, date and range; the model's values for those
//! are always discarded. Each change also gets an id slug derived from
//! its title.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::ID_MAX_LEN;
use crate::models::{ChangelogEntry, ReleaseInfo};

/// Runs of ASCII letters and digits.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// Id used when a title contains no usable characters.
const FALLBACK_ID: &str = "change";

/// Overwrite the caller-owned fields and derive change ids.
pub fn normalize(mut entry: ChangelogEntry, release: &ReleaseInfo) -> ChangelogEntry {
    entry.version = release.version.clone();
    entry.date = release.date.clone();
    entry.from_ref = release.from_ref.clone();
    entry.to_ref = release.to_ref.clone();

    for change in &mut entry.changes {
        change.id = truncated_kebab_case(&change.title, ID_MAX_LEN);
    }
    entry
}

/// Lower-case kebab slug of `s`, at most `max_len` bytes, cut only between words.
///
/// Words are never cut. When no whole word fits, the id is `change`, or
/// empty if even that exceeds `max_len`.
pub fn truncated_kebab_case(s: &str, max_len: usize) -> String {
    let words = split_words(s);

    let mut slug = String::new();
    for word in &words {
        let sep = usize::from(!slug.is_empty());
        if slug.len() + sep + word.len() > max_len {
            break;
        }
        if sep == 1 {
            slug.push('-');
        }
        slug.push_str(word);
    }

    if slug.is_empty() && FALLBACK_ID.len() <= max_len {
        return FALLBACK_ID.to_string();
    }
    slug
}

/// Split into lower-cased words at non-alphanumerics and camel-case humps.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for run in WORD_RE.find_iter(s) {
        let mut current = String::new();
        let mut prev_lower = false;
        for c in run.as_str().chars() {
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c.to_ascii_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}
