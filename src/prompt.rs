//! Prompt assembly for changelog generation.
//!
//! The prompt is a pure function of the tag vocabulary and the commit
//! blobs, so the same range always produces the same request.

use crate::constants::COMMIT_SENTINEL;

/// Instructions sent ahead of the commit history.
const INSTRUCTIONS: &str = "\
You are writing a changelog entry for a software release.

Read the git commits and diffs below and describe the user-visible changes they introduce.

Rules:
- Use only the information provided in the commits and diffs. Do not invent changes.
- Every change must have a title, a description and an impact.
- The title is short. The description is end-user friendly and more verbose. \
The impact explains what the change means for users of the software.
- Tag every change with at least one tag, chosen only from this list: {tags}.
- List at least one commit hash for every change.
- A change may span several commits, and a commit may contribute to several changes.
- Order the changes from most recent to least recent.
- Leave `version`, `date`, `from_ref` and `to_ref` as empty strings.
- Respond with the JSON object only. No prose, no markdown.

Each commit below starts with its own marker line.";

/// Build the generation prompt.
///
/// Every blob is placed after exactly one sentinel line, in input order.
/// Sentinels inside a blob are lower-cased so they cannot split it.
pub fn build(tags: &[String], commit_blobs: &[String]) -> String {
    let mut prompt = INSTRUCTIONS.replace("{tags}", &tags.join(", "));
    prompt.push_str("\n\n");
    for blob in commit_blobs {
        prompt.push_str(COMMIT_SENTINEL);
        prompt.push('\n');
        prompt.push_str(&neutralize(blob.trim_end()));
        prompt.push('\n');
    }
    prompt
}

/// Rewrite every embedded sentinel until none remain.
///
/// A single pass is not enough: rewriting `--- COMMIT --- COMMIT ---`
/// leaves a fresh sentinel behind.
fn neutralize(blob: &str) -> String {
    let mut body = blob.to_string();
    while body.contains(COMMIT_SENTINEL) {
        body = body.replace(COMMIT_SENTINEL, &COMMIT_SENTINEL.to_lowercase());
    }
    body
}
