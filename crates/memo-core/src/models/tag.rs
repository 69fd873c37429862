//! Tag helpers
//!
//! Tags are short labels stored directly on a note.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Longest accepted tag, in characters
pub const MAX_TAG_LEN: usize = 64;

/// Trim a user-entered tag and reject blank or oversized values.
pub fn normalize_tag(raw: &str) -> Result<String> {
    let tag = raw.trim();
    if tag.is_empty() {
        return Err(Error::InvalidInput("Tag cannot be empty".to_string()));
    }
    if tag.chars().count() > MAX_TAG_LEN {
        return Err(Error::InvalidInput(format!(
            "Tag cannot be longer than {MAX_TAG_LEN} characters"
        )));
    }
    Ok(tag.to_string())
}

/// Return a sorted, deduplicated tag list discovered across notes.
pub fn collect_tags<'a>(
    tag_sets: impl IntoIterator<Item = &'a BTreeSet<String>>,
) -> Vec<String> {
    tag_sets
        .into_iter()
        .flat_map(|tags| tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Comma-separated tag list, or `"Empty"` when there are none.
#[must_use]
pub fn tags_label(tags: &BTreeSet<String>) -> String {
    if tags.is_empty() {
        "Empty".to_string()
    } else {
        tags.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
