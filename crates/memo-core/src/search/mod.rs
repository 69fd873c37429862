//! Note listing: filtering, ordering and list summaries
//!
//! Both stores list notes the same way: every candidate document is matched
//! against the query filter here, summarized, then ordered. Matching is a
//! case-insensitive substring test over the title and the text blocks.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{FolderId, NoteDocument, NoteId, SortBy, SortOrder, ThemeColor};
use crate::util::normalize_text_option;

/// Parameters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    /// Substring to look for; blank means "everything"
    pub filter: Option<String>,
    pub sort_by: SortBy,
    pub order: SortOrder,
    /// Restrict to a single folder
    pub folder: Option<FolderId>,
}

impl NoteQuery {
    /// Everything, newest edit first.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn sorted(mut self, sort_by: SortBy, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }

    #[must_use]
    pub const fn in_folder(mut self, folder: FolderId) -> Self {
        self.folder = Some(folder);
        self
    }

    /// The trimmed filter, or `None` when it is blank.
    #[must_use]
    pub fn normalized_filter(&self) -> Option<String> {
        normalize_text_option(self.filter.clone())
    }

    /// Whether `doc` belongs in the result of this query.
    #[must_use]
    pub fn matches(&self, doc: &NoteDocument) -> bool {
        if self.folder.is_some() && doc.folder_id != self.folder {
            return false;
        }
        self.normalized_filter()
            .map_or(true, |filter| matches_filter(doc, &filter))
    }
}

/// A note as it appears in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    /// Preview built from the textual blocks
    pub description: String,
    pub tags: BTreeSet<String>,
    pub theme: ThemeColor,
    pub folder_id: Option<FolderId>,
    pub created_at: i64,
    pub modified_at: i64,
}

impl From<&NoteDocument> for NoteSummary {
    fn from(doc: &NoteDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            description: doc.description(),
            tags: doc.tags.clone(),
            theme: doc.theme,
            folder_id: doc.folder_id,
            created_at: doc.created_at,
            modified_at: doc.modified_at,
        }
    }
}

/// What a list screen should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Results are available
    Ready,
    /// Nothing stored yet
    Empty,
    /// A search matched nothing
    NotFound,
}

impl ListState {
    /// Classify a result set.
    #[must_use]
    pub const fn classify(result_count: usize, filtering: bool) -> Self {
        match (result_count, filtering) {
            (0, false) => Self::Empty,
            (0, true) => Self::NotFound,
            _ => Self::Ready,
        }
    }
}

/// Case-insensitive substring match over the title and text blocks.
///
/// Checklist, bullet and image blocks are not searched.
#[must_use]
pub fn matches_filter(doc: &NoteDocument, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    doc.title.to_lowercase().contains(&needle)
        || doc
            .text_contents()
            .any(|text| text.to_lowercase().contains(&needle))
}

fn compare(a: &NoteSummary, b: &NoteSummary, sort_by: SortBy) -> Ordering {
    let primary = match sort_by {
        SortBy::Edited => a.modified_at.cmp(&b.modified_at),
        SortBy::Created => a.created_at.cmp(&b.created_at),
        SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Order summaries in place. Ties fall back to the note id so the order is total.
pub fn sort_summaries(summaries: &mut [NoteSummary], sort_by: SortBy, order: SortOrder) {
    summaries.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// Filter, summarize and order a set of documents.
pub fn query_notes<'a>(
    docs: impl IntoIterator<Item = &'a NoteDocument>,
    query: &NoteQuery,
) -> Vec<NoteSummary> {
    let mut summaries: Vec<NoteSummary> = docs
        .into_iter()
        .filter(|doc| query.matches(doc))
        .map(NoteSummary::from)
        .collect();
    sort_summaries(&mut summaries, query.sort_by, query.order);
    summaries
}
