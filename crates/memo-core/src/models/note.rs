//! Note model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Result;
use crate::util::{is_blank, now_millis};

use super::block::{Block, BlockId, BlockKind};
use super::folder::FolderId;
use super::tag::normalize_tag;
use super::theme::ThemeColor;

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A note: title, tags, theme and an ordered sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    /// Unique identifier
    pub id: NoteId,
    /// Title, may be empty
    pub title: String,
    /// Short labels; a set, so order carries no meaning
    pub tags: BTreeSet<String>,
    /// Colour theme
    pub theme: ThemeColor,
    /// Content in display order
    pub blocks: Vec<Block>,
    /// Owning folder, if any
    pub folder_id: Option<FolderId>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last committed change (Unix ms)
    pub modified_at: i64,
}

impl NoteDocument {
    /// Create a new, empty note with the given theme
    #[must_use]
    pub fn new(theme: ThemeColor) -> Self {
        let now = now_millis();
        Self {
            id: NoteId::new(),
            title: String::new(),
            tags: BTreeSet::new(),
            theme,
            blocks: Vec::new(),
            folder_id: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Builder-style helper used by seeds and tests
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder-style helper used by seeds and tests
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Record a committed change. Never moves `modified_at` backwards.
    pub fn touch(&mut self) {
        self.modified_at = now_millis().max(self.modified_at);
    }

    /// Add a tag after trimming it. Returns `false` when it was already present.
    pub fn add_tag(&mut self, raw: &str) -> Result<bool> {
        let tag = normalize_tag(raw)?;
        Ok(self.tags.insert(tag))
    }

    /// Remove a tag. Returns `false` when it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag.trim())
    }

    /// Position of the block with the given id
    #[must_use]
    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    /// Text of the plain-text blocks, in order
    pub fn text_contents(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|block| block.kind == BlockKind::Text)
            .map(|block| block.text.as_str())
    }

    /// Preview text: every non-empty textual block joined by a space
    #[must_use]
    pub fn description(&self) -> String {
        self.blocks
            .iter()
            .filter(|block| block.kind.holds_text() && !block.text.is_empty())
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Nothing worth keeping: blank title, no tags, no images and only blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        is_blank(&self.title)
            && self.tags.is_empty()
            && self.blocks.iter().all(|block| match block.kind {
                BlockKind::Image => false,
                BlockKind::Text | BlockKind::Checklist | BlockKind::BulletList => {
                    is_blank(&block.text)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageRef;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_parse() {
        let id = NoteId::new();
        let parsed: NoteId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_note_new() {
        let note = NoteDocument::new(ThemeColor::Red);
        assert!(note.blocks.is_empty());
        assert!(note.title.is_empty());
        assert_eq!(note.theme, ThemeColor::Red);
        assert_eq!(note.created_at, note.modified_at);
        assert!(note.folder_id.is_none());
    }

    #[test]
    fn test_touch_never_goes_backwards() {
        let mut note = NoteDocument::new(ThemeColor::Blue);
        note.modified_at = i64::MAX - 1;
        note.touch();
        assert_eq!(note.modified_at, i64::MAX - 1);
    }

    #[test]
    fn test_tags_are_a_set() {
        let mut note = NoteDocument::new(ThemeColor::Blue);
        assert!(note.add_tag(" Music ").unwrap());
        assert!(!note.add_tag("Music").unwrap());
        assert!(note.add_tag("Piano").unwrap());
        assert!(note.add_tag("   ").is_err());
        assert_eq!(note.tags.len(), 2);

        assert!(note.remove_tag("Music"));
        assert!(!note.remove_tag("Music"));
        assert_eq!(note.tags.iter().collect::<Vec<_>>(), vec!["Piano"]);
    }

    #[test]
    fn test_description_skips_images_and_empty_blocks() {
        let note = NoteDocument::new(ThemeColor::Green).with_blocks(vec![
            Block::text("First sentence here.."),
            Block::image(ImageRef::new("dummy1")),
            Block::text(""),
            Block::checklist("Buy milk", false),
        ]);
        assert_eq!(note.description(), "First sentence here.. Buy milk");
        assert_eq!(
            note.text_contents().collect::<Vec<_>>(),
            vec!["First sentence here..", ""]
        );
    }

    #[test]
    fn test_is_blank() {
        let mut note = NoteDocument::new(ThemeColor::Pink).with_blocks(vec![Block::text("  ")]);
        assert!(note.is_blank());

        note.blocks.push(Block::image(ImageRef::new("ref")));
        assert!(!note.is_blank());

        let titled = NoteDocument::new(ThemeColor::Pink).with_title("Diary");
        assert!(!titled.is_blank());
    }

    #[test]
    fn test_block_index() {
        let note = NoteDocument::new(ThemeColor::Blue)
            .with_blocks(vec![Block::text("a"), Block::text("b")]);
        let second = note.blocks[1].id;
        assert_eq!(note.block_index(second), Some(1));
        assert_eq!(note.block_index(BlockId::new()), None);
    }
}
