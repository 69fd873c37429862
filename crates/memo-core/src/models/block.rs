//! Block model: one content unit of a note

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::util::now_millis;

/// A unique identifier for a block, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Create a new unique block ID using UUID v7
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

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The closed set of block shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Plain paragraph
    Text,
    /// Checkable to-do item
    Checklist,
    /// Bulleted list item
    BulletList,
    /// Image placeholder referencing stored bytes or a URL
    Image,
}

impl BlockKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checklist => "checklist",
            Self::BulletList => "bullet_list",
            Self::Image => "image",
        }
    }

    /// Checklist and bullet items continue on commit and unwind on backspace.
    #[must_use]
    pub const fn is_list(self) -> bool {
        match self {
            Self::Checklist | Self::BulletList => true,
            Self::Text | Self::Image => false,
        }
    }

    /// Whether the block carries user-typed text.
    #[must_use]
    pub const fn holds_text(self) -> bool {
        match self {
            Self::Text | Self::Checklist | Self::BulletList => true,
            Self::Image => false,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "checklist" => Ok(Self::Checklist),
            "bullet_list" => Ok(Self::BulletList),
            "image" => Ok(Self::Image),
            other => Err(Error::InvalidInput(format!("Unknown block kind: {other}"))),
        }
    }
}

/// Opaque reference to image bytes or a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single content unit within a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier, stable for the block's lifetime
    pub id: BlockId,
    /// Shape of the block
    pub kind: BlockKind,
    /// Text content (empty for images)
    pub text: String,
    /// Checked state, only meaningful for checklist items
    pub checked: bool,
    /// Image reference, only meaningful for image blocks
    pub image_ref: Option<ImageRef>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl Block {
    /// Create an empty block of the given kind
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            text: String::new(),
            checked: false,
            image_ref: None,
            created_at: now_millis(),
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(BlockKind::Text)
        }
    }

    #[must_use]
    pub fn checklist(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
            ..Self::new(BlockKind::Checklist)
        }
    }

    #[must_use]
    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(BlockKind::BulletList)
        }
    }

    #[must_use]
    pub fn image(image_ref: ImageRef) -> Self {
        Self {
            image_ref: Some(image_ref),
            ..Self::new(BlockKind::Image)
        }
    }

    /// A textual block with no text. Images are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.holds_text() && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_unique() {
        assert_ne!(BlockId::new(), BlockId::new());
    }

    #[test]
    fn test_list_kinds() {
        assert!(BlockKind::Checklist.is_list());
        assert!(BlockKind::BulletList.is_list());
        assert!(!BlockKind::Text.is_list());
        assert!(!BlockKind::Image.is_list());
    }

    #[test]
    fn test_block_id_parse() {
        let id = BlockId::new();
        let parsed: BlockId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            BlockKind::Text,
            BlockKind::Checklist,
            BlockKind::BulletList,
            BlockKind::Image,
        ] {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), kind);
        }
        assert!("video".parse::<BlockKind>().is_err());
    }

    #[test]
    fn test_constructors_set_kind_specific_fields() {
        let item = Block::checklist("Buy milk", true);
        assert_eq!(item.kind, BlockKind::Checklist);
        assert!(item.checked);

        let image = Block::image(ImageRef::new("file://cat.png"));
        assert_eq!(image.kind, BlockKind::Image);
        assert!(image.text.is_empty());
        assert_eq!(image.image_ref.unwrap().as_str(), "file://cat.png");
    }

    #[test]
    fn test_is_empty() {
        assert!(Block::text("").is_empty());
        assert!(Block::bullet("").is_empty());
        assert!(!Block::text(" ").is_empty());
        assert!(!Block::image(ImageRef::new("ref")).is_empty());
    }
}
