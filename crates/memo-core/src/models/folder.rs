//! Folder model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::util::{is_blank, now_millis};

use super::note::NoteId;
use super::theme::ThemeColor;

/// A unique identifier for a folder, using UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(Uuid);

impl FolderId {
    /// Create a new unique folder ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FolderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What happens to a folder's notes when the folder is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderDeletePolicy {
    /// Notes survive and are moved out of the folder.
    #[default]
    DetachNotes,
    /// Notes are deleted along with the folder.
    DeleteNotes,
}

/// A titled container of notes.
///
/// Membership is owned by the notes (`NoteDocument::folder_id`); `notes` is
/// filled in by the store when the folder is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Display title.
    pub title: String,
    /// Emoji icon.
    pub icon: String,
    /// Colour theme, also the default for notes created inside.
    pub theme: ThemeColor,
    /// Notes currently in this folder.
    #[serde(default)]
    pub notes: Vec<NoteId>,
    /// Creation timestamp (Unix ms).
    pub created_at: i64,
    /// Last modification timestamp (Unix ms).
    pub modified_at: i64,
}

impl Folder {
    /// Create a new folder, rejecting blank titles or icons.
    pub fn new(
        title: impl Into<String>,
        icon: impl Into<String>,
        theme: ThemeColor,
    ) -> Result<Self> {
        let (title, icon) = validate_folder_fields(&title.into(), &icon.into())?;
        let now = now_millis();

        Ok(Self {
            id: FolderId::new(),
            title,
            icon,
            theme,
            notes: Vec::new(),
            created_at: now,
            modified_at: now,
        })
    }

    /// Replace title, icon and theme, keeping the folder valid.
    pub fn update(&mut self, title: &str, icon: &str, theme: ThemeColor) -> Result<()> {
        let (title, icon) = validate_folder_fields(title, icon)?;
        self.title = title;
        self.icon = icon;
        self.theme = theme;
        self.modified_at = now_millis().max(self.modified_at);
        Ok(())
    }
}

/// Trim and validate folder title and icon.
///
/// Both must contain something other than whitespace.
pub fn validate_folder_fields(title: &str, icon: &str) -> Result<(String, String)> {
    if is_blank(title) {
        return Err(Error::InvalidInput(
            "Folder title cannot be empty".to_string(),
        ));
    }
    if is_blank(icon) {
        return Err(Error::InvalidInput("Folder icon cannot be empty".to_string()));
    }
    Ok((title.trim().to_string(), icon.trim().to_string()))
}
