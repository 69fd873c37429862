//! Editing state for one open note

use crate::editor::{self, Neighbor};
use crate::error::Result;
use crate::models::{tags_label, Block, BlockKind, FolderId, ImageRef, NoteDocument, ThemeColor};
use crate::store::NoteStore;

/// What closing a session did with the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Changes were written to the store
    Saved,
    /// Nothing changed since the last save
    Unchanged,
    /// A new note was left blank and never stored
    Discarded,
}

/// The open note, the focused block and whether there is unsaved work.
///
/// Edits go through the block editor and only mark the session dirty;
/// nothing reaches the store until [`commit`](Self::commit) or
/// [`close`](Self::close).
#[derive(Debug, Clone)]
pub struct NoteSession {
    doc: NoteDocument,
    focus: usize,
    dirty: bool,
    is_new: bool,
}

impl NoteSession {
    /// Start a brand new note.
    #[must_use]
    pub fn new_note(theme: ThemeColor, folder_id: Option<FolderId>) -> Self {
        let mut doc = NoteDocument::new(theme);
        doc.folder_id = folder_id;
        editor::append_trailing_text_if_needed(&mut doc);
        Self {
            doc,
            focus: 0,
            dirty: false,
            is_new: true,
        }
    }

    /// Open a stored note, focusing its last block.
    #[must_use]
    pub fn open(mut doc: NoteDocument) -> Self {
        editor::append_trailing_text_if_needed(&mut doc);
        let focus = doc.blocks.len() - 1;
        Self {
            doc,
            focus,
            dirty: false,
            is_new: false,
        }
    }

    pub const fn document(&self) -> &NoteDocument {
        &self.doc
    }

    #[must_use]
    pub fn into_document(self) -> NoteDocument {
        self.doc
    }

    pub const fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_block(&self) -> &Block {
        &self.doc.blocks[self.focus]
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    /// Move the focus to another block.
    pub fn set_focus(&mut self, index: usize) {
        assert!(
            index < self.doc.blocks.len(),
            "focus {index} out of range for note with {} blocks",
            self.doc.blocks.len()
        );
        self.focus = index;
    }

    fn mark(&mut self, changed: bool) -> bool {
        self.dirty |= changed;
        changed
    }

    /// Replace the focused block's text, then apply the `"- "` shortcut.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let changed = editor::set_text(&mut self.doc, self.focus, text);
        let listed = editor::detect_auto_list(&mut self.doc, self.focus);
        self.mark(changed || listed)
    }

    /// Enter at the end of the focused block.
    pub fn commit_line(&mut self) -> usize {
        self.focus = editor::split_on_commit(&mut self.doc, self.focus);
        self.dirty = true;
        self.focus
    }

    /// Enter with the caret at `cursor` characters into the focused block.
    pub fn commit_line_at(&mut self, cursor: usize) -> usize {
        self.focus = editor::split_at_cursor(&mut self.doc, self.focus, cursor);
        self.dirty = true;
        self.focus
    }

    /// Backspace at the start of the focused block.
    pub fn backspace(&mut self) -> usize {
        let len = self.doc.blocks.len();
        let kind = self.doc.blocks[self.focus].kind;

        self.focus = editor::delete_on_empty_backspace(&mut self.doc, self.focus);

        let changed = self.doc.blocks.len() != len || self.doc.blocks[self.focus].kind != kind;
        self.mark(changed);
        self.focus
    }

    /// Turn the focused block into a checklist, bullet or text block.
    ///
    /// Asking for [`BlockKind::Image`] changes nothing; an image needs a
    /// reference, so use [`insert_image`](Self::insert_image).
    pub fn convert_focused(&mut self, kind: BlockKind) -> bool {
        if kind == BlockKind::Image {
            return false;
        }
        let before = self.doc.blocks[self.focus].kind;
        editor::convert_kind(&mut self.doc, self.focus, kind);
        let appended = editor::append_trailing_text_if_needed(&mut self.doc);
        self.mark(before != kind || appended)
    }

    /// Put an image at the focus and move to the line below it.
    pub fn insert_image(&mut self, image_ref: ImageRef) -> usize {
        self.focus = editor::insert_image(&mut self.doc, self.focus, image_ref);
        self.dirty = true;
        self.focus
    }

    /// Delete the focused image.
    pub fn remove_image(&mut self) -> bool {
        let removed = editor::remove_image(&mut self.doc, self.focus);
        self.mark(removed)
    }

    /// Tick or untick a checklist item. Does not move the focus.
    pub fn toggle_checked(&mut self, index: usize) -> bool {
        let toggled = editor::toggle_checked(&mut self.doc, index);
        self.mark(toggled)
    }

    pub fn neighbor_is_checklist(&self, neighbor: Neighbor) -> bool {
        editor::neighbor_is_checklist(&self.doc, self.focus, neighbor)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.doc.title == title {
            return false;
        }
        self.doc.title = title;
        self.mark(true)
    }

    /// Add a tag; blank or oversized tags are rejected.
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let added = self.doc.add_tag(tag)?;
        Ok(self.mark(added))
    }

    /// Tags for display: comma separated, or "Empty".
    pub fn tags_label(&self) -> String {
        tags_label(&self.doc.tags)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.doc.remove_tag(tag);
        self.mark(removed)
    }

    pub fn set_theme(&mut self, theme: ThemeColor) -> bool {
        if self.doc.theme == theme {
            return false;
        }
        self.doc.theme = theme;
        self.mark(true)
    }

    pub(crate) fn set_folder(&mut self, folder_id: Option<FolderId>) -> bool {
        if self.doc.folder_id == folder_id {
            return false;
        }
        self.doc.folder_id = folder_id;
        self.mark(true)
    }

    /// Save pending work.
    ///
    /// Stamps `modified_at` and writes the document when it changed, or when
    /// it is new and has content. Returns whether anything was written. On
    /// failure the session stays dirty so the save can be attempted again.
    pub async fn commit<S: NoteStore>(&mut self, store: &S) -> Result<bool> {
        if self.is_new && self.doc.is_blank() {
            return Ok(false);
        }
        if !self.dirty && !self.is_new {
            return Ok(false);
        }

        self.doc.touch();
        store.save(&self.doc).await?;
        self.dirty = false;
        self.is_new = false;
        Ok(true)
    }

    /// Final save when the editor goes away. A new note left blank is dropped.
    pub async fn close<S: NoteStore>(mut self, store: &S) -> Result<CloseOutcome> {
        if self.is_new && self.doc.is_blank() {
            tracing::debug!(note_id = %self.doc.id, "Discarded blank new note");
            return Ok(CloseOutcome::Discarded);
        }

        match self.commit(store).await {
            Ok(true) => Ok(CloseOutcome::Saved),
            Ok(false) => Ok(CloseOutcome::Unchanged),
            Err(error) => {
                tracing::warn!(note_id = %self.doc.id, %error, "Failed to save note on close");
                Err(error)
            }
        }
    }
}
