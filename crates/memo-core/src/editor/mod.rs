//! Block editing transitions
//!
//! Pure functions over a [`NoteDocument`]'s block sequence. Each takes the
//! focused block index and returns the new focus (or whether anything
//! changed). None of them perform I/O or fail: an index outside the block
//! sequence is a wiring bug and panics.
//!
//! ## Kind transitions
//!
//! ```text
//! Text ──"- " prefix──▶ BulletList ──empty backspace──▶ Text
//! Text ──explicit─────▶ Checklist  ──empty backspace──▶ Text
//! Text ──explicit─────▶ Image      ──explicit delete──▶ Text
//! ```
//!
//! Lists are unwound one level before they can be deleted: backspace on an
//! empty list item turns it into an empty text line, a second backspace
//! removes the line.

use crate::models::{Block, BlockKind, ImageRef, NoteDocument};
use crate::util::char_to_byte_index;

/// Typing this at the start of a text line turns it into a bullet item.
pub const AUTO_LIST_PREFIX: &str = "- ";

/// Which adjacent block to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    Previous,
    Next,
}

fn check_index(doc: &NoteDocument, index: usize) {
    assert!(
        index < doc.blocks.len(),
        "block index {index} out of range for note with {} blocks",
        doc.blocks.len()
    );
}

fn insert_after(doc: &mut NoteDocument, index: usize, block: Block) -> usize {
    doc.blocks.insert(index + 1, block);
    index + 1
}

/// Insert an empty text block right after `index` and focus it.
pub fn insert_text_after(doc: &mut NoteDocument, index: usize) -> usize {
    check_index(doc, index);
    insert_after(doc, index, Block::new(BlockKind::Text))
}

/// The user committed a line (enter) in the block at `index`.
///
/// Checklists and non-empty bullet lists continue with a new empty item.
/// An empty bullet item ends the list: it becomes text and keeps focus.
pub fn split_on_commit(doc: &mut NoteDocument, index: usize) -> usize {
    check_index(doc, index);
    match doc.blocks[index].kind {
        BlockKind::Text | BlockKind::Image => insert_text_after(doc, index),
        BlockKind::Checklist => insert_after(doc, index, Block::new(BlockKind::Checklist)),
        BlockKind::BulletList => {
            if doc.blocks[index].text.is_empty() {
                convert_kind(doc, index, BlockKind::Text);
                index
            } else {
                insert_after(doc, index, Block::new(BlockKind::BulletList))
            }
        }
    }
}

/// Commit with the caret at `cursor` (in characters).
///
/// Text after the caret moves into the new block, which has the same kind
/// as the split one (new checklist items start unchecked).
pub fn split_at_cursor(doc: &mut NoteDocument, index: usize, cursor: usize) -> usize {
    check_index(doc, index);
    let kind = doc.blocks[index].kind;
    match kind {
        BlockKind::Image => insert_text_after(doc, index),
        BlockKind::BulletList if doc.blocks[index].text.is_empty() => split_on_commit(doc, index),
        BlockKind::Text | BlockKind::Checklist | BlockKind::BulletList => {
            let block = &mut doc.blocks[index];
            let offset = char_to_byte_index(&block.text, cursor);
            let tail = block.text.split_off(offset);

            let mut next = Block::new(kind);
            next.text = tail;
            insert_after(doc, index, next)
        }
    }
}

/// Backspace pressed at the start of the block at `index`.
///
/// Only empty blocks react. Empty list items unwind to text in place; an
/// empty text block is removed unless it is the first block.
pub fn delete_on_empty_backspace(doc: &mut NoteDocument, index: usize) -> usize {
    check_index(doc, index);
    let block = &doc.blocks[index];
    if !block.is_empty() {
        return index;
    }

    if block.kind.is_list() {
        convert_kind(doc, index, BlockKind::Text);
        index
    } else if block.kind == BlockKind::Text && index > 0 {
        doc.blocks.remove(index);
        index - 1
    } else {
        index
    }
}

/// Change the kind of the block at `index`, keeping its identity.
///
/// Text survives moves between text, checklist and bullet kinds. Becoming an
/// image drops the text; leaving a checklist clears `checked`; leaving an
/// image clears the image reference.
pub fn convert_kind(doc: &mut NoteDocument, index: usize, kind: BlockKind) {
    check_index(doc, index);
    let block = &mut doc.blocks[index];
    if block.kind == kind {
        return;
    }

    if kind != BlockKind::Checklist {
        block.checked = false;
    }
    match kind {
        BlockKind::Image => block.text.clear(),
        BlockKind::Text | BlockKind::Checklist | BlockKind::BulletList => block.image_ref = None,
    }
    block.kind = kind;
}

/// Turn a `"- "`-prefixed text line into a bullet item, stripping the prefix.
///
/// Runs after every text change. Bullet items typed with the prefix lose it
/// too; checklist items and images are left alone.
pub fn detect_auto_list(doc: &mut NoteDocument, index: usize) -> bool {
    check_index(doc, index);
    let block = &mut doc.blocks[index];
    match block.kind {
        BlockKind::Text | BlockKind::BulletList => {
            if !block.text.starts_with(AUTO_LIST_PREFIX) {
                return false;
            }
            block.text.drain(..AUTO_LIST_PREFIX.len());
            block.kind = BlockKind::BulletList;
            true
        }
        BlockKind::Checklist | BlockKind::Image => false,
    }
}

/// Make sure there is somewhere to type: append an empty text block when the
/// note has no blocks or ends with an image.
pub fn append_trailing_text_if_needed(doc: &mut NoteDocument) -> bool {
    let needed = doc
        .blocks
        .last()
        .map_or(true, |block| block.kind == BlockKind::Image);
    if needed {
        doc.blocks.push(Block::new(BlockKind::Text));
    }
    needed
}

/// Whether the previous or next block is a checklist item.
pub fn neighbor_is_checklist(doc: &NoteDocument, index: usize, neighbor: Neighbor) -> bool {
    check_index(doc, index);
    let neighbor_index = match neighbor {
        Neighbor::Previous => index.checked_sub(1),
        Neighbor::Next => Some(index + 1),
    };
    neighbor_index
        .and_then(|i| doc.blocks.get(i))
        .is_some_and(|block| block.kind == BlockKind::Checklist)
}

/// Place an image at the focus and return the focus for the line below it.
///
/// An empty text line at the focus moves down under the image; otherwise
/// the image goes after the focused block and a fresh line follows it.
pub fn insert_image(doc: &mut NoteDocument, index: usize, image_ref: ImageRef) -> usize {
    check_index(doc, index);
    let focused = &doc.blocks[index];
    let image_index = if focused.kind == BlockKind::Text && focused.text.is_empty() {
        index
    } else {
        index + 1
    };
    doc.blocks.insert(image_index, Block::image(image_ref));

    let below = image_index + 1;
    let has_empty_line = doc
        .blocks
        .get(below)
        .is_some_and(|block| block.kind == BlockKind::Text && block.text.is_empty());
    if !has_empty_line {
        doc.blocks.insert(below, Block::new(BlockKind::Text));
    }
    below
}

/// Explicitly delete an image, leaving an empty text line in its place.
pub fn remove_image(doc: &mut NoteDocument, index: usize) -> bool {
    check_index(doc, index);
    if doc.blocks[index].kind != BlockKind::Image {
        return false;
    }
    convert_kind(doc, index, BlockKind::Text);
    true
}

/// Replace the text of a textual block. Images have no text to set.
pub fn set_text(doc: &mut NoteDocument, index: usize, text: impl Into<String>) -> bool {
    check_index(doc, index);
    let block = &mut doc.blocks[index];
    if !block.kind.holds_text() {
        return false;
    }
    let text = text.into();
    if block.text == text {
        return false;
    }
    block.text = text;
    true
}

/// Flip a checklist item. Other kinds are untouched.
pub fn toggle_checked(doc: &mut NoteDocument, index: usize) -> bool {
    check_index(doc, index);
    let block = &mut doc.blocks[index];
    if block.kind != BlockKind::Checklist {
        return false;
    }
    block.checked = !block.checked;
    true
}
