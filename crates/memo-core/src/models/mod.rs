//! Data models for MeMo

mod block;
mod folder;
mod note;
mod settings;
mod sort;
mod tag;
mod theme;

pub use block::{Block, BlockId, BlockKind, ImageRef};
pub use folder::{validate_folder_fields, Folder, FolderDeletePolicy, FolderId};
pub use note::{NoteDocument, NoteId};
pub use settings::Settings;
pub use sort::{SortBy, SortOrder};
pub use tag::{collect_tags, normalize_tag, tags_label, MAX_TAG_LEN};
pub use theme::ThemeColor;
