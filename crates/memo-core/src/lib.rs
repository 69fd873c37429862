//! memo-core - Core library for MeMo
//!
//! Block-based notes with folders, tags and colour themes. This crate holds
//! the note model, the pure block-editing transitions, the storage contract
//! with its libSQL and in-memory implementations, and the session and list
//! state that a UI drives.

pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod export;
pub mod models;
pub mod search;
pub mod services;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use models::{Block, BlockId, BlockKind, Folder, FolderId, NoteDocument, NoteId, ThemeColor};
pub use search::{ListState, NoteQuery, NoteSummary};
pub use services::{DatabaseService, NoteBrowser, NoteLibrary, NoteSession};
pub use store::{FolderStore, InMemoryNoteStore, NoteStore};
