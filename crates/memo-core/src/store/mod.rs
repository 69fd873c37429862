//! Persistence contracts for notes and folders
//!
//! The editor never talks to storage directly. Sessions and the library go
//! through these traits, implemented by the libSQL store, the shared
//! [`DatabaseService`](crate::services::DatabaseService) and the in-memory
//! store used in tests and previews.

mod memory;

pub use memory::InMemoryNoteStore;

use crate::error::Result;
use crate::models::{Folder, FolderDeletePolicy, FolderId, NoteDocument, NoteId};
use crate::search::{NoteQuery, NoteSummary};

/// Note persistence (async)
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// Load a note with its blocks and tags. `None` when it does not exist.
    async fn load(&self, id: &NoteId) -> Result<Option<NoteDocument>>;

    /// Insert or replace a note. Either the whole document is stored or nothing is.
    async fn save(&self, doc: &NoteDocument) -> Result<()>;

    /// Remove a note. Returns `false` when there was nothing to remove.
    async fn delete(&self, id: &NoteId) -> Result<bool>;

    /// List summaries matching the query, in the requested order.
    async fn list(&self, query: &NoteQuery) -> Result<Vec<NoteSummary>>;
}

/// Folder persistence (async)
#[allow(async_fn_in_trait)]
pub trait FolderStore {
    /// Load a folder with the ids of the notes it holds.
    async fn load_folder(&self, id: &FolderId) -> Result<Option<Folder>>;

    /// Insert or replace a folder's title, icon and theme.
    async fn save_folder(&self, folder: &Folder) -> Result<()>;

    /// Remove a folder, detaching or deleting its notes per `policy`.
    async fn delete_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool>;

    /// All folders, most recently created first.
    async fn list_folders(&self) -> Result<Vec<Folder>>;
}
