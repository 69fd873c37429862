//! In-memory store for tests and previews

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{Folder, FolderDeletePolicy, FolderId, NoteDocument, NoteId};
use crate::search::{query_notes, NoteQuery, NoteSummary};

use super::{FolderStore, NoteStore};

#[derive(Debug, Default)]
struct Inner {
    notes: HashMap<NoteId, NoteDocument>,
    folders: HashMap<FolderId, Folder>,
}

/// Map-backed store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNoteStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given notes.
    pub async fn with_notes(notes: impl IntoIterator<Item = NoteDocument>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().await;
            for note in notes {
                inner.notes.insert(note.id, note);
            }
        }
        store
    }

    /// Number of stored notes.
    pub async fn note_count(&self) -> usize {
        self.inner.lock().await.notes.len()
    }
}

impl NoteStore for InMemoryNoteStore {
    async fn load(&self, id: &NoteId) -> Result<Option<NoteDocument>> {
        Ok(self.inner.lock().await.notes.get(id).cloned())
    }

    async fn save(&self, doc: &NoteDocument) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let mut stored = doc.clone();
        if stored
            .folder_id
            .is_some_and(|folder| !inner.folders.contains_key(&folder))
        {
            stored.folder_id = None;
        }
        inner.notes.insert(doc.id, stored);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<bool> {
        Ok(self.inner.lock().await.notes.remove(id).is_some())
    }

    async fn list(&self, query: &NoteQuery) -> Result<Vec<NoteSummary>> {
        let inner = self.inner.lock().await;
        Ok(query_notes(inner.notes.values(), query))
    }
}

impl FolderStore for InMemoryNoteStore {
    async fn load_folder(&self, id: &FolderId) -> Result<Option<Folder>> {
        let inner = self.inner.lock().await;
        let Some(folder) = inner.folders.get(id) else {
            return Ok(None);
        };

        let mut members: Vec<&NoteDocument> = inner
            .notes
            .values()
            .filter(|note| note.folder_id == Some(*id))
            .collect();
        members.sort_by_key(|note| (note.created_at, note.id));

        let mut folder = folder.clone();
        folder.notes = members.into_iter().map(|note| note.id).collect();
        Ok(Some(folder))
    }

    async fn save_folder(&self, folder: &Folder) -> Result<()> {
        let mut stored = folder.clone();
        stored.notes.clear();
        self.inner.lock().await.folders.insert(folder.id, stored);
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.folders.remove(id).is_none() {
            return Ok(false);
        }

        match policy {
            FolderDeletePolicy::DetachNotes => {
                for note in inner.notes.values_mut() {
                    if note.folder_id == Some(*id) {
                        note.folder_id = None;
                    }
                }
            }
            FolderDeletePolicy::DeleteNotes => {
                inner.notes.retain(|_, note| note.folder_id != Some(*id));
            }
        }
        Ok(true)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let inner = self.inner.lock().await;
        let mut folders: Vec<Folder> = inner.folders.values().cloned().collect();
        folders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(folders)
    }
}
