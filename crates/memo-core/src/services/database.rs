//! Shared database service wrapper.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{Database, LibSqlNoteStore, LibSqlSettingsRepository, SettingsRepository};
use crate::models::{Folder, FolderDeletePolicy, FolderId, NoteDocument, NoteId, Settings};
use crate::search::{NoteQuery, NoteSummary};
use crate::store::{FolderStore, NoteStore};
use crate::Result;

/// Thread-safe, clonable handle to the notes database.
///
/// Every call locks the connection for its duration, so writes from
/// different sessions never interleave.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// Missing parent directories are created.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Where the database lives, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Whether settings were ever saved to this database.
    pub async fn has_settings(&self) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlSettingsRepository::new(db.connection())
            .has_settings()
            .await
    }

    /// Load settings.
    pub async fn load_settings(&self) -> Result<Settings> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.load().await
    }

    /// Save settings.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        repo.save(settings).await
    }
}

impl NoteStore for DatabaseService {
    async fn load(&self, id: &NoteId) -> Result<Option<NoteDocument>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).load(id).await
    }

    async fn save(&self, doc: &NoteDocument) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).save(doc).await
    }

    async fn delete(&self, id: &NoteId) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).delete(id).await
    }

    async fn list(&self, query: &NoteQuery) -> Result<Vec<NoteSummary>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).list(query).await
    }
}

impl FolderStore for DatabaseService {
    async fn load_folder(&self, id: &FolderId) -> Result<Option<Folder>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).load_folder(id).await
    }

    async fn save_folder(&self, folder: &Folder) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection())
            .save_folder(folder)
            .await
    }

    async fn delete_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection())
            .delete_folder(id, policy)
            .await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).list_folders().await
    }
}
