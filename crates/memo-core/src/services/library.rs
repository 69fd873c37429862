//! Application facade over a note and folder store
//!
//! Screens hold a [`NoteLibrary`] plus their own [`NoteSession`] or
//! [`NoteBrowser`]. Every successful write is announced on the library's
//! event channel so other open lists can refresh.

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{
    Folder, FolderDeletePolicy, FolderId, NoteId, Settings, SortBy, SortOrder, ThemeColor,
};
use crate::search::{ListState, NoteQuery, NoteSummary};
use crate::store::{FolderStore, NoteStore};

use super::browser::{BrowseMode, NoteBrowser};
use super::database::DatabaseService;
use super::events::{EventSender, LibraryEvent};
use super::session::{CloseOutcome, NoteSession};

/// Notes, folders and settings behind one handle.
pub struct NoteLibrary<S> {
    store: S,
    settings: Settings,
    events: EventSender,
}

impl<S: NoteStore + FolderStore> NoteLibrary<S> {
    #[must_use]
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            store,
            settings,
            events: EventSender::new(),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Receive change notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    /// A browser using the current default ordering.
    #[must_use]
    pub fn browser(&self, folder: Option<FolderId>) -> NoteBrowser {
        NoteBrowser::new(&self.settings, folder)
    }

    /// Start a new note. Inside a folder it takes the folder's theme,
    /// elsewhere the default theme.
    pub async fn create_note(&self, folder: Option<FolderId>) -> Result<NoteSession> {
        let theme = match folder {
            Some(id) => self.require_folder(&id).await?.theme,
            None => self.settings.default_theme,
        };
        tracing::debug!(?folder, %theme, "Creating note");
        Ok(NoteSession::new_note(theme, folder))
    }

    pub async fn open_note(&self, id: &NoteId) -> Result<NoteSession> {
        let doc = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;
        Ok(NoteSession::open(doc))
    }

    /// Save a session's pending work.
    pub async fn commit(&self, session: &mut NoteSession) -> Result<bool> {
        let saved = session.commit(&self.store).await?;
        if saved {
            self.events
                .send(LibraryEvent::NoteSaved(session.document().id));
        }
        Ok(saved)
    }

    /// Close a session with a final save.
    pub async fn close(&self, session: NoteSession) -> Result<CloseOutcome> {
        let id = session.document().id;
        let outcome = session.close(&self.store).await?;
        if outcome == CloseOutcome::Saved {
            self.events.send(LibraryEvent::NoteSaved(id));
        }
        Ok(outcome)
    }

    /// Delete notes, returning how many existed.
    pub async fn delete_notes(&self, ids: &[NoteId]) -> Result<usize> {
        let mut deleted = 0;
        for id in ids {
            if self.store.delete(id).await? {
                deleted += 1;
                self.events.send(LibraryEvent::NoteDeleted(*id));
            }
        }
        tracing::debug!(requested = ids.len(), deleted, "Deleted notes");
        Ok(deleted)
    }

    pub async fn refresh(&self, browser: &mut NoteBrowser) -> Result<ListState> {
        browser.refresh(&self.store).await
    }

    /// Delete a browser's selection, leave select mode and reload the list.
    pub async fn delete_selected(&self, browser: &mut NoteBrowser) -> Result<usize> {
        let ids = browser.take_selection();
        let deleted = self.delete_notes(&ids).await?;
        browser.set_mode(BrowseMode::Browse);
        browser.refresh(&self.store).await?;
        Ok(deleted)
    }

    /// The most recently edited notes, across all folders.
    pub async fn recent_notes(&self, limit: usize) -> Result<Vec<NoteSummary>> {
        let query = NoteQuery::all().sorted(SortBy::Edited, SortOrder::Descending);
        let mut notes = self.store.list(&query).await?;
        notes.truncate(limit);
        Ok(notes)
    }

    /// Put a note into a folder, or take it out with `None`.
    pub async fn move_note(&self, id: &NoteId, folder: Option<FolderId>) -> Result<()> {
        if let Some(folder_id) = &folder {
            self.require_folder(folder_id).await?;
        }

        let mut session = self.open_note(id).await?;
        if session.set_folder(folder) {
            self.commit(&mut session).await?;
        }
        Ok(())
    }

    pub async fn create_folder(
        &self,
        title: &str,
        icon: &str,
        theme: ThemeColor,
    ) -> Result<Folder> {
        let folder = Folder::new(title, icon, theme)?;
        self.store.save_folder(&folder).await?;
        self.events.send(LibraryEvent::FolderSaved(folder.id));
        Ok(folder)
    }

    pub async fn update_folder(
        &self,
        id: &FolderId,
        title: &str,
        icon: &str,
        theme: ThemeColor,
    ) -> Result<Folder> {
        let mut folder = self.require_folder(id).await?;
        folder.update(title, icon, theme)?;
        self.store.save_folder(&folder).await?;
        self.events.send(LibraryEvent::FolderSaved(folder.id));
        Ok(folder)
    }

    /// Delete a folder. With [`FolderDeletePolicy::DeleteNotes`] every
    /// removed member note is announced as deleted too.
    pub async fn delete_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool> {
        let members = match policy {
            FolderDeletePolicy::DeleteNotes => self
                .store
                .load_folder(id)
                .await?
                .map(|folder| folder.notes)
                .unwrap_or_default(),
            FolderDeletePolicy::DetachNotes => Vec::new(),
        };

        let deleted = self.store.delete_folder(id, policy).await?;
        if deleted {
            for note_id in members {
                self.events.send(LibraryEvent::NoteDeleted(note_id));
            }
            self.events.send(LibraryEvent::FolderDeleted(*id));
        }
        Ok(deleted)
    }

    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.store.list_folders().await
    }

    /// Replace the in-memory settings and announce them.
    pub fn update_settings(&mut self, settings: Settings) {
        if self.settings == settings {
            return;
        }
        self.settings = settings;
        self.events.send(LibraryEvent::SettingsChanged(settings));
    }

    async fn require_folder(&self, id: &FolderId) -> Result<Folder> {
        self.store
            .load_folder(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("folder {id}")))
    }
}

impl NoteLibrary<DatabaseService> {
    /// Open the database named by `config` and load its settings.
    ///
    /// A database without stored settings is seeded from the config.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let service = DatabaseService::open_path(config.resolve_database_path()).await?;
        let settings = if service.has_settings().await? {
            service.load_settings().await?
        } else {
            let initial = config.initial_settings();
            service.save_settings(&initial).await?;
            initial
        };
        Ok(Self::new(service, settings))
    }

    /// Persist new settings, then apply them.
    pub async fn save_settings(&mut self, settings: Settings) -> Result<()> {
        self.store.save_settings(&settings).await?;
        self.update_settings(settings);
        Ok(())
    }
}
