//! Library change notifications

use tokio::sync::broadcast;

use crate::models::{FolderId, NoteId, Settings};

/// Events buffered per subscriber before it starts lagging
pub const EVENT_BUFFER_SIZE: usize = 64;

/// Something in the library changed; lists showing it should refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    NoteSaved(NoteId),
    NoteDeleted(NoteId),
    FolderSaved(FolderId),
    FolderDeleted(FolderId),
    SettingsChanged(Settings),
}

/// Sending half of the library's event channel.
#[derive(Debug, Clone)]
pub struct EventSender(broadcast::Sender<LibraryEvent>);

impl EventSender {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self(sender)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.0.subscribe()
    }

    /// Publish an event. Having nobody listening is not an error.
    pub fn send(&self, event: LibraryEvent) {
        tracing::trace!(?event, "Library event");
        let _ = self.0.send(event);
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::new()
    }
}
