//! Stateful services on top of the store: editing sessions, note lists,
//! the shared database handle and the library facade.

mod browser;
mod database;
mod events;
mod library;
mod session;

pub use browser::{BrowseMode, NoteBrowser};
pub use database::DatabaseService;
pub use events::{EventSender, LibraryEvent, EVENT_BUFFER_SIZE};
pub use library::NoteLibrary;
pub use session::{CloseOutcome, NoteSession};
