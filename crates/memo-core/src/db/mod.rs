//! Database layer for MeMo

mod connection;
mod migrations;
mod note_store;
mod settings_repository;

pub use connection::Database;
pub use note_store::LibSqlNoteStore;
pub use settings_repository::{LibSqlSettingsRepository, SettingsRepository};
