//! Settings repository implementation

use crate::error::Result;
use crate::models::Settings;
use libsql::Connection;

const DEFAULT_THEME: &str = "default_theme";
const SORT_BY: &str = "sort_by";
const SORT_ORDER: &str = "sort_order";

/// Trait for settings storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    /// Load settings from the database
    async fn load(&self) -> Result<Settings>;

    /// Save settings to the database
    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// libSQL implementation of `SettingsRepository`
pub struct LibSqlSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for LibSqlSettingsRepository<'_> {
    /// Missing or unreadable values fall back to their defaults.
    async fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(value) = self.get_setting(DEFAULT_THEME).await? {
            settings.default_theme = value.parse().unwrap_or_default();
        }

        if let Some(value) = self.get_setting(SORT_BY).await? {
            settings.sort_by = value.parse().unwrap_or_default();
        }

        if let Some(value) = self.get_setting(SORT_ORDER).await? {
            settings.sort_order = value.parse().unwrap_or_default();
        }

        Ok(settings)
    }

    /// All keys are written in one transaction.
    async fn save(&self, settings: &Settings) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        if let Err(e) = self.write_all(settings).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }
        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        tracing::debug!(?settings, "Saved settings");
        Ok(())
    }
}

impl LibSqlSettingsRepository<'_> {
    /// Whether anything has been saved yet.
    pub async fn has_settings(&self) -> Result<bool> {
        let mut rows = self
            .conn
            .query("SELECT EXISTS(SELECT 1 FROM settings)", ())
            .await?;

        Ok(match rows.next().await? {
            Some(row) => row.get::<i32>(0)? != 0,
            None => false,
        })
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn write_all(&self, settings: &Settings) -> Result<()> {
        self.set_setting(DEFAULT_THEME, settings.default_theme.as_str())
            .await?;
        self.set_setting(SORT_BY, settings.sort_by.as_str()).await?;
        self.set_setting(SORT_ORDER, settings.sort_order.as_str())
            .await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{SortBy, SortOrder, ThemeColor};

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_default_settings() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());

        assert!(!repo.has_settings().await.unwrap());
        let settings = repo.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_theme, ThemeColor::Purple);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_and_load_settings() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());

        let settings = Settings {
            default_theme: ThemeColor::Green,
            sort_by: SortBy::Title,
            sort_order: SortOrder::Ascending,
        };

        repo.save(&settings).await.unwrap();
        assert!(repo.has_settings().await.unwrap());

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_save_keeps_previous_settings() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());
        let before = Settings {
            default_theme: ThemeColor::Green,
            sort_by: SortBy::Title,
            sort_order: SortOrder::Ascending,
        };
        repo.save(&before).await.unwrap();

        db.connection()
            .execute(
                "CREATE TRIGGER reject_sort_order BEFORE INSERT ON settings
                 WHEN NEW.key = 'sort_order'
                 BEGIN SELECT RAISE(ABORT, 'sort order is locked'); END",
                (),
            )
            .await
            .unwrap();

        let after = Settings {
            default_theme: ThemeColor::Red,
            sort_by: SortBy::Created,
            sort_order: SortOrder::Descending,
        };
        assert!(repo.save(&after).await.is_err());
        assert_eq!(repo.load().await.unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreadable_value_falls_back_to_default() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());

        repo.set_setting(DEFAULT_THEME, "TEAL").await.unwrap();
        repo.set_setting(SORT_BY, "title").await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.default_theme, ThemeColor::Purple);
        assert_eq!(loaded.sort_by, SortBy::Title);
    }
}
