//! libSQL note and folder store

#![allow(clippy::cast_possible_wrap)] // SQLite stores block positions as i64

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use libsql::{params, Connection, Row, Value};

use crate::error::{Error, Result};
use crate::models::{
    Block, BlockKind, Folder, FolderDeletePolicy, FolderId, ImageRef, NoteDocument, NoteId,
    ThemeColor,
};
use crate::search::{query_notes, NoteQuery, NoteSummary};
use crate::store::{FolderStore, NoteStore};

const NOTE_COLUMNS: &str = "id, title, theme, folder_id, created_at, modified_at";
const FOLDER_COLUMNS: &str = "id, title, icon, theme, created_at, modified_at";

/// libSQL implementation of [`NoteStore`] and [`FolderStore`]
pub struct LibSqlNoteStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNoteStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn begin(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        Ok(())
    }

    /// Commit on success, roll back on failure.
    async fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                if let Err(e) = self.conn.execute("COMMIT", ()).await {
                    self.conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                self.conn.execute("ROLLBACK", ()).await.ok();
                Err(e)
            }
        }
    }

    /// A `folder_id` naming a deleted folder is stored as NULL.
    async fn write_note(&self, doc: &NoteDocument) -> Result<()> {
        let id = doc.id.as_str();
        self.conn
            .execute(
                "INSERT INTO notes (id, title, theme, folder_id, created_at, modified_at)
                 VALUES (?1, ?2, ?3, (SELECT id FROM folders WHERE id = ?4), ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    theme = excluded.theme,
                    folder_id = excluded.folder_id,
                    created_at = excluded.created_at,
                    modified_at = excluded.modified_at",
                params![
                    id.as_str(),
                    doc.title.as_str(),
                    doc.theme.as_str(),
                    optional_text(doc.folder_id.map(|folder| folder.as_str())),
                    doc.created_at,
                    doc.modified_at,
                ],
            )
            .await?;

        // Blocks and tags are rewritten wholesale; the position column keeps order.
        self.conn
            .execute("DELETE FROM blocks WHERE note_id = ?1", params![id.as_str()])
            .await?;
        for (position, block) in doc.blocks.iter().enumerate() {
            self.conn
                .execute(
                    "INSERT INTO blocks (id, note_id, position, kind, text, checked, image_ref, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        block.id.as_str(),
                        id.as_str(),
                        position as i64,
                        block.kind.as_str(),
                        block.text.as_str(),
                        i64::from(block.checked),
                        optional_text(block.image_ref.as_ref().map(|r| r.as_str().to_string())),
                        block.created_at,
                    ],
                )
                .await?;
        }

        self.conn
            .execute("DELETE FROM note_tags WHERE note_id = ?1", params![id.as_str()])
            .await?;
        for tag in &doc.tags {
            self.conn
                .execute(
                    "INSERT INTO note_tags (note_id, tag) VALUES (?1, ?2)",
                    params![id.as_str(), tag.as_str()],
                )
                .await?;
        }

        Ok(())
    }

    /// Load every note (optionally only one folder's) with blocks and tags.
    async fn load_documents(&self, folder: Option<FolderId>) -> Result<Vec<NoteDocument>> {
        let scope = optional_text(folder.map(|id| id.as_str()));

        let mut docs: Vec<NoteDocument> = Vec::new();
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE ?1 IS NULL OR folder_id = ?1"
                ),
                params![scope.clone()],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            docs.push(parse_note(&row)?);
        }

        let index: HashMap<String, usize> = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.id.as_str(), i))
            .collect();

        let mut rows = self
            .conn
            .query(
                "SELECT b.note_id, b.id, b.kind, b.text, b.checked, b.image_ref, b.created_at
                 FROM blocks b JOIN notes n ON n.id = b.note_id
                 WHERE ?1 IS NULL OR n.folder_id = ?1
                 ORDER BY b.note_id, b.position, b.created_at, b.id",
                params![scope.clone()],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let note_id: String = row.get(0)?;
            if let Some(&i) = index.get(&note_id) {
                docs[i].blocks.push(parse_block(&row, 1)?);
            }
        }

        let mut rows = self
            .conn
            .query(
                "SELECT t.note_id, t.tag
                 FROM note_tags t JOIN notes n ON n.id = t.note_id
                 WHERE ?1 IS NULL OR n.folder_id = ?1",
                params![scope],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let note_id: String = row.get(0)?;
            if let Some(&i) = index.get(&note_id) {
                docs[i].tags.insert(row.get::<String>(1)?);
            }
        }

        Ok(docs)
    }

    async fn load_blocks(&self, id: &NoteId) -> Result<Vec<Block>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, kind, text, checked, image_ref, created_at FROM blocks
                 WHERE note_id = ?1
                 ORDER BY position, created_at, id",
                params![id.as_str()],
            )
            .await?;

        let mut blocks = Vec::new();
        while let Some(row) = rows.next().await? {
            blocks.push(parse_block(&row, 0)?);
        }
        Ok(blocks)
    }

    async fn load_tags(&self, id: &NoteId) -> Result<BTreeSet<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT tag FROM note_tags WHERE note_id = ?1",
                params![id.as_str()],
            )
            .await?;

        let mut tags = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            tags.insert(row.get::<String>(0)?);
        }
        Ok(tags)
    }

    /// Member note ids per folder, oldest note first.
    async fn folder_members(
        &self,
        folder: Option<&FolderId>,
    ) -> Result<HashMap<String, Vec<NoteId>>> {
        let scope = optional_text(folder.map(FolderId::as_str));
        let mut rows = self
            .conn
            .query(
                "SELECT folder_id, id FROM notes
                 WHERE folder_id IS NOT NULL AND (?1 IS NULL OR folder_id = ?1)
                 ORDER BY created_at, id",
                params![scope],
            )
            .await?;

        let mut members: HashMap<String, Vec<NoteId>> = HashMap::new();
        while let Some(row) = rows.next().await? {
            let folder_id: String = row.get(0)?;
            let note_id: String = row.get(1)?;
            members
                .entry(folder_id)
                .or_default()
                .push(parse_field(&note_id, "note id")?);
        }
        Ok(members)
    }

    async fn remove_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool> {
        let folder_id = id.as_str();
        match policy {
            FolderDeletePolicy::DetachNotes => {
                self.conn
                    .execute(
                        "UPDATE notes SET folder_id = NULL WHERE folder_id = ?1",
                        params![folder_id.as_str()],
                    )
                    .await?;
            }
            FolderDeletePolicy::DeleteNotes => {
                let removed = self
                    .conn
                    .execute(
                        "DELETE FROM notes WHERE folder_id = ?1",
                        params![folder_id.as_str()],
                    )
                    .await?;
                tracing::debug!(folder_id = %id, removed, "Deleted folder notes");
            }
        }

        let affected = self
            .conn
            .execute("DELETE FROM folders WHERE id = ?1", params![folder_id.as_str()])
            .await?;
        Ok(affected > 0)
    }
}

impl NoteStore for LibSqlNoteStore<'_> {
    async fn load(&self, id: &NoteId) -> Result<Option<NoteDocument>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                params![id.as_str()],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let mut doc = parse_note(&row)?;
        doc.blocks = self.load_blocks(id).await?;
        doc.tags = self.load_tags(id).await?;
        Ok(Some(doc))
    }

    async fn save(&self, doc: &NoteDocument) -> Result<()> {
        self.begin().await?;
        let result = self.write_note(doc).await;
        self.finish(result).await?;

        tracing::debug!(note_id = %doc.id, blocks = doc.blocks.len(), "Saved note");
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id.as_str()])
            .await?;

        tracing::debug!(note_id = %id, deleted = affected > 0, "Deleted note");
        Ok(affected > 0)
    }

    async fn list(&self, query: &NoteQuery) -> Result<Vec<NoteSummary>> {
        let docs = self.load_documents(query.folder).await?;
        Ok(query_notes(&docs, query))
    }
}

impl FolderStore for LibSqlNoteStore<'_> {
    async fn load_folder(&self, id: &FolderId) -> Result<Option<Folder>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1"),
                params![id.as_str()],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let mut folder = parse_folder(&row)?;
        folder.notes = self
            .folder_members(Some(id))
            .await?
            .remove(&id.as_str())
            .unwrap_or_default();
        Ok(Some(folder))
    }

    async fn save_folder(&self, folder: &Folder) -> Result<()> {
        // An upsert, not INSERT OR REPLACE: replacing would detach the folder's notes.
        self.conn
            .execute(
                "INSERT INTO folders (id, title, icon, theme, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    icon = excluded.icon,
                    theme = excluded.theme,
                    modified_at = excluded.modified_at",
                params![
                    folder.id.as_str(),
                    folder.title.as_str(),
                    folder.icon.as_str(),
                    folder.theme.as_str(),
                    folder.created_at,
                    folder.modified_at,
                ],
            )
            .await?;

        tracing::debug!(folder_id = %folder.id, "Saved folder");
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId, policy: FolderDeletePolicy) -> Result<bool> {
        self.begin().await?;
        let result = self.remove_folder(id, policy).await;
        let deleted = self.finish(result).await?;

        tracing::debug!(folder_id = %id, ?policy, deleted, "Deleted folder");
        Ok(deleted)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {FOLDER_COLUMNS} FROM folders ORDER BY created_at DESC, title"),
                (),
            )
            .await?;

        let mut folders = Vec::new();
        while let Some(row) = rows.next().await? {
            folders.push(parse_folder(&row)?);
        }

        let mut members = self.folder_members(None).await?;
        for folder in &mut folders {
            folder.notes = members.remove(&folder.id.as_str()).unwrap_or_default();
        }
        Ok(folders)
    }
}

fn optional_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

fn optional_column(row: &Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx)? {
        Value::Text(text) => Ok(Some(text)),
        Value::Null => Ok(None),
        other => Err(Error::Database(format!(
            "unexpected value in column {idx}: {other:?}"
        ))),
    }
}

/// Parse a stored identifier or enum, treating garbage as corrupt data.
fn parse_field<T: FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Database(format!("invalid {what}: {value}")))
}

fn parse_note(row: &Row) -> Result<NoteDocument> {
    let id: String = row.get(0)?;
    let theme: String = row.get(2)?;
    let folder_id = optional_column(row, 3)?
        .map(|value| parse_field::<FolderId>(&value, "folder id"))
        .transpose()?;

    Ok(NoteDocument {
        id: parse_field(&id, "note id")?,
        title: row.get(1)?,
        tags: BTreeSet::new(),
        theme: parse_field::<ThemeColor>(&theme, "theme")?,
        blocks: Vec::new(),
        folder_id,
        created_at: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

/// Parse a block whose columns start at `offset`.
fn parse_block(row: &Row, offset: i32) -> Result<Block> {
    let id: String = row.get(offset)?;
    let kind: String = row.get(offset + 1)?;

    Ok(Block {
        id: parse_field(&id, "block id")?,
        kind: parse_field::<BlockKind>(&kind, "block kind")?,
        text: row.get(offset + 2)?,
        checked: row.get::<i64>(offset + 3)? != 0,
        image_ref: optional_column(row, offset + 4)?.map(ImageRef::new),
        created_at: row.get(offset + 5)?,
    })
}

fn parse_folder(row: &Row) -> Result<Folder> {
    let id: String = row.get(0)?;
    let theme: String = row.get(3)?;

    Ok(Folder {
        id: parse_field(&id, "folder id")?,
        title: row.get(1)?,
        icon: row.get(2)?,
        theme: parse_field::<ThemeColor>(&theme, "theme")?,
        notes: Vec::new(),
        created_at: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::SortBy;
    use crate::models::SortOrder;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_note() -> NoteDocument {
        let mut note = NoteDocument::new(ThemeColor::Orange)
            .with_title("Shopping")
            .with_blocks(vec![
                Block::text("buy milk"),
                Block::checklist("eggs", true),
                Block::bullet("bread"),
                Block::image(ImageRef::new("images/cart.png")),
                Block::text(""),
            ]);
        note.add_tag("errands").unwrap();
        note.add_tag("weekly").unwrap();
        note
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_and_load_roundtrip() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let note = sample_note();
        store.save(&note).await.unwrap();

        let loaded = store.load(&note.id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_missing_returns_none() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());
        assert!(store.load(&NoteId::new()).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_replaces_blocks_and_tags() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let mut note = sample_note();
        store.save(&note).await.unwrap();

        note.blocks.swap(0, 2);
        note.blocks.pop();
        note.remove_tag("weekly");
        note.title = "Groceries".to_string();
        store.save(&note).await.unwrap();

        let loaded = store.load(&note.id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_block_order_uses_position_not_created_at() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let mut first = Block::text("first");
        first.created_at = 2_000;
        let mut second = Block::text("second");
        second.created_at = 1_000;
        let note = NoteDocument::new(ThemeColor::Blue).with_blocks(vec![first, second]);
        store.save(&note).await.unwrap();

        let loaded = store.load(&note.id).await.unwrap().unwrap();
        let texts: Vec<_> = loaded.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_save_leaves_previous_version() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let note = sample_note();
        store.save(&note).await.unwrap();

        // Duplicate block ids violate the primary key halfway through the write.
        let mut broken = note.clone();
        broken.title = "Broken".to_string();
        let duplicate = broken.blocks[0].clone();
        broken.blocks.push(duplicate);
        assert!(store.save(&broken).await.is_err());

        let loaded = store.load(&note.id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_cascades() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let note = sample_note();
        store.save(&note).await.unwrap();
        assert!(store.delete(&note.id).await.unwrap());
        assert!(!store.delete(&note.id).await.unwrap());

        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM blocks", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_milk_by_title() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let shopping = NoteDocument::new(ThemeColor::Blue)
            .with_title("Shopping")
            .with_blocks(vec![Block::text("buy milk")]);
        let diary = NoteDocument::new(ThemeColor::Blue)
            .with_title("Diary")
            .with_blocks(vec![Block::text("quiet day")]);
        store.save(&shopping).await.unwrap();
        store.save(&diary).await.unwrap();

        let query = NoteQuery::all()
            .with_filter("milk")
            .sorted(SortBy::Title, SortOrder::Ascending);
        let found = store.list(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Shopping");
        assert_eq!(found[0].description, "buy milk");

        let all = store
            .list(&NoteQuery::all().sorted(SortBy::Title, SortOrder::Ascending))
            .await
            .unwrap();
        let titles: Vec<_> = all.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Diary", "Shopping"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_folders() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let mut folder = Folder::new("Recipes", "🍳", ThemeColor::Red).unwrap();
        store.save_folder(&folder).await.unwrap();

        let mut inside = sample_note();
        inside.folder_id = Some(folder.id);
        let outside = NoteDocument::new(ThemeColor::Purple).with_title("Loose");
        store.save(&inside).await.unwrap();
        store.save(&outside).await.unwrap();

        let loaded = store.load_folder(&folder.id).await.unwrap().unwrap();
        assert_eq!(loaded.notes, vec![inside.id]);
        assert_eq!(loaded.title, "Recipes");

        folder.update("Cooking", "🥘", ThemeColor::Green).unwrap();
        store.save_folder(&folder).await.unwrap();
        let listed = store.list_folders().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Cooking");
        assert_eq!(listed[0].notes, vec![inside.id]);

        let scoped = store
            .list(&NoteQuery::all().in_folder(folder.id))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, inside.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_folder_detaches_notes_by_default() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let folder = Folder::new("Trips", "✈️", ThemeColor::Blue).unwrap();
        store.save_folder(&folder).await.unwrap();
        let mut note = sample_note();
        note.folder_id = Some(folder.id);
        store.save(&note).await.unwrap();

        assert!(store
            .delete_folder(&folder.id, FolderDeletePolicy::default())
            .await
            .unwrap());
        assert!(store.load_folder(&folder.id).await.unwrap().is_none());
        let kept = store.load(&note.id).await.unwrap().unwrap();
        assert!(kept.folder_id.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_into_deleted_folder_detaches() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let folder = Folder::new("Trips", "✈️", ThemeColor::Blue).unwrap();
        store.save_folder(&folder).await.unwrap();
        let mut note = sample_note();
        note.folder_id = Some(folder.id);
        store.save(&note).await.unwrap();
        store
            .delete_folder(&folder.id, FolderDeletePolicy::DetachNotes)
            .await
            .unwrap();

        // The caller still holds the old folder id.
        note.title = "Packing".to_string();
        store.save(&note).await.unwrap();

        let kept = store.load(&note.id).await.unwrap().unwrap();
        assert_eq!(kept.title, "Packing");
        assert!(kept.folder_id.is_none());

        let mut never = NoteDocument::new(ThemeColor::Red).with_title("Stray");
        never.folder_id = Some(FolderId::new());
        store.save(&never).await.unwrap();
        assert!(store.load(&never.id).await.unwrap().unwrap().folder_id.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_folder_with_notes() {
        let db = setup().await;
        let store = LibSqlNoteStore::new(db.connection());

        let folder = Folder::new("Scratch", "🗑️", ThemeColor::Pink).unwrap();
        store.save_folder(&folder).await.unwrap();
        let mut note = sample_note();
        note.folder_id = Some(folder.id);
        store.save(&note).await.unwrap();

        assert!(store
            .delete_folder(&folder.id, FolderDeletePolicy::DeleteNotes)
            .await
            .unwrap());
        assert!(store.load(&note.id).await.unwrap().is_none());
        assert!(!store
            .delete_folder(&folder.id, FolderDeletePolicy::DeleteNotes)
            .await
            .unwrap());
    }
}
