//! List state for the home, folder and global note lists

use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{collect_tags, FolderId, NoteId, Settings, SortBy, SortOrder};
use crate::search::{ListState, NoteQuery, NoteSummary};
use crate::store::NoteStore;
use crate::util::is_blank;

/// What the list is being used for right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseMode {
    #[default]
    Browse,
    /// A search field is active
    Search,
    /// Picking notes for a bulk action
    Select,
    /// Rearranging or renaming the list's container
    Edit,
}

/// Filter, ordering, results and selection of one note list.
#[derive(Debug, Clone, Default)]
pub struct NoteBrowser {
    query: NoteQuery,
    mode: BrowseMode,
    results: Vec<NoteSummary>,
    selection: BTreeSet<NoteId>,
}

impl NoteBrowser {
    /// A list using the default ordering from `settings`, optionally scoped to a folder.
    #[must_use]
    pub fn new(settings: &Settings, folder: Option<FolderId>) -> Self {
        Self {
            query: NoteQuery {
                filter: None,
                sort_by: settings.sort_by,
                order: settings.sort_order,
                folder,
            },
            ..Self::default()
        }
    }

    pub const fn query(&self) -> &NoteQuery {
        &self.query
    }

    pub const fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub fn results(&self) -> &[NoteSummary] {
        &self.results
    }

    pub const fn selection(&self) -> &BTreeSet<NoteId> {
        &self.selection
    }

    /// Every tag used by the visible notes, sorted.
    pub fn tags(&self) -> Vec<String> {
        collect_tags(self.results.iter().map(|note| &note.tags))
    }

    pub fn is_selected(&self, id: &NoteId) -> bool {
        self.selection.contains(id)
    }

    /// Switch modes. Leaving `Select` drops the selection; leaving `Search`
    /// drops the filter.
    pub fn set_mode(&mut self, mode: BrowseMode) {
        if self.mode == BrowseMode::Select && mode != BrowseMode::Select {
            self.selection.clear();
        }
        if self.mode == BrowseMode::Search && mode == BrowseMode::Browse {
            self.query.filter = None;
        }
        self.mode = mode;
    }

    /// Update the search text. Typing enters `Search`; clearing returns to `Browse`.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        let filter = filter.into();
        let searching = !is_blank(&filter);
        self.query.filter = Some(filter);

        match (self.mode, searching) {
            (BrowseMode::Browse, true) => self.mode = BrowseMode::Search,
            (BrowseMode::Search, false) => self.mode = BrowseMode::Browse,
            _ => {}
        }
    }

    pub fn set_sort(&mut self, sort_by: SortBy, order: SortOrder) {
        self.query.sort_by = sort_by;
        self.query.order = order;
    }

    /// Re-run the query against the store.
    ///
    /// Selected notes that are no longer visible are deselected.
    pub async fn refresh<S: NoteStore>(&mut self, store: &S) -> Result<ListState> {
        self.results = store.list(&self.query).await?;
        let visible: BTreeSet<NoteId> = self.results.iter().map(|note| note.id).collect();
        self.selection.retain(|id| visible.contains(id));
        Ok(self.list_state())
    }

    pub fn list_state(&self) -> ListState {
        ListState::classify(self.results.len(), self.query.normalized_filter().is_some())
    }

    /// Flip one note's selection. Only works in `Select` mode.
    pub fn toggle_selection(&mut self, id: NoteId) -> bool {
        if self.mode != BrowseMode::Select {
            return false;
        }
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
        true
    }

    /// Select every visible note, or clear the selection when all already are.
    pub fn toggle_select_all(&mut self) {
        if self.mode != BrowseMode::Select {
            return;
        }
        let all_selected = !self.results.is_empty()
            && self
                .results
                .iter()
                .all(|note| self.selection.contains(&note.id));
        if all_selected {
            self.selection.clear();
        } else {
            self.selection = self.results.iter().map(|note| note.id).collect();
        }
    }

    /// Hand over the selected ids and clear the selection.
    pub fn take_selection(&mut self) -> Vec<NoteId> {
        std::mem::take(&mut self.selection).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, NoteDocument, ThemeColor};
    use crate::store::InMemoryNoteStore;
    use pretty_assertions::assert_eq;

    async fn store_with(titles: &[&str]) -> InMemoryNoteStore {
        let notes = titles.iter().map(|title| {
            let mut note = NoteDocument::new(ThemeColor::Purple)
                .with_title(*title)
                .with_blocks(vec![Block::text(format!("about {title}"))]);
            note.add_tag(&format!("#{}", title.len())).unwrap();
            note
        });
        InMemoryNoteStore::with_notes(notes).await
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_and_not_found_states() {
        let empty = InMemoryNoteStore::new();
        let mut browser = NoteBrowser::new(&Settings::default(), None);
        assert_eq!(browser.refresh(&empty).await.unwrap(), ListState::Empty);

        let store = store_with(&["Shopping"]).await;
        assert_eq!(browser.refresh(&store).await.unwrap(), ListState::Ready);

        browser.set_filter("zebra");
        assert_eq!(browser.mode(), BrowseMode::Search);
        assert_eq!(browser.refresh(&store).await.unwrap(), ListState::NotFound);

        browser.set_filter("");
        assert_eq!(browser.mode(), BrowseMode::Browse);
        assert_eq!(browser.refresh(&store).await.unwrap(), ListState::Ready);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tags_of_visible_notes() {
        let store = store_with(&["one", "two", "three"]).await;
        let mut browser = NoteBrowser::new(&Settings::default(), None);
        browser.refresh(&store).await.unwrap();
        assert_eq!(browser.tags(), vec!["#3", "#5"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_uses_settings_ordering() {
        let store = store_with(&["b", "a", "c"]).await;
        let settings = Settings {
            sort_by: SortBy::Title,
            sort_order: SortOrder::Ascending,
            ..Settings::default()
        };
        let mut browser = NoteBrowser::new(&settings, None);
        browser.refresh(&store).await.unwrap();
        let titles: Vec<_> = browser.results().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        browser.set_sort(SortBy::Title, SortOrder::Descending);
        browser.refresh(&store).await.unwrap();
        assert_eq!(browser.results()[0].title, "c");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_selection_only_in_select_mode() {
        let store = store_with(&["one", "two"]).await;
        let mut browser = NoteBrowser::new(&Settings::default(), None);
        browser.refresh(&store).await.unwrap();
        let first = browser.results()[0].id;

        assert!(!browser.toggle_selection(first));
        assert!(browser.selection().is_empty());

        browser.set_mode(BrowseMode::Select);
        assert!(browser.toggle_selection(first));
        assert!(browser.is_selected(&first));
        assert!(browser.toggle_selection(first));
        assert!(!browser.is_selected(&first));

        browser.toggle_selection(first);
        browser.set_mode(BrowseMode::Browse);
        assert!(browser.selection().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_toggle_select_all() {
        let store = store_with(&["one", "two", "three"]).await;
        let mut browser = NoteBrowser::new(&Settings::default(), None);
        browser.refresh(&store).await.unwrap();
        browser.set_mode(BrowseMode::Select);

        browser.toggle_select_all();
        assert_eq!(browser.selection().len(), 3);
        browser.toggle_select_all();
        assert!(browser.selection().is_empty());

        browser.toggle_selection(browser.results()[1].id);
        browser.toggle_select_all();
        assert_eq!(browser.selection().len(), 3);

        let taken = browser.take_selection();
        assert_eq!(taken.len(), 3);
        assert!(browser.selection().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_refresh_drops_hidden_selection() {
        let store = store_with(&["milk run", "diary"]).await;
        let mut browser = NoteBrowser::new(&Settings::default(), None);
        browser.refresh(&store).await.unwrap();
        browser.set_mode(BrowseMode::Select);
        browser.toggle_select_all();

        browser.set_filter("milk");
        browser.refresh(&store).await.unwrap();
        assert_eq!(browser.results().len(), 1);
        assert_eq!(browser.selection().len(), 1);
    }
}
