//! In-memory state of one source's list view.

use super::filter::filter_indices;
use super::reconcile::{begin_toggle, decorate, redecorate, Decorated, FavoriteIndex, ToggleRequest};
use super::{Entry, Source};
use crate::api::FavoriteItem;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Never requested.
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// An optimistic toggle waiting for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToggle {
    /// Natural key of the toggled entry.
    pub key: String,
    /// State before the flip, restored if the request fails.
    pub original: (bool, Option<i64>),
    pub request: ToggleRequest,
}

#[derive(Debug, Clone)]
pub struct SourcePage<T> {
    pub source: Source,
    pub state: LoadState,
    items: Vec<Decorated<T>>,
    favorites: Vec<FavoriteItem>,
    filter: String,
    visible: Vec<usize>,
    selected: usize,
    detail_open: bool,
}

impl<T: Entry> SourcePage<T> {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            state: LoadState::Idle,
            items: Vec::new(),
            favorites: Vec::new(),
            filter: String::new(),
            visible: Vec::new(),
            selected: 0,
            detail_open: false,
        }
    }

    pub fn start_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace this page's favorites and re-match the current items.
    pub fn set_favorites(&mut self, favorites: Vec<FavoriteItem>) {
        self.favorites = favorites
            .into_iter()
            .filter(|f| self.source.owns(f))
            .collect();
        let index = self.index();
        redecorate(&mut self.items, &index);
    }

    /// Install a freshly fetched list, decorated with the current favorites.
    ///
    /// Closes the detail overlay, whose entry may no longer be at the selection.
    pub fn set_items(&mut self, items: Vec<T>) {
        let index = self.index();
        self.items = decorate(items, &index);
        self.detail_open = false;
        self.state = LoadState::Ready;
        self.refilter();
    }

    /// Items fetch failed: no list, only the error.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.items.clear();
        self.visible.clear();
        self.selected = 0;
        self.detail_open = false;
        self.state = LoadState::Failed(message.into());
    }

    fn index(&self) -> FavoriteIndex {
        FavoriteIndex::build(self.source, &self.favorites)
    }

    pub fn items(&self) -> &[Decorated<T>] {
        &self.items
    }

    pub fn favorites(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    // ========================================================================
    // Filter and selection
    // ========================================================================

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = filter_indices(&self.items, &self.filter);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Decorated<T>> + '_ {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Decorated<T>> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.items.get(i))
    }

    fn selected_mut(&mut self) -> Option<&mut Decorated<T>> {
        let i = *self.visible.get(self.selected)?;
        self.items.get_mut(i)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    // ========================================================================
    // Detail overlay
    // ========================================================================

    /// Open the detail overlay for the selection, returning the opened entry.
    pub fn open_detail(&mut self) -> Option<&T> {
        let i = *self.visible.get(self.selected)?;
        self.detail_open = true;
        self.items.get(i).map(|d| &d.item)
    }

    pub fn close_detail(&mut self) {
        self.detail_open = false;
    }

    pub fn detail_open(&self) -> bool {
        self.detail_open
    }

    // ========================================================================
    // Favorite toggling
    // ========================================================================

    /// Optimistically flip the selected entry's favorite flag.
    pub fn toggle_selected(&mut self) -> Option<PendingToggle> {
        let entry = self.selected_mut()?;
        let key = entry.item.natural_key().to_string();
        let original = entry.favorite_state();
        let request = begin_toggle(entry);
        Some(PendingToggle {
            key,
            original,
            request,
        })
    }

    /// The backend deleted favorite `id`; forget the record and unmark any
    /// entry still pointing at it.
    pub fn favorite_removed(&mut self, id: i64) {
        self.favorites.retain(|f| f.id != id);
        for entry in self.items.iter_mut().filter(|e| e.favorite_id == Some(id)) {
            entry.restore((false, None));
        }
    }

    /// Roll back an optimistic flip.
    pub fn toggle_failed(&mut self, key: &str, original: (bool, Option<i64>)) {
        for entry in self.items.iter_mut().filter(|e| e.item.natural_key() == key) {
            entry.restore(original);
        }
    }
}
