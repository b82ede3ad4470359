//! Matching list entries against the user's favorites.

use std::collections::HashMap;

use super::{Entry, Searchable, Source};
use crate::api::{FavoriteItem, NewFavorite};

/// An entry with its favorite state.
///
/// `favorite_id` is only `Some` while `is_favorite` is true. Right after
/// [`decorate`] it is `Some` exactly when a matching favorite was loaded; an
/// optimistic add leaves it `None` until favorites are fetched again.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorated<T> {
    pub item: T,
    pub is_favorite: bool,
    pub favorite_id: Option<i64>,
}

impl<T> Decorated<T> {
    pub fn plain(item: T) -> Self {
        Self {
            item,
            is_favorite: false,
            favorite_id: None,
        }
    }

    /// Snapshot used to roll back an optimistic toggle.
    pub fn favorite_state(&self) -> (bool, Option<i64>) {
        (self.is_favorite, self.favorite_id)
    }

    pub fn restore(&mut self, (is_favorite, favorite_id): (bool, Option<i64>)) {
        self.is_favorite = is_favorite;
        self.favorite_id = favorite_id.filter(|_| is_favorite);
    }
}

impl<T: Searchable> Searchable for Decorated<T> {
    fn search_fields(&self) -> Vec<&str> {
        self.item.search_fields()
    }
}

/// Favorites of one source keyed by the field entries are matched on.
#[derive(Debug, Clone, Default)]
pub struct FavoriteIndex {
    ids: HashMap<String, i64>,
}

impl FavoriteIndex {
    /// Index the favorites that belong to `source`. When several share a key,
    /// the first in server order wins.
    pub fn build(source: Source, favorites: &[FavoriteItem]) -> Self {
        let mut ids = HashMap::new();
        for fav in favorites.iter().filter(|f| source.owns(f)) {
            ids.entry(source.favorite_key(fav).to_string())
                .or_insert(fav.id);
        }
        Self { ids }
    }

    pub fn lookup(&self, key: &str) -> Option<i64> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decorate fresh entries, keeping their order.
pub fn decorate<T: Entry>(items: Vec<T>, index: &FavoriteIndex) -> Vec<Decorated<T>> {
    items
        .into_iter()
        .map(|item| {
            let favorite_id = index.lookup(item.natural_key());
            Decorated {
                item,
                is_favorite: favorite_id.is_some(),
                favorite_id,
            }
        })
        .collect()
}

/// Re-match already decorated entries against a newer favorites set.
pub fn redecorate<T: Entry>(items: &mut [Decorated<T>], index: &FavoriteIndex) {
    for entry in items {
        entry.favorite_id = index.lookup(entry.item.natural_key());
        entry.is_favorite = entry.favorite_id.is_some();
    }
}

/// What the backend must be asked after an optimistic flip.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleRequest {
    Add(NewFavorite),
    Remove(i64),
    /// Un-favorited but the record id was never learned; nothing to delete.
    MissingId,
}

/// Flip the favorite flag and return the matching backend request.
pub fn begin_toggle<T: Entry>(entry: &mut Decorated<T>) -> ToggleRequest {
    entry.is_favorite = !entry.is_favorite;
    if entry.is_favorite {
        ToggleRequest::Add(entry.item.favorite_payload())
    } else {
        match entry.favorite_id.take() {
            Some(id) => ToggleRequest::Remove(id),
            None => ToggleRequest::MissingId,
        }
    }
}
