//! Recent searches and favorites.
//!
//! Both lists are keyed by display name, loaded once from the store and
//! written back in full after every mutation. Listeners are called after each
//! successful mutation with the updated list.

use std::sync::Arc;

use crate::{
    error::DashboardError,
    model::Location,
    store::{FAVORITES_KEY, KeyValueStore, RECENT_SEARCHES_KEY},
};

pub const RECENT_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Recent,
    Favorites,
}

impl ListKind {
    fn storage_key(&self) -> &'static str {
        match self {
            ListKind::Recent => RECENT_SEARCHES_KEY,
            ListKind::Favorites => FAVORITES_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

pub type ListListener = Box<dyn Fn(ListKind, &[Location]) + Send + Sync>;

pub struct LocationLists {
    store: Arc<dyn KeyValueStore>,
    recent: Vec<Location>,
    favorites: Vec<Location>,
    listeners: Vec<ListListener>,
}

impl std::fmt::Debug for LocationLists {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationLists")
            .field("recent", &self.recent)
            .field("favorites", &self.favorites)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl LocationLists {
    /// Load both lists from `store`. Missing or corrupt values yield empty
    /// lists; stored duplicates and overflow are dropped.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut recent = read_list(store.as_ref(), ListKind::Recent);
        dedup_by_name(&mut recent);
        recent.truncate(RECENT_CAPACITY);

        let mut favorites = read_list(store.as_ref(), ListKind::Favorites);
        dedup_by_name(&mut favorites);

        Self {
            store,
            recent,
            favorites,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: ListListener) {
        self.listeners.push(listener);
    }

    /// Most recent first.
    pub fn recent(&self) -> &[Location] {
        &self.recent
    }

    /// Insertion order.
    pub fn favorites(&self) -> &[Location] {
        &self.favorites
    }

    pub fn list(&self, kind: ListKind) -> &[Location] {
        match kind {
            ListKind::Recent => &self.recent,
            ListKind::Favorites => &self.favorites,
        }
    }

    /// Move `location` to the front of the recent list with a fresh timestamp,
    /// dropping any older entry with the same name and anything beyond
    /// [`RECENT_CAPACITY`].
    pub fn record_recent_search(&mut self, location: &Location) {
        self.recent.retain(|entry| entry.name != location.name);
        self.recent.insert(0, location.stamped_now());
        self.recent.truncate(RECENT_CAPACITY);

        tracing::info!("Recorded recent search: {}", location.name);
        self.commit(ListKind::Recent);
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|entry| entry.name == name)
    }

    /// Remove `location` from favorites if present (by name), append it
    /// otherwise. Fails with [`DashboardError::NoLocationToFavorite`] when
    /// there is no location to toggle.
    pub fn toggle_favorite(
        &mut self,
        location: Option<&Location>,
    ) -> Result<FavoriteToggle, DashboardError> {
        let location = location.ok_or(DashboardError::NoLocationToFavorite)?;

        let outcome = if self.is_favorite(&location.name) {
            self.favorites.retain(|entry| entry.name != location.name);
            FavoriteToggle::Removed
        } else {
            self.favorites.push(location.unstamped());
            FavoriteToggle::Added
        };

        tracing::info!("Favorite {}: {:?}", location.name, outcome);
        self.commit(ListKind::Favorites);
        Ok(outcome)
    }

    fn commit(&self, kind: ListKind) {
        let list = self.list(kind);

        match serde_json::to_string(list) {
            Ok(json) => {
                if let Err(e) = self.store.set(kind.storage_key(), &json) {
                    tracing::warn!("Failed to persist {:?} list: {:#}", kind, e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize {:?} list: {}", kind, e),
        }

        for listener in &self.listeners {
            listener(kind, list);
        }
    }
}

fn read_list(store: &dyn KeyValueStore, kind: ListKind) -> Vec<Location> {
    let Some(raw) = store.get(kind.storage_key()) else {
        return Vec::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("Ignoring corrupt {:?} list in storage: {}", kind, e);
        Vec::new()
    })
}

fn dedup_by_name(list: &mut Vec<Location>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|entry| seen.insert(entry.name.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use parking_lot::Mutex;

    fn loc(name: &str) -> Location {
        Location::new(name, 10.0, 20.0)
    }

    fn names(list: &[Location]) -> Vec<&str> {
        list.iter().map(|l| l.name.as_str()).collect()
    }

    fn empty_lists() -> (Arc<MemoryStore>, LocationLists) {
        let store = Arc::new(MemoryStore::new());
        let lists = LocationLists::load(store.clone());
        (store, lists)
    }

    #[test]
    fn recent_is_most_recent_first_and_bounded() {
        let (_, mut lists) = empty_lists();

        for name in ["A", "B", "C", "D", "E", "F"] {
            lists.record_recent_search(&loc(name));
        }

        assert_eq!(names(lists.recent()), vec!["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn researching_moves_entry_to_front_without_growing() {
        let (_, mut lists) = empty_lists();

        for name in ["A", "B", "C"] {
            lists.record_recent_search(&loc(name));
        }
        lists.record_recent_search(&loc("A"));

        assert_eq!(names(lists.recent()), vec!["A", "C", "B"]);
    }

    #[test]
    fn recent_invariants_hold_for_long_sequences() {
        let (_, mut lists) = empty_lists();
        let pool = ["Oslo", "Rome", "Lima", "Pune", "Kyiv", "Suva", "Baku"];

        // Deterministic pseudo-random walk over the pool.
        let mut state: u32 = 7;
        for _ in 0..200 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let name = pool[(state >> 16) as usize % pool.len()];
            lists.record_recent_search(&loc(name));

            let recent = names(lists.recent());
            assert!(recent.len() <= RECENT_CAPACITY);
            assert_eq!(recent[0], name);

            let mut unique = recent.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), recent.len());
        }
    }

    #[test]
    fn recent_entries_are_stamped_and_persisted() {
        let (store, mut lists) = empty_lists();
        lists.record_recent_search(&loc("A"));

        assert!(lists.recent()[0].timestamp.is_some());

        let raw = store.get(RECENT_SEARCHES_KEY).unwrap();
        let stored: Vec<Location> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, lists.recent());
    }

    #[test]
    fn toggle_favorite_is_an_involution() {
        let (_, mut lists) = empty_lists();
        lists.toggle_favorite(Some(&loc("A"))).unwrap();
        lists.toggle_favorite(Some(&loc("B"))).unwrap();
        lists.toggle_favorite(Some(&loc("C"))).unwrap();
        let before = lists.favorites().to_vec();

        assert_eq!(lists.toggle_favorite(Some(&loc("D"))).unwrap(), FavoriteToggle::Added);
        assert!(lists.is_favorite("D"));
        assert_eq!(lists.toggle_favorite(Some(&loc("D"))).unwrap(), FavoriteToggle::Removed);
        assert_eq!(lists.favorites(), before.as_slice());

        assert_eq!(lists.toggle_favorite(Some(&loc("B"))).unwrap(), FavoriteToggle::Removed);
        assert_eq!(names(lists.favorites()), vec!["A", "C"]);
        lists.toggle_favorite(Some(&loc("B"))).unwrap();
        assert_eq!(names(lists.favorites()), vec!["A", "C", "B"]);
    }

    #[test]
    fn toggle_favorite_matches_by_name_only() {
        let (_, mut lists) = empty_lists();
        lists.toggle_favorite(Some(&Location::new("Paris, France", 48.85, 2.35))).unwrap();

        let elsewhere = Location::new("Paris, France", 33.66, -95.55);
        assert_eq!(lists.toggle_favorite(Some(&elsewhere)).unwrap(), FavoriteToggle::Removed);
        assert!(lists.favorites().is_empty());
    }

    #[test]
    fn toggle_favorite_without_location_fails_and_keeps_state() {
        let (store, mut lists) = empty_lists();

        let err = lists.toggle_favorite(None).unwrap_err();
        assert!(matches!(err, DashboardError::NoLocationToFavorite));
        assert!(store.get(FAVORITES_KEY).is_none());
    }

    #[test]
    fn favorites_are_persisted_on_every_toggle_and_reload_in_order() {
        let (store, mut lists) = empty_lists();

        for name in ["A", "B", "C"] {
            lists.toggle_favorite(Some(&loc(name))).unwrap();
        }
        lists.toggle_favorite(Some(&loc("B"))).unwrap();

        let raw = store.get(FAVORITES_KEY).unwrap();
        let stored: Vec<Location> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, lists.favorites());

        let reloaded = LocationLists::load(store);
        assert_eq!(names(reloaded.favorites()), vec!["A", "C"]);
    }

    #[test]
    fn favorites_are_stored_without_timestamp() {
        let (_, mut lists) = empty_lists();
        lists.toggle_favorite(Some(&loc("A").stamped_now())).unwrap();
        assert_eq!(lists.favorites()[0].timestamp, None);
    }

    #[test]
    fn corrupt_storage_loads_as_empty() {
        let store = Arc::new(
            MemoryStore::new()
                .with_entry(RECENT_SEARCHES_KEY, "not json")
                .with_entry(FAVORITES_KEY, "{\"oops\": 1}"),
        );

        let lists = LocationLists::load(store);
        assert!(lists.recent().is_empty());
        assert!(lists.favorites().is_empty());
    }

    #[test]
    fn stored_lists_are_sanitized_on_load() {
        let stored: Vec<Location> =
            ["A", "B", "A", "C", "D", "E", "F"].iter().map(|n| loc(n)).collect();
        let json = serde_json::to_string(&stored).unwrap();
        let store = Arc::new(
            MemoryStore::new()
                .with_entry(RECENT_SEARCHES_KEY, &json)
                .with_entry(FAVORITES_KEY, &json),
        );

        let lists = LocationLists::load(store);
        assert_eq!(names(lists.recent()), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(names(lists.favorites()), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn listeners_see_each_mutation() {
        let (_, mut lists) = empty_lists();
        let seen: Arc<Mutex<Vec<(ListKind, usize)>>> = Arc::default();

        let sink = seen.clone();
        lists.subscribe(Box::new(move |kind, list| sink.lock().push((kind, list.len()))));

        lists.record_recent_search(&loc("A"));
        lists.toggle_favorite(Some(&loc("A"))).unwrap();
        let _ = lists.toggle_favorite(None);

        assert_eq!(*seen.lock(), vec![(ListKind::Recent, 1), (ListKind::Favorites, 1)]);
    }
}
