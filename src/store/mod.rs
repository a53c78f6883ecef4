//! Application state container.
//!
//! - `state` - the `AppState` tree
//! - `action` - `Action` and fetch bookkeeping types
//! - `reducer` - the pure `reduce` function
//!
//! `Store` owns the state and the list persistence boundary. It is created in
//! `main` and handed to the `App`; nothing reaches it through a global.

mod action;
mod reducer;
mod state;

pub use action::{Action, FetchKind, FetchPayload, FiltersPatch};
pub use reducer::reduce;
pub use state::{AppState, FetchSlot, Filters, ListsState, MoviesState, UiState, ViewMode};

use crate::persistence::{ListKey, ListPersistence, PersistenceError};

pub struct Store {
    state: AppState,
    persistence: Box<dyn ListPersistence>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A stored list that was malformed at startup, moved aside and reset.
#[derive(Debug)]
pub struct RecoveredList {
    pub key: ListKey,
    pub error: PersistenceError,
}

impl Store {
    pub fn new(state: AppState, persistence: Box<dyn ListPersistence>) -> Self {
        Self { state, persistence }
    }

    /// Build a store from whatever the persistence layer holds.
    ///
    /// A list that is not valid JSON is quarantined and replaced by an empty
    /// one; each such reset is reported so the caller can tell the user. Any
    /// other failure, such as a read error, leaves the entry in place and is
    /// returned.
    pub fn load(
        persistence: Box<dyn ListPersistence>,
    ) -> Result<(Self, Vec<RecoveredList>), PersistenceError> {
        let mut recovered = Vec::new();
        let mut read = |key: ListKey| match persistence.load(key) {
            Ok(ids) => Ok(ids),
            Err(error @ PersistenceError::Malformed { .. }) => {
                tracing::warn!(key = key.as_str(), error = %error, "Stored list malformed, starting empty");
                if let Err(e) = persistence.quarantine(key) {
                    tracing::warn!(key = key.as_str(), error = %e, "Failed to move malformed list aside");
                }
                recovered.push(RecoveredList { key, error });
                Ok(Vec::new())
            }
            Err(error) => {
                tracing::error!(key = key.as_str(), error = %error, "Failed to read stored list");
                Err(error)
            }
        };
        let favorites = read(ListKey::Favorites)?;
        let watchlist = read(ListKey::Watchlist)?;

        tracing::info!(
            favorites = favorites.len(),
            watchlist = watchlist.len(),
            "Loaded lists"
        );
        let state = AppState::with_lists(favorites, watchlist);
        Ok((Self::new(state, persistence), recovered))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply `action`, then persist any list it changed.
    ///
    /// The transition is kept even when persisting fails; the error is
    /// returned for the caller to surface.
    pub fn dispatch(&mut self, action: Action) -> Result<(), PersistenceError> {
        let cleared = match action {
            Action::ClearFavorites => Some(ListKey::Favorites),
            Action::ClearWatchlist => Some(ListKey::Watchlist),
            _ => None,
        };
        let name = action.name();
        let before = self.state.lists.clone();

        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        tracing::trace!(action = name, "Dispatched");

        let mut result = Ok(());
        for key in ListKey::ALL {
            let (old, new) = match key {
                ListKey::Favorites => (&before.favorites, &self.state.lists.favorites),
                ListKey::Watchlist => (&before.watchlist, &self.state.lists.watchlist),
            };
            let write = if cleared == Some(key) {
                self.persistence.remove(key)
            } else if old != new {
                self.persistence.save(key, new)
            } else {
                continue;
            };
            if let Err(e) = write {
                tracing::warn!(key = key.as_str(), action = name, error = %e, "Failed to persist list");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryLists;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Rejects every write, for checking that state still advances.
    struct ReadOnly;

    impl ListPersistence for ReadOnly {
        fn load(&self, _key: ListKey) -> Result<Vec<String>, PersistenceError> {
            Ok(Vec::new())
        }

        fn save(&self, key: ListKey, _ids: &[String]) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io {
                path: format!("{}.json", key.as_str()).into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, key: ListKey) -> Result<(), PersistenceError> {
            self.save(key, &[])
        }
    }

    #[test]
    fn test_dispatch_persists_changed_list_only() {
        let lists = InMemoryLists::new();
        let (mut store, recovered) = Store::load(Box::new(lists.clone())).unwrap();
        assert!(recovered.is_empty());

        store
            .dispatch(Action::ToggleFavorite("tt0111161".into()))
            .unwrap();
        assert_eq!(
            lists.raw(ListKey::Favorites).as_deref(),
            Some(r#"["tt0111161"]"#)
        );
        assert!(lists.raw(ListKey::Watchlist).is_none());

        store.dispatch(Action::ToggleFilterPanel).unwrap();
        store
            .dispatch(Action::ToggleFavorite("tt0111161".into()))
            .unwrap();
        assert_eq!(lists.raw(ListKey::Favorites).as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_removes_entry() {
        let lists = InMemoryLists::new().with_raw(ListKey::Watchlist, r#"["tt1","tt2"]"#);
        let (mut store, _) = Store::load(Box::new(lists.clone())).unwrap();
        assert_eq!(store.state().lists.watchlist.len(), 2);

        store.dispatch(Action::ClearWatchlist).unwrap();
        assert!(store.state().lists.watchlist.is_empty());
        assert!(lists.raw(ListKey::Watchlist).is_none());
    }

    #[test]
    fn test_load_recovers_from_malformed_entry() {
        let lists = InMemoryLists::new()
            .with_raw(ListKey::Favorites, "{oops")
            .with_raw(ListKey::Watchlist, r#"["tt9"]"#);
        let (store, recovered) = Store::load(Box::new(lists.clone())).unwrap();

        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].key, ListKey::Favorites);
        assert!(matches!(
            recovered[0].error,
            PersistenceError::Malformed { .. }
        ));
        assert!(store.state().lists.favorites.is_empty());
        assert_eq!(store.state().lists.watchlist, vec!["tt9".to_string()]);
        assert!(lists.raw(ListKey::Favorites).is_none());
    }

    /// Fails every read with an I/O error and counts quarantine attempts.
    #[derive(Default)]
    struct Unreadable {
        quarantined: Arc<AtomicUsize>,
    }

    impl ListPersistence for Unreadable {
        fn load(&self, key: ListKey) -> Result<Vec<String>, PersistenceError> {
            Err(PersistenceError::Io {
                path: format!("{}.json", key.as_str()).into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn save(&self, _key: ListKey, _ids: &[String]) -> Result<(), PersistenceError> {
            Ok(())
        }

        fn remove(&self, _key: ListKey) -> Result<(), PersistenceError> {
            Ok(())
        }

        fn quarantine(&self, _key: ListKey) -> Result<(), PersistenceError> {
            self.quarantined.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_load_read_error_is_returned_without_quarantine() {
        let lists = Unreadable::default();
        let quarantined = Arc::clone(&lists.quarantined);

        let err = Store::load(Box::new(lists)).unwrap_err();

        assert!(matches!(err, PersistenceError::Io { .. }));
        assert_eq!(quarantined.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_load_dedupes() {
        let lists = InMemoryLists::new().with_raw(ListKey::Favorites, r#"["a","b","a"]"#);
        let (store, _) = Store::load(Box::new(lists)).unwrap();
        assert_eq!(
            store.state().lists.favorites,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_persist_failure_keeps_transition() {
        let mut store = Store::new(AppState::default(), Box::new(ReadOnly));
        let err = store
            .dispatch(Action::AddToWatchlist("tt1".into()))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(store.state().lists.in_watchlist("tt1"));
    }

    #[test]
    fn test_non_list_actions_do_not_write() {
        let mut store = Store::new(AppState::default(), Box::new(ReadOnly));
        store.dispatch(Action::SetPage(2)).unwrap();
        store.dispatch(Action::RemoveFavorite("absent".into())).unwrap();
        assert_eq!(store.state().movies.pagination.page, 2);
    }
}
