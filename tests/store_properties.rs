//! Store-level tests for the favorites and watchlist.
//!
//! Property tests drive the reducer through `Store::dispatch` with an
//! in-memory backend; the file tests use a scratch directory per test.

use marquee::persistence::{InMemoryLists, JsonListStore, ListKey, ListPersistence};
use marquee::store::{Action, AppState, Store};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

fn memory_store() -> (Store, InMemoryLists) {
    let lists = InMemoryLists::new();
    let store = Store::new(AppState::default(), Box::new(lists.clone()));
    (store, lists)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("marquee_store_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn id_strategy() -> impl Strategy<Value = String> {
    (0u32..8).prop_map(|n| format!("tt{:07}", n))
}

#[derive(Debug, Clone)]
enum ListOp {
    Toggle(String),
    Add(String),
    Remove(String),
}

fn op_strategy() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        id_strategy().prop_map(ListOp::Toggle),
        id_strategy().prop_map(ListOp::Add),
        id_strategy().prop_map(ListOp::Remove),
    ]
}

fn favorite_action(op: ListOp) -> Action {
    match op {
        ListOp::Toggle(id) => Action::ToggleFavorite(id),
        ListOp::Add(id) => Action::AddFavorite(id),
        ListOp::Remove(id) => Action::RemoveFavorite(id),
    }
}

fn watchlist_action(op: ListOp) -> Action {
    match op {
        ListOp::Toggle(id) => Action::ToggleWatchlist(id),
        ListOp::Add(id) => Action::AddToWatchlist(id),
        ListOp::Remove(id) => Action::RemoveFromWatchlist(id),
    }
}

proptest! {
    #[test]
    fn toggling_twice_restores_favorites(
        ops in prop::collection::vec(op_strategy(), 0..20),
        id in id_strategy(),
    ) {
        let (mut store, _) = memory_store();
        for op in ops {
            store.dispatch(favorite_action(op)).unwrap();
        }
        let before = store.state().lists.favorites.clone();

        store.dispatch(Action::ToggleFavorite(id.clone())).unwrap();
        store.dispatch(Action::ToggleFavorite(id)).unwrap();

        let after = &store.state().lists.favorites;
        // Membership is restored; the ID may move to the end
        let before_set: HashSet<_> = before.iter().collect();
        let after_set: HashSet<_> = after.iter().collect();
        prop_assert_eq!(before_set, after_set);
    }

    #[test]
    fn lists_never_hold_duplicates(
        favorite_ops in prop::collection::vec(op_strategy(), 0..40),
        watchlist_ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let (mut store, lists) = memory_store();
        for op in favorite_ops {
            store.dispatch(favorite_action(op)).unwrap();
        }
        for op in watchlist_ops {
            store.dispatch(watchlist_action(op)).unwrap();
        }

        let state = store.state();
        for list in [&state.lists.favorites, &state.lists.watchlist] {
            let unique: HashSet<_> = list.iter().collect();
            prop_assert_eq!(unique.len(), list.len());
        }

        // Whatever was persisted reads back as the in-memory state
        prop_assert_eq!(lists.load(ListKey::Favorites).unwrap(), state.lists.favorites.clone());
        prop_assert_eq!(lists.load(ListKey::Watchlist).unwrap(), state.lists.watchlist.clone());
    }

    #[test]
    fn lists_are_independent(ids in prop::collection::vec(id_strategy(), 0..10)) {
        let (mut store, _) = memory_store();
        for id in &ids {
            store.dispatch(Action::AddFavorite(id.clone())).unwrap();
        }
        prop_assert!(store.state().lists.watchlist.is_empty());
    }
}

#[test]
fn test_toggle_favorite_persists_json_array() {
    let (mut store, lists) = memory_store();

    store
        .dispatch(Action::ToggleFavorite("tt0111161".to_string()))
        .unwrap();
    assert_eq!(store.state().lists.favorites, vec!["tt0111161".to_string()]);
    assert_eq!(
        lists.raw(ListKey::Favorites).as_deref(),
        Some(r#"["tt0111161"]"#)
    );

    store
        .dispatch(Action::ToggleFavorite("tt0111161".to_string()))
        .unwrap();
    assert!(store.state().lists.favorites.is_empty());
}

#[test]
fn test_clear_watchlist_leaves_favorites() {
    let (mut store, lists) = memory_store();
    store.dispatch(Action::AddFavorite("tt1".to_string())).unwrap();
    store.dispatch(Action::AddToWatchlist("tt2".to_string())).unwrap();

    store.dispatch(Action::ClearWatchlist).unwrap();

    assert_eq!(store.state().lists.favorites, vec!["tt1".to_string()]);
    assert!(store.state().lists.watchlist.is_empty());
    assert!(lists.load(ListKey::Watchlist).unwrap().is_empty());
}

// ============================================================================
// JSON files
// ============================================================================

#[test]
fn test_lists_survive_restart() {
    let dir = scratch_dir("restart");

    {
        let files = JsonListStore::open(&dir).unwrap();
        let (mut store, recovered) = Store::load(Box::new(files)).unwrap();
        assert!(recovered.is_empty());
        store.dispatch(Action::AddFavorite("tt0111161".to_string())).unwrap();
        store.dispatch(Action::AddFavorite("tt0068646".to_string())).unwrap();
        store.dispatch(Action::AddToWatchlist("tt0468569".to_string())).unwrap();
    }

    let files = JsonListStore::open(&dir).unwrap();
    let (store, recovered) = Store::load(Box::new(files)).unwrap();
    assert!(recovered.is_empty());
    assert_eq!(
        store.state().lists.favorites,
        vec!["tt0111161".to_string(), "tt0068646".to_string()]
    );
    assert_eq!(store.state().lists.watchlist, vec!["tt0468569".to_string()]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_unreadable_entry_is_left_in_place() {
    let dir = scratch_dir("unreadable");
    let files = JsonListStore::open(&dir).unwrap();
    // A directory where the file should be fails the read without being JSON
    std::fs::create_dir(files.path_for(ListKey::Favorites)).unwrap();

    assert!(Store::load(Box::new(files.clone())).is_err());
    assert!(files.path_for(ListKey::Favorites).is_dir());
    let corrupt = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt."))
        .count();
    assert_eq!(corrupt, 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_file_is_set_aside() {
    let dir = scratch_dir("corrupt");
    let files = JsonListStore::open(&dir).unwrap();
    std::fs::write(files.path_for(ListKey::Favorites), "{not json").unwrap();
    std::fs::write(files.path_for(ListKey::Watchlist), r#"["tt1"]"#).unwrap();

    let (mut store, recovered) = Store::load(Box::new(files.clone())).unwrap();

    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].key, ListKey::Favorites);
    assert!(store.state().lists.favorites.is_empty());
    assert_eq!(store.state().lists.watchlist, vec!["tt1".to_string()]);
    assert!(!files.path_for(ListKey::Favorites).exists());

    let quarantined = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("favorites.json.corrupt."))
        .count();
    assert_eq!(quarantined, 1);

    // Next save starts a clean file
    store.dispatch(Action::AddFavorite("tt2".to_string())).unwrap();
    assert_eq!(files.load(ListKey::Favorites).unwrap(), vec!["tt2".to_string()]);

    let _ = std::fs::remove_dir_all(&dir);
}
