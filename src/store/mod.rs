pub mod memory;
pub mod sqlite;

use crate::app::Result;
use crate::domain::{Item, Ordering};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backend-agnostic operations over the item collection.
///
/// Implementations share no state; the caller picks a backend once at
/// construction time (durable for normal sessions, ephemeral for previews)
/// and the engine itself has no notion of mode.
pub trait Store {
    /// Insert-or-update by dedup key.
    ///
    /// A candidate whose non-empty GUID was seen before for the same feed
    /// URL updates the existing record in place: title, author, content,
    /// link and the feed-supplied timestamps are refreshed while the
    /// identifier, `created_at`, favourite flag and read state are
    /// preserved. Unseen or empty GUIDs insert a new record with the next
    /// identifier and a fresh `created_at`. Either way the candidate's
    /// `id` and `created_at` are filled in on return. Duplicates are the
    /// steady-state case and never an error.
    fn upsert_item(&self, item: &mut Item) -> Result<()>;

    /// Open a bulk-write span: upserts until `end_batch` commit atomically.
    /// Nesting is a caller error (`InvalidState`).
    fn begin_batch(&self) -> Result<()>;

    /// Commit the open batch. Calling without one is `InvalidState`.
    fn end_batch(&self) -> Result<()>;

    /// The whole collection sorted by published date, identifier as the
    /// tie-break (see [`Ordering`]). `feed_name` is left empty; the
    /// config-aware caller joins display names before rendering.
    fn get_all_items(&self, ordering: Ordering) -> Result<Vec<Item>>;

    fn get_item_by_id(&self, id: i64) -> Result<Item>;

    /// Distinct feed URLs in first-seen order. Consumers must not rely on
    /// the ordering.
    fn get_all_feed_urls(&self) -> Result<Vec<String>>;

    /// Flip read state: unread becomes read now, read becomes unread.
    fn toggle_read(&self, id: i64) -> Result<()>;

    /// Absolute setter; an already-read item keeps its original `read_at`.
    fn mark_read(&self, id: i64) -> Result<()>;

    fn mark_unread(&self, id: i64) -> Result<()>;

    /// Stamp every unread item read now; already-read items are untouched.
    fn mark_all_read(&self) -> Result<()>;

    fn toggle_favourite(&self, id: i64) -> Result<()>;

    /// Remove every item of a feed. With `include_favourites` false,
    /// favourited items survive. Zero matches is a no-op success.
    fn delete_by_feed_url(&self, feed_url: &str, include_favourites: bool) -> Result<()>;

    fn count_unread(&self) -> Result<i64>;
}

/// Behavioral property suite run against every backend.
///
/// Each backend's test module calls these with its own instance so the two
/// implementations stay observably equivalent.
#[cfg(test)]
pub(crate) mod testutil {
    use chrono::{DateTime, Duration, Utc};

    use super::Store;
    use crate::app::BrookError;
    use crate::domain::{Item, Ordering};

    pub fn candidate(feed_url: &str, guid: &str, title: &str) -> Item {
        let mut item = Item::new(feed_url, guid);
        item.title = title.into();
        item.published_at = Some(Utc::now());
        item
    }

    pub fn check_upsert_is_idempotent(store: &dyn Store) {
        let mut first = candidate("https://a.example/feed.xml", "guid-1", "Original");
        store.upsert_item(&mut first).unwrap();
        let stored = store.get_item_by_id(first.id).unwrap();

        let mut second = candidate("https://a.example/feed.xml", "guid-1", "Updated");
        second.author = "someone".into();
        store.upsert_item(&mut second).unwrap();

        let items = store.get_all_items(Ordering::Asc).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, first.id);
        assert_eq!(items[0].title, "Updated");
        assert_eq!(items[0].author, "someone");
        assert_eq!(items[0].created_at, stored.created_at);
    }

    pub fn check_upsert_preserves_state(store: &dyn Store) {
        let mut item = candidate("https://a.example/feed.xml", "guid-1", "Post");
        store.upsert_item(&mut item).unwrap();
        store.mark_read(item.id).unwrap();
        store.toggle_favourite(item.id).unwrap();
        let before = store.get_item_by_id(item.id).unwrap();

        let mut refetch = candidate("https://a.example/feed.xml", "guid-1", "Post (edited)");
        store.upsert_item(&mut refetch).unwrap();

        let after = store.get_item_by_id(item.id).unwrap();
        assert_eq!(after.title, "Post (edited)");
        assert_eq!(after.read_at, before.read_at);
        assert!(after.favourite);
    }

    pub fn check_identifiers_are_stable(store: &dyn Store) {
        for (i, guid) in ["g-1", "g-2", "g-3"].iter().enumerate() {
            let mut item = candidate("https://a.example/feed.xml", guid, "t");
            store.upsert_item(&mut item).unwrap();
            assert_eq!(item.id, i as i64 + 1);
        }

        store
            .delete_by_feed_url("https://a.example/feed.xml", true)
            .unwrap();
        assert!(store.get_all_items(Ordering::Asc).unwrap().is_empty());

        // Identifiers are never reused after deletion.
        let mut item = candidate("https://a.example/feed.xml", "g-4", "t");
        store.upsert_item(&mut item).unwrap();
        assert_eq!(item.id, 4);
    }

    pub fn check_empty_guid_is_always_new(store: &dyn Store) {
        let mut first = candidate("https://a.example/feed.xml", "", "Same Title");
        let mut second = candidate("https://a.example/feed.xml", "", "Same Title");
        store.upsert_item(&mut first).unwrap();
        store.upsert_item(&mut second).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.get_all_items(Ordering::Asc).unwrap().len(), 2);
    }

    pub fn check_ordering(store: &dyn Store) {
        let now = Utc::now();
        for (guid, offset) in [("g-1", 2), ("g-2", 1), ("g-3", 0)] {
            let mut item = candidate("https://a.example/feed.xml", guid, guid);
            item.published_at = Some(now - Duration::hours(offset));
            store.upsert_item(&mut item).unwrap();
        }

        let desc = store.get_all_items(Ordering::Desc).unwrap();
        let titles: Vec<&str> = desc.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["g-3", "g-2", "g-1"]);

        let asc = store.get_all_items(Ordering::Asc).unwrap();
        let titles: Vec<&str> = asc.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["g-1", "g-2", "g-3"]);
    }

    pub fn check_ordering_tie_break(store: &dyn Store) {
        let published = Utc::now();
        for guid in ["g-1", "g-2"] {
            let mut item = candidate("https://a.example/feed.xml", guid, guid);
            item.published_at = Some(published);
            store.upsert_item(&mut item).unwrap();
        }

        let asc = store.get_all_items(Ordering::Asc).unwrap();
        assert!(asc[0].id < asc[1].id);

        let desc = store.get_all_items(Ordering::Desc).unwrap();
        assert!(desc[0].id > desc[1].id);
    }

    pub fn check_read_transitions(store: &dyn Store) {
        let mut item = candidate("https://a.example/feed.xml", "g-1", "t");
        store.upsert_item(&mut item).unwrap();

        store.toggle_read(item.id).unwrap();
        assert!(store.get_item_by_id(item.id).unwrap().read());

        store.toggle_read(item.id).unwrap();
        assert!(!store.get_item_by_id(item.id).unwrap().read());

        store.mark_read(item.id).unwrap();
        let first_read_at = store.get_item_by_id(item.id).unwrap().read_at;
        assert!(first_read_at.is_some());

        // mark_read is idempotent and keeps the original timestamp
        store.mark_read(item.id).unwrap();
        assert_eq!(store.get_item_by_id(item.id).unwrap().read_at, first_read_at);

        store.mark_unread(item.id).unwrap();
        assert!(!store.get_item_by_id(item.id).unwrap().read());
        store.mark_unread(item.id).unwrap();
        assert!(!store.get_item_by_id(item.id).unwrap().read());
    }

    pub fn check_mark_all_read(store: &dyn Store) {
        let already_read: DateTime<Utc> = Utc::now() - Duration::hours(5);
        let mut read_item = candidate("https://a.example/feed.xml", "g-1", "old");
        read_item.read_at = Some(already_read);
        store.upsert_item(&mut read_item).unwrap();

        let mut unread_a = candidate("https://a.example/feed.xml", "g-2", "a");
        let mut unread_b = candidate("https://a.example/feed.xml", "g-3", "b");
        store.upsert_item(&mut unread_a).unwrap();
        store.upsert_item(&mut unread_b).unwrap();

        store.mark_all_read().unwrap();

        // already-read items keep their original read_at
        assert_eq!(
            store.get_item_by_id(read_item.id).unwrap().read_at,
            Some(already_read)
        );
        assert!(store.get_item_by_id(unread_a.id).unwrap().read());
        assert!(store.get_item_by_id(unread_b.id).unwrap().read());
        assert_eq!(store.count_unread().unwrap(), 0);
    }

    pub fn check_favourite_toggle(store: &dyn Store) {
        let mut item = candidate("https://a.example/feed.xml", "g-1", "t");
        store.upsert_item(&mut item).unwrap();

        store.toggle_favourite(item.id).unwrap();
        assert!(store.get_item_by_id(item.id).unwrap().favourite);

        store.toggle_favourite(item.id).unwrap();
        assert!(!store.get_item_by_id(item.id).unwrap().favourite);
    }

    pub fn check_delete_preserves_favourites(store: &dyn Store) {
        let mut plain = candidate("https://a.example/feed.xml", "g-1", "plain");
        let mut kept = candidate("https://a.example/feed.xml", "g-2", "kept");
        let mut other = candidate("https://b.example/feed.xml", "g-3", "other");
        store.upsert_item(&mut plain).unwrap();
        store.upsert_item(&mut kept).unwrap();
        store.upsert_item(&mut other).unwrap();
        store.toggle_favourite(kept.id).unwrap();

        store
            .delete_by_feed_url("https://a.example/feed.xml", false)
            .unwrap();
        let remaining = store.get_all_items(Ordering::Asc).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|i| i.id == kept.id));
        assert!(remaining.iter().any(|i| i.id == other.id));

        store
            .delete_by_feed_url("https://a.example/feed.xml", true)
            .unwrap();
        let remaining = store.get_all_items(Ordering::Asc).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);

        // zero matches is a no-op success
        store
            .delete_by_feed_url("https://gone.example/feed.xml", true)
            .unwrap();
    }

    pub fn check_delete_purges_dedup_index(store: &dyn Store) {
        let mut item = candidate("https://a.example/feed.xml", "g-1", "first");
        store.upsert_item(&mut item).unwrap();
        store
            .delete_by_feed_url("https://a.example/feed.xml", true)
            .unwrap();

        // a stale index entry would route this to the deleted row
        let mut again = candidate("https://a.example/feed.xml", "g-1", "second");
        store.upsert_item(&mut again).unwrap();
        assert_ne!(again.id, item.id);
        assert_eq!(store.get_all_items(Ordering::Asc).unwrap().len(), 1);
    }

    pub fn check_count_unread(store: &dyn Store) {
        let mut a = candidate("https://a.example/feed.xml", "g-1", "a");
        let mut b = candidate("https://a.example/feed.xml", "g-2", "b");
        let mut c = candidate("https://a.example/feed.xml", "g-3", "c");
        store.upsert_item(&mut a).unwrap();
        store.upsert_item(&mut b).unwrap();
        store.upsert_item(&mut c).unwrap();
        store.mark_read(c.id).unwrap();

        assert_eq!(store.count_unread().unwrap(), 2);
    }

    pub fn check_feed_urls_first_seen(store: &dyn Store) {
        for (feed, guid) in [
            ("https://b.example/feed.xml", "g-1"),
            ("https://a.example/feed.xml", "g-2"),
            ("https://b.example/feed.xml", "g-3"),
        ] {
            let mut item = candidate(feed, guid, "t");
            store.upsert_item(&mut item).unwrap();
        }

        let urls = store.get_all_feed_urls().unwrap();
        assert_eq!(
            urls,
            vec![
                "https://b.example/feed.xml".to_string(),
                "https://a.example/feed.xml".to_string(),
            ]
        );
    }

    pub fn check_not_found(store: &dyn Store) {
        let mut item = candidate("https://a.example/feed.xml", "g-1", "t");
        store.upsert_item(&mut item).unwrap();
        let before = store.get_all_items(Ordering::Asc).unwrap();

        assert!(matches!(
            store.get_item_by_id(999),
            Err(BrookError::ItemNotFound(999))
        ));
        assert!(matches!(
            store.toggle_read(999),
            Err(BrookError::ItemNotFound(999))
        ));
        assert!(matches!(
            store.mark_read(999),
            Err(BrookError::ItemNotFound(999))
        ));
        assert!(matches!(
            store.mark_unread(999),
            Err(BrookError::ItemNotFound(999))
        ));
        assert!(matches!(
            store.toggle_favourite(999),
            Err(BrookError::ItemNotFound(999))
        ));

        // nothing was mutated
        let after = store.get_all_items(Ordering::Asc).unwrap();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].read_at, after[0].read_at);
        assert_eq!(before[0].favourite, after[0].favourite);
    }

    pub fn check_batch_commit(store: &dyn Store) {
        store.begin_batch().unwrap();
        for guid in ["g-1", "g-2", "g-3"] {
            let mut item = candidate("https://a.example/feed.xml", guid, "t");
            store.upsert_item(&mut item).unwrap();
        }
        store.end_batch().unwrap();

        assert_eq!(store.get_all_items(Ordering::Asc).unwrap().len(), 3);
    }

    pub fn check_batch_nesting_rejected(store: &dyn Store) {
        store.begin_batch().unwrap();
        assert!(matches!(
            store.begin_batch(),
            Err(BrookError::InvalidState(_))
        ));
        store.end_batch().unwrap();

        assert!(matches!(store.end_batch(), Err(BrookError::InvalidState(_))));
    }
}
