use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::app::{BrookError, Result};
use crate::domain::{Item, Ordering};
use crate::store::Store;

/// Memory-resident backend for preview sessions.
///
/// Same observable semantics as [`super::SqliteStore`] with nothing written
/// to disk: an ordered item list, the `(feed_url, guid)` dedup index and a
/// monotonically increasing identifier counter. Batches need no durability
/// so they are only the nesting check.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    items: Vec<Item>,
    guid_index: HashMap<(String, String), i64>,
    next_id: i64,
    in_batch: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                guid_index: HashMap::new(),
                next_id: 1,
                in_batch: false,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| BrookError::Other(format!("store mutex poisoned: {e}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn find_mut(&mut self, id: i64) -> Result<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(BrookError::ItemNotFound(id))
    }
}

impl Store for MemoryStore {
    fn upsert_item(&self, item: &mut Item) -> Result<()> {
        let mut inner = self.lock()?;

        let key = if item.guid.is_empty() {
            None
        } else {
            Some((item.feed_url.clone(), item.guid.clone()))
        };

        let existing = key.as_ref().and_then(|k| inner.guid_index.get(k)).copied();

        if let Some(id) = existing {
            let record = inner.find_mut(id)?;
            record.author = item.author.clone();
            record.title = item.title.clone();
            record.content = item.content.clone();
            record.link = item.link.clone();
            record.published_at = item.published_at;
            record.updated_at = item.updated_at;
            item.id = record.id;
            item.created_at = record.created_at;
        } else {
            item.id = inner.next_id;
            item.created_at = Utc::now();
            inner.next_id += 1;
            inner.items.push(item.clone());
            if let Some(k) = key {
                inner.guid_index.insert(k, item.id);
            }
        }

        Ok(())
    }

    fn begin_batch(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.in_batch {
            return Err(BrookError::InvalidState(
                "begin_batch while a batch is already open".into(),
            ));
        }
        inner.in_batch = true;
        Ok(())
    }

    fn end_batch(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.in_batch {
            return Err(BrookError::InvalidState(
                "end_batch without an open batch".into(),
            ));
        }
        inner.in_batch = false;
        Ok(())
    }

    fn get_all_items(&self, ordering: Ordering) -> Result<Vec<Item>> {
        let inner = self.lock()?;
        let mut items = inner.items.clone();
        items.sort_by(|a, b| ordering.cmp(a, b));
        Ok(items)
    }

    fn get_item_by_id(&self, id: i64) -> Result<Item> {
        let inner = self.lock()?;
        inner
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(BrookError::ItemNotFound(id))
    }

    fn get_all_feed_urls(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let mut seen = HashSet::new();
        let urls = inner
            .items
            .iter()
            .filter(|i| seen.insert(i.feed_url.clone()))
            .map(|i| i.feed_url.clone())
            .collect();
        Ok(urls)
    }

    fn toggle_read(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let item = inner.find_mut(id)?;
        item.read_at = match item.read_at {
            Some(_) => None,
            None => Some(Utc::now()),
        };
        Ok(())
    }

    fn mark_read(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let item = inner.find_mut(id)?;
        if item.read_at.is_none() {
            item.read_at = Some(Utc::now());
        }
        Ok(())
    }

    fn mark_unread(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        inner.find_mut(id)?.read_at = None;
        Ok(())
    }

    fn mark_all_read(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let now = Utc::now();
        for item in inner.items.iter_mut().filter(|i| i.read_at.is_none()) {
            item.read_at = Some(now);
        }
        Ok(())
    }

    fn toggle_favourite(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let item = inner.find_mut(id)?;
        item.favourite = !item.favourite;
        Ok(())
    }

    fn delete_by_feed_url(&self, feed_url: &str, include_favourites: bool) -> Result<()> {
        let mut inner = self.lock()?;
        let mut removed = Vec::new();
        inner.items.retain(|item| {
            let matches = item.feed_url == feed_url && (include_favourites || !item.favourite);
            if matches && !item.guid.is_empty() {
                removed.push(item.guid.clone());
            }
            !matches
        });
        for guid in removed {
            inner.guid_index.remove(&(feed_url.to_string(), guid));
        }
        Ok(())
    }

    fn count_unread(&self) -> Result<i64> {
        let inner = self.lock()?;
        Ok(inner.items.iter().filter(|i| i.read_at.is_none()).count() as i64)
    }
}
