use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{BrookError, Result};
use crate::domain::{Item, Ordering};
use crate::store::Store;

const ITEM_COLUMNS: &str =
    "id, author, title, favourite, feed_url, link, guid, content, read_at, published_at, updated_at, created_at";

/// Disk-resident backend.
///
/// The connection, the dedup index and the batch flag live under one mutex
/// so the index can never drift from the table within a session. The index
/// maps `(feed_url, guid)` to the row identifier for every non-empty GUID;
/// it is loaded eagerly at open and maintained on every insert and delete.
pub struct SqliteStore {
    inner: Mutex<Inner>,
}

struct Inner {
    conn: Connection,
    guid_index: HashMap<(String, String), i64>,
    in_batch: bool,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);
        migrations
            .to_latest(&mut conn)
            .map_err(|_| BrookError::Database(rusqlite::Error::InvalidQuery))?;

        let guid_index = load_guid_index(&conn)?;

        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                guid_index,
                in_batch: false,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|e| {
            BrookError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

fn load_guid_index(conn: &Connection) -> Result<HashMap<(String, String), i64>> {
    let mut stmt = conn.prepare("SELECT feed_url, guid, id FROM items WHERE guid != ''")?;
    let entries = stmt
        .query_map([], |row| {
            Ok(((row.get(0)?, row.get(1)?), row.get(2)?))
        })?
        .collect::<std::result::Result<HashMap<_, _>, _>>()?;
    Ok(entries)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<DateTime<Utc>>().ok())
}

fn to_rfc3339(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|d| d.to_rfc3339())
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        author: row.get(1)?,
        title: row.get(2)?,
        favourite: row.get(3)?,
        feed_url: row.get(4)?,
        feed_name: None,
        link: row.get(5)?,
        guid: row.get(6)?,
        content: row.get(7)?,
        read_at: row
            .get::<_, Option<String>>(8)?
            .and_then(|s| parse_datetime(&s)),
        published_at: row
            .get::<_, Option<String>>(9)?
            .and_then(|s| parse_datetime(&s)),
        updated_at: row
            .get::<_, Option<String>>(10)?
            .and_then(|s| parse_datetime(&s)),
        created_at: row
            .get::<_, String>(11)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

impl Store for SqliteStore {
    fn upsert_item(&self, item: &mut Item) -> Result<()> {
        let mut inner = self.lock()?;

        let key = if item.guid.is_empty() {
            None
        } else {
            Some((item.feed_url.clone(), item.guid.clone()))
        };

        let existing = key.as_ref().and_then(|k| inner.guid_index.get(k)).copied();

        if let Some(id) = existing {
            inner.conn.execute(
                "UPDATE items
                 SET author = ?1, title = ?2, content = ?3, link = ?4,
                     published_at = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    item.author,
                    item.title,
                    item.content,
                    item.link,
                    to_rfc3339(&item.published_at),
                    to_rfc3339(&item.updated_at),
                    id
                ],
            )?;

            let created: String = inner.conn.query_row(
                "SELECT created_at FROM items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            item.id = id;
            if let Some(dt) = parse_datetime(&created) {
                item.created_at = dt;
            }
        } else {
            item.created_at = Utc::now();
            inner.conn.execute(
                "INSERT INTO items (author, title, favourite, feed_url, link, guid, content,
                                    read_at, published_at, updated_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.author,
                    item.title,
                    item.favourite,
                    item.feed_url,
                    item.link,
                    item.guid,
                    item.content,
                    to_rfc3339(&item.read_at),
                    to_rfc3339(&item.published_at),
                    to_rfc3339(&item.updated_at),
                    item.created_at.to_rfc3339()
                ],
            )?;
            item.id = inner.conn.last_insert_rowid();
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
        inner.conn.execute_batch("BEGIN IMMEDIATE")?;
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
        inner.conn.execute_batch("COMMIT")?;
        inner.in_batch = false;
        Ok(())
    }

    fn get_all_items(&self, ordering: Ordering) -> Result<Vec<Item>> {
        let inner = self.lock()?;
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items {}",
            ordering.sql_clause()
        );
        let mut stmt = inner.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get_item_by_id(&self, id: i64) -> Result<Item> {
        let inner = self.lock()?;
        inner
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                params![id],
                item_from_row,
            )
            .optional()?
            .ok_or(BrookError::ItemNotFound(id))
    }

    fn get_all_feed_urls(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let mut stmt = inner
            .conn
            .prepare("SELECT feed_url FROM items GROUP BY feed_url ORDER BY MIN(id)")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(urls)
    }

    fn toggle_read(&self, id: i64) -> Result<()> {
        let inner = self.lock()?;
        let read_at: Option<String> = inner
            .conn
            .query_row(
                "SELECT read_at FROM items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(BrookError::ItemNotFound(id))?;

        let next = match read_at {
            Some(_) => None,
            None => Some(Utc::now().to_rfc3339()),
        };
        inner.conn.execute(
            "UPDATE items SET read_at = ?1 WHERE id = ?2",
            params![next, id],
        )?;
        Ok(())
    }

    fn mark_read(&self, id: i64) -> Result<()> {
        let inner = self.lock()?;
        // COALESCE keeps the original read_at on repeat calls
        let changed = inner.conn.execute(
            "UPDATE items SET read_at = COALESCE(read_at, ?1) WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(BrookError::ItemNotFound(id));
        }
        Ok(())
    }

    fn mark_unread(&self, id: i64) -> Result<()> {
        let inner = self.lock()?;
        let changed = inner
            .conn
            .execute("UPDATE items SET read_at = NULL WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(BrookError::ItemNotFound(id));
        }
        Ok(())
    }

    fn mark_all_read(&self) -> Result<()> {
        let inner = self.lock()?;
        inner.conn.execute(
            "UPDATE items SET read_at = ?1 WHERE read_at IS NULL",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn toggle_favourite(&self, id: i64) -> Result<()> {
        let inner = self.lock()?;
        let changed = inner.conn.execute(
            "UPDATE items SET favourite = NOT favourite WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(BrookError::ItemNotFound(id));
        }
        Ok(())
    }

    fn delete_by_feed_url(&self, feed_url: &str, include_favourites: bool) -> Result<()> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let (select_sql, delete_sql) = if include_favourites {
            (
                "SELECT guid FROM items WHERE feed_url = ?1 AND guid != ''",
                "DELETE FROM items WHERE feed_url = ?1",
            )
        } else {
            (
                "SELECT guid FROM items WHERE feed_url = ?1 AND guid != '' AND favourite = 0",
                "DELETE FROM items WHERE feed_url = ?1 AND favourite = 0",
            )
        };

        let guids: Vec<String> = {
            let mut stmt = inner.conn.prepare(select_sql)?;
            let guids = stmt
                .query_map(params![feed_url], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            guids
        };

        inner.conn.execute(delete_sql, params![feed_url])?;

        for guid in guids {
            inner.guid_index.remove(&(feed_url.to_string(), guid));
        }

        Ok(())
    }

    fn count_unread(&self) -> Result<i64> {
        let inner = self.lock()?;
        let count: i64 = inner.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE read_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
