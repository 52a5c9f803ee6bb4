use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed entry as tracked locally.
///
/// The ingestion side fills `guid`, `feed_url`, `title`, `author`,
/// `content`, `link` and the feed-supplied timestamps; the storage engine
/// assigns `id` and `created_at` on first insert. `feed_name` is joined in
/// from configuration by the presentation layer and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub favourite: bool,
    pub feed_url: String,
    pub feed_name: Option<String>,
    pub link: String,
    pub guid: String,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// A fresh candidate with no identifier assigned yet.
    pub fn new(feed_url: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            id: 0,
            author: String::new(),
            title: String::new(),
            favourite: false,
            feed_url: feed_url.into(),
            feed_name: None,
            link: String::new(),
            guid: guid.into(),
            content: String::new(),
            read_at: None,
            published_at: None,
            updated_at: None,
            created_at: Utc::now(),
        }
    }

    /// Read state is derived: an item is read iff `read_at` is set.
    pub fn read(&self) -> bool {
        self.read_at.is_some()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }

    /// Feed name if configured, otherwise the feed URL.
    pub fn display_feed(&self) -> &str {
        self.feed_name.as_deref().unwrap_or(&self.feed_url)
    }
}
