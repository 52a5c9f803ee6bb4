use chrono::Utc;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{BrookError, Result};
use crate::domain::Item;

#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Converts RSS/Atom documents into item candidates for the storage engine.
///
/// Candidates carry the feed-supplied fields only; the engine assigns the
/// identifier and `created_at` on upsert. An entry without a GUID produces
/// a candidate with an empty one, which the engine treats as always-new.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<(FeedMeta, Vec<Item>)> {
        let feed = parser::parse(body).map_err(|e| BrookError::FeedParse(e.to_string()))?;

        let meta = FeedMeta {
            title: feed
                .title
                .map(|t| decode_html_entities(&t.content).to_string()),
            description: feed
                .description
                .map(|d| decode_html_entities(&d.content).to_string()),
        };

        let items: Vec<Item> = feed
            .entries
            .into_iter()
            .map(|entry| {
                let mut item = Item::new(feed_url, entry.id.clone());

                item.title = entry
                    .title
                    .map(|t| decode_html_entities(&t.content).to_string())
                    .unwrap_or_default();
                item.author = entry
                    .authors
                    .first()
                    .map(|a| a.name.clone())
                    .unwrap_or_default();
                item.link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default();
                item.content = entry
                    .content
                    .and_then(|c| c.body)
                    .or_else(|| entry.summary.map(|s| s.content))
                    .map(|body| decode_html_entities(&body).to_string())
                    .unwrap_or_default();
                item.published_at = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc));
                item.updated_at = entry.updated.map(|dt| dt.with_timezone(&Utc));

                item
            })
            .collect();

        Ok((meta, items))
    }
}
