use std::cmp::Ordering as CmpOrdering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::Item;

/// Chronological ordering of item listings.
///
/// Parsing is lenient: only the exact token `"desc"` selects descending
/// order, every other value (including typos) falls back to ascending, so a
/// bad config value never breaks a listing. Ties on the published date break
/// on the identifier, in the same direction as the date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    Asc,
    Desc,
}

impl Ordering {
    pub fn parse(token: &str) -> Self {
        match token {
            "desc" => Ordering::Desc,
            _ => Ordering::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ordering::Asc => "asc",
            Ordering::Desc => "desc",
        }
    }

    /// Comparator over items for in-memory sorting.
    ///
    /// Missing published dates sort earliest in ascending order. Descending
    /// order is the exact reverse, identifier tie-break included.
    pub fn cmp(&self, a: &Item, b: &Item) -> CmpOrdering {
        let ascending = a
            .published_at
            .cmp(&b.published_at)
            .then(a.id.cmp(&b.id));
        match self {
            Ordering::Asc => ascending,
            Ordering::Desc => ascending.reverse(),
        }
    }

    /// ORDER BY clause for the durable backend. RFC 3339 UTC text collates
    /// chronologically, so the SQL sort matches [`Ordering::cmp`].
    pub fn sql_clause(&self) -> &'static str {
        match self {
            Ordering::Asc => "ORDER BY published_at ASC, id ASC",
            Ordering::Desc => "ORDER BY published_at DESC, id DESC",
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Ordering {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ordering {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Ordering::parse(&token))
    }
}
