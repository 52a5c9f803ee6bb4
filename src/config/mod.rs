//! Configuration management.
//!
//! The config file lives at `~/.config/brook/config.toml` and is created
//! with a commented default on first run. [`Config`] is the serializable
//! file contents; [`Runtime`] carries it together with resolved paths and
//! session-only state such as preview feeds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::{BrookError, Result};
use crate::domain::Ordering;

pub const DEFAULT_CONFIG_DIR: &str = "brook";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DATABASE: &str = "brook.db";

/// One followed feed, with an optional display name shown instead of the
/// URL in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FeedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: Vec<FeedConfig>,
    /// Database filename, stored next to the config file.
    pub database: String,
    pub ordering: Ordering,
    /// Show already-read items in listings.
    pub show_read: bool,
    /// Mark items read when opened in the browser.
    pub auto_read: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            database: DEFAULT_DATABASE.to_string(),
            ordering: Ordering::default(),
            show_read: false,
            auto_read: false,
        }
    }
}

/// Parsed config plus non-serializable session state.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub preview_feeds: Vec<FeedConfig>,
    pub config: Config,
}

impl Runtime {
    /// A runtime pointing at the default config location, not yet loaded.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BrookError::Config("could not determine config directory".into()))?
            .join(DEFAULT_CONFIG_DIR);

        Ok(Self {
            config_path: config_dir.join(DEFAULT_CONFIG_FILE),
            config_dir,
            preview_feeds: Vec::new(),
            config: Config::default(),
        })
    }

    /// Override the config location. A directory is completed with the
    /// default filename.
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(mut path) = path {
            if path.is_dir() {
                path = path.join(DEFAULT_CONFIG_FILE);
            }
            self.config_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            self.config_path = path;
        }
        self
    }

    /// Preview feeds from the command line; a non-empty list switches the
    /// session to the ephemeral backend.
    pub fn with_preview_feeds(mut self, urls: &[String]) -> Self {
        self.preview_feeds = urls.iter().map(FeedConfig::new).collect();
        self
    }

    /// Read the config file, creating a commented default first if absent.
    pub fn load(mut self) -> Result<Self> {
        if !self.config_path.exists() {
            fs::create_dir_all(&self.config_dir)?;
            fs::write(&self.config_path, default_config_content())?;
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.config = toml::from_str(&content)
            .map_err(|e| BrookError::Config(format!("{}: {e}", self.config_path.display())))?;

        Ok(self)
    }

    pub fn is_preview_mode(&self) -> bool {
        !self.preview_feeds.is_empty()
    }

    /// Feeds for this session; preview feeds take precedence.
    pub fn feeds(&self) -> &[FeedConfig] {
        if self.is_preview_mode() {
            &self.preview_feeds
        } else {
            &self.config.feeds
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(&self.config.database)
    }

    /// Configured display name for a feed URL, used by the presentation
    /// layer to fill `Item::feed_name`.
    pub fn feed_name_for(&self, url: &str) -> Option<&str> {
        self.feeds()
            .iter()
            .find(|f| f.url == url)
            .and_then(|f| f.name.as_deref())
    }

    /// Append a feed and persist; duplicates by URL are rejected.
    pub fn add_feed(&mut self, feed: FeedConfig) -> Result<()> {
        if self.config.feeds.iter().any(|f| f.url == feed.url) {
            return Err(BrookError::FeedExists(feed.url));
        }
        self.config.feeds.push(feed);
        self.write()
    }

    /// Remove a feed by URL and persist; returns whether it was present.
    pub fn remove_feed(&mut self, url: &str) -> Result<bool> {
        let before = self.config.feeds.len();
        self.config.feeds.retain(|f| f.url != url);
        if self.config.feeds.len() == before {
            return Ok(false);
        }
        self.write()?;
        Ok(true)
    }

    pub fn write(&self) -> Result<()> {
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| BrookError::Config(e.to_string()))?;
        fs::write(&self.config_path, rendered)?;
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        toml::to_string_pretty(&self.config).map_err(|e| BrookError::Config(e.to_string()))
    }
}

fn default_config_content() -> &'static str {
    r##"# brook configuration
#
# Feeds to follow; `name` is shown instead of the URL when set.
#
# [[feeds]]
# url = "https://blog.rust-lang.org/feed.xml"
# name = "Rust Blog"

# Database filename, stored next to this file.
database = "brook.db"

# Item ordering by published date: "asc" or "desc".
ordering = "asc"

# Show already-read items in `brook list`.
show_read = false

# Mark an item read after `brook open`.
auto_read = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime_in(dir: &Path) -> Runtime {
        Runtime::new()
            .unwrap()
            .with_config_path(Some(dir.join(DEFAULT_CONFIG_FILE)))
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: Config = toml::from_str(default_config_content()).unwrap();
        assert!(config.feeds.is_empty());
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.ordering, Ordering::Asc);
        assert!(!config.show_read);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime_in(dir.path()).load().unwrap();

        assert!(runtime.config_path.exists());
        assert!(runtime.config.feeds.is_empty());
        assert_eq!(runtime.database_path(), dir.path().join(DEFAULT_DATABASE));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
ordering = "desc"

[[feeds]]
url = "https://a.example/feed.xml"
name = "A"
"#,
        )
        .unwrap();

        let runtime = runtime_in(dir.path()).load().unwrap();
        assert_eq!(runtime.config.ordering, Ordering::Desc);
        assert_eq!(runtime.config.database, DEFAULT_DATABASE);
        assert_eq!(runtime.config.feeds.len(), 1);
        assert_eq!(runtime.feed_name_for("https://a.example/feed.xml"), Some("A"));
        assert_eq!(runtime.feed_name_for("https://b.example/feed.xml"), None);
    }

    #[test]
    fn test_add_feed_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut runtime = runtime_in(dir.path()).load().unwrap();

        runtime
            .add_feed(FeedConfig::new("https://a.example/feed.xml"))
            .unwrap();
        let err = runtime
            .add_feed(FeedConfig::new("https://a.example/feed.xml"))
            .unwrap_err();
        assert!(matches!(err, BrookError::FeedExists(_)));

        // the first add was persisted
        let reloaded = runtime_in(dir.path()).load().unwrap();
        assert_eq!(reloaded.config.feeds.len(), 1);
    }

    #[test]
    fn test_remove_feed() {
        let dir = tempfile::tempdir().unwrap();
        let mut runtime = runtime_in(dir.path()).load().unwrap();
        runtime
            .add_feed(FeedConfig::new("https://a.example/feed.xml"))
            .unwrap();

        assert!(runtime.remove_feed("https://a.example/feed.xml").unwrap());
        assert!(!runtime.remove_feed("https://a.example/feed.xml").unwrap());

        let reloaded = runtime_in(dir.path()).load().unwrap();
        assert!(reloaded.config.feeds.is_empty());
    }

    #[test]
    fn test_preview_feeds_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut runtime = runtime_in(dir.path()).load().unwrap();
        runtime
            .add_feed(FeedConfig::new("https://configured.example/feed.xml"))
            .unwrap();

        let runtime = runtime.with_preview_feeds(&["https://preview.example/feed.xml".into()]);
        assert!(runtime.is_preview_mode());
        assert_eq!(runtime.feeds().len(), 1);
        assert_eq!(runtime.feeds()[0].url, "https://preview.example/feed.xml");
    }
}
