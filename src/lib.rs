//! # Brook
//!
//! A local, offline-first RSS/Atom feed reader.
//!
//! ## Architecture
//!
//! Brook follows a modular pipeline architecture:
//!
//! ```text
//! Fetcher → Normalizer → Store → CLI
//! ```
//!
//! - [`fetcher`]: HTTP client with bounded parallel fan-out
//! - [`normalizer`]: Converts RSS/Atom feeds to unified domain items
//! - [`store`]: Item persistence and deduplication, SQLite or in-memory
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed
//! brook add https://blog.rust-lang.org/feed.xml
//!
//! # Fetch all feeds
//! brook refresh
//!
//! # List unread items
//! brook list
//!
//! # Try a feed without touching the database
//! brook --feed https://example.com/feed.xml refresh
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration and runtime state
//! - [`domain`]: Core domain models (Item, Ordering)
//! - [`fetcher`]: HTTP fetching with a worker pool
//! - [`normalizer`]: Feed parsing and normalization
//! - [`store`]: Item storage backends

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, fetcher, normalizer. Backend selection happens here — preview
/// sessions get the in-memory store, everything else SQLite.
pub mod app;

/// Command-line interface using clap.
///
/// Defines the CLI structure and subcommands:
/// - `add <url> [name]` - Add a feed to the config
/// - `remove <url>` - Remove a feed and delete its items
/// - `refresh` - Fetch all feeds and ingest new items
/// - `list` - List items
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/brook/config.toml`: the feed list, database
/// location, ordering, and read-visibility defaults. Preview feeds passed
/// on the command line override the configured list without touching it.
pub mod config;

/// Core domain models.
pub mod domain;

/// HTTP fetching with a semaphore-bounded worker pool.
pub mod fetcher;

/// Feed parsing and normalization.
///
/// Turns raw RSS/Atom bytes into [`Item`](domain::Item) candidates with
/// HTML entities decoded and timestamps normalized to UTC.
pub mod normalizer;

/// Item storage backends.
///
/// The [`Store`](store::Store) trait defines the storage contract; the
/// SQLite and in-memory backends are behaviourally interchangeable.
pub mod store;
