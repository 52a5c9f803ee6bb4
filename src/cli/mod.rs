pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::fetcher::DEFAULT_WORKERS;

#[derive(Parser)]
#[command(name = "brook")]
#[command(version, about = "A local RSS/Atom feed reader", long_about = None)]
pub struct Cli {
    /// Path to the config file (or a directory containing config.toml)
    #[arg(short = 'c', long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Preview feed URL(s); runs against an in-memory store and leaves no
    /// state behind
    #[arg(short = 'f', long = "feed", global = true)]
    pub feeds: Vec<String>,

    /// Number of parallel workers when fetching feeds
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, global = true)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a feed to the config
    Add {
        /// URL of the feed
        url: String,
        /// Display name shown instead of the URL
        name: Option<String>,
    },
    /// Remove a feed from the config and delete its items
    Remove {
        /// URL of the feed
        url: String,
        /// Also delete favourited items
        #[arg(long)]
        all: bool,
    },
    /// Fetch all feeds and ingest new items
    Refresh,
    /// List items
    List {
        /// Include items that have already been read
        #[arg(long)]
        read: bool,
    },
    /// Print the number of unread items
    Unread,
    /// Toggle the read state of an item
    Read {
        /// Item identifier, as shown by `list`
        id: i64,
    },
    /// Mark every item as read
    MarkAllRead,
    /// Toggle the favourite flag of an item
    Fav {
        /// Item identifier
        id: i64,
    },
    /// Print an item's content
    Show {
        /// Item identifier
        id: i64,
    },
    /// Open an item's link in the browser
    Open {
        /// Item identifier
        id: i64,
    },
    /// Print the resolved configuration
    Config,
    /// Import feeds from an OPML file or URL
    Import {
        /// Path or URL of the OPML document
        source: String,
    },
}
