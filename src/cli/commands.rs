use crate::app::{AppContext, BrookError, Result};
use crate::config::FeedConfig;
use crate::domain::Item;

pub fn add_feed(ctx: &mut AppContext, url: &str, name: Option<String>) -> Result<()> {
    url::Url::parse(url)?;

    ctx.runtime.add_feed(FeedConfig {
        url: url.to_string(),
        name,
    })?;
    println!("Added feed: {}", url);
    Ok(())
}

pub fn remove_feed(ctx: &mut AppContext, url: &str, all: bool) -> Result<()> {
    let was_configured = ctx.runtime.remove_feed(url)?;
    ctx.store.delete_by_feed_url(url, all)?;

    if was_configured {
        println!("Removed feed: {}", url);
    } else {
        println!("Feed not in config, deleted any remaining items: {}", url);
    }
    if !all {
        println!("Favourited items were kept (pass --all to delete them too)");
    }
    Ok(())
}

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.runtime.feeds().to_vec();
    if feeds.is_empty() {
        println!("No feeds to refresh");
        return Ok(());
    }

    tracing::info!("Refreshing {} feeds", feeds.len());
    let results = ctx
        .parallel_fetcher
        .fetch_all(feeds, &ctx.normalizer)
        .await;

    // One batch per refresh run; a failure mid-batch leaves the previously
    // committed state untouched.
    ctx.store.begin_batch()?;
    let mut ingested = 0;
    let mut errors = 0;
    for (feed, result) in results {
        match result {
            Ok(items) => {
                for mut item in items {
                    ctx.store.upsert_item(&mut item)?;
                    ingested += 1;
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error refreshing {}: {}", feed.url, e);
            }
        }
    }
    ctx.store.end_batch()?;

    println!(
        "Refresh complete: {} items ingested, {} unread, {} errors",
        ingested,
        ctx.store.count_unread()?,
        errors
    );
    Ok(())
}

pub fn list(ctx: &AppContext, include_read: bool) -> Result<()> {
    let show_read = include_read || ctx.runtime.config.show_read;
    let items = ctx.store.get_all_items(ctx.runtime.config.ordering)?;

    let mut shown = 0;
    for mut item in items {
        if !show_read && item.read() {
            continue;
        }
        // presentation-side join of configured display names
        item.feed_name = ctx.runtime.feed_name_for(&item.feed_url).map(String::from);
        println!("{}", format_line(&item));
        shown += 1;
    }

    if shown == 0 {
        println!("No items");
    }
    Ok(())
}

fn format_line(item: &Item) -> String {
    let marker = if item.read() { " " } else { "*" };
    let date = item
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());

    format!(
        "{:>5} {} {} [{}] {}",
        item.id,
        marker,
        date,
        item.display_feed(),
        item.display_title()
    )
}

pub fn unread(ctx: &AppContext) -> Result<()> {
    println!("{}", ctx.store.count_unread()?);
    Ok(())
}

pub fn toggle_read(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.store.toggle_read(id)?;
    let item = ctx.store.get_item_by_id(id)?;
    println!(
        "{} is now {}",
        item.display_title(),
        if item.read() { "read" } else { "unread" }
    );
    Ok(())
}

pub fn mark_all_read(ctx: &AppContext) -> Result<()> {
    ctx.store.mark_all_read()?;
    println!("Marked all items read");
    Ok(())
}

pub fn toggle_favourite(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.store.toggle_favourite(id)?;
    let item = ctx.store.get_item_by_id(id)?;
    println!(
        "{} {}",
        item.display_title(),
        if item.favourite {
            "added to favourites"
        } else {
            "removed from favourites"
        }
    );
    Ok(())
}

pub fn show(ctx: &AppContext, id: i64) -> Result<()> {
    let mut item = ctx.store.get_item_by_id(id)?;
    item.feed_name = ctx.runtime.feed_name_for(&item.feed_url).map(String::from);

    println!("{}", item.display_title());
    println!("{}", item.display_feed());
    if !item.author.is_empty() {
        println!("by {}", item.author);
    }
    if let Some(published) = item.published_at {
        println!("{}", published.format("%Y-%m-%d %H:%M"));
    }
    if !item.link.is_empty() {
        println!("{}", item.link);
    }
    println!();
    println!("{}", item.content);
    Ok(())
}

pub fn open_item(ctx: &AppContext, id: i64) -> Result<()> {
    let item = ctx.store.get_item_by_id(id)?;
    if item.link.is_empty() {
        return Err(BrookError::Other(format!("item {id} has no link")));
    }

    open::that(&item.link)?;
    if ctx.runtime.config.auto_read {
        ctx.store.mark_read(id)?;
    }
    Ok(())
}

pub fn show_config(ctx: &AppContext) -> Result<()> {
    println!("# {}", ctx.runtime.config_path.display());
    print!("{}", ctx.runtime.render()?);
    Ok(())
}

pub async fn import(ctx: &mut AppContext, source: &str) -> Result<()> {
    let content = if source.starts_with("http://") || source.starts_with("https://") {
        String::from_utf8_lossy(&ctx.fetcher.fetch(source).await?).into_owned()
    } else {
        std::fs::read_to_string(source)?
    };

    let feeds = parse_opml(&content);
    if feeds.is_empty() {
        println!("No feeds found in OPML source");
        return Ok(());
    }

    let mut added = 0;
    let mut skipped = 0;
    for (title, url) in feeds {
        let feed = FeedConfig {
            url,
            name: (!title.is_empty()).then_some(title),
        };
        match ctx.runtime.add_feed(feed) {
            Ok(()) => added += 1,
            Err(BrookError::FeedExists(_)) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    println!(
        "Import complete: {} added, {} skipped (already exist)",
        added, skipped
    );
    Ok(())
}

/// Extract (title, url) pairs from OPML outline elements.
fn parse_opml(content: &str) -> Vec<(String, String)> {
    let mut feeds = Vec::new();

    for line in content.lines() {
        if !line.contains("xmlUrl") {
            continue;
        }
        if let Some(url) = extract_attr(line, "xmlUrl") {
            let title = extract_attr(line, "title")
                .or_else(|| extract_attr(line, "text"))
                .unwrap_or_default();
            feeds.push((title, url));
        }
    }

    feeds
}

fn extract_attr(line: &str, attr: &str) -> Option<String> {
    let pattern = format!("{}=\"", attr);
    let start = line.find(&pattern)? + pattern.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(html_escape::decode_html_entities(&rest[..end]).to_string())
}
