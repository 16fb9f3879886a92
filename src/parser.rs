use crate::types::{CheckerError, FeedItem, FeedSnapshot, Result};
use chrono::Utc;
use feed_rs::parser;
use tracing::{debug, info};

/// Parse a fetched feed document into a snapshot. Entries without a link are
/// skipped; duplicate links are kept as-is (each occurrence is reconciled
/// independently against the cache).
pub fn parse_feed(feed_name: &str, content: &str) -> Result<FeedSnapshot> {
    let feed = parser::parse(content.as_bytes()).map_err(|e| CheckerError::Parse {
        feed: feed_name.to_string(),
        message: e.to_string(),
    })?;

    let title = feed.title.map(|t| t.content);

    let mut items = Vec::new();
    for entry in feed.entries {
        match parse_entry(entry) {
            Some(item) => items.push(item),
            None => debug!("skipping entry without a link in feed {}", feed_name),
        }
    }

    info!("parsed {} item(s) from feed {}", items.len(), feed_name);
    Ok(FeedSnapshot::new(feed_name, title, items))
}

fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedItem> {
    let link = entry.links.first()?.href.clone();
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());
    let description = entry.summary.map(|s| s.content);
    let published_at = entry.published.map(|dt| dt.with_timezone(&Utc));

    Some(FeedItem {
        link,
        title,
        description,
        published_at,
        read: false,
    })
}
