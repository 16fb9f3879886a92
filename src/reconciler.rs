//! The cache-diff core: decides which fetched items are new relative to the
//! previous snapshot and produces the snapshot to persist next.
//!
//! Pure in-memory logic, no I/O, so every policy here is covered by unit
//! tests without fixtures.

use crate::types::{FeedItem, FeedSnapshot};
use std::collections::HashSet;
use tracing::debug;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// New items in the fetched feed's own order. Empty on a cold start.
    pub new_items: Vec<FeedItem>,
    /// The snapshot to persist: the fetched feed in full, superseding the
    /// previous snapshot wholesale.
    pub snapshot: FeedSnapshot,
}

/// Diff a freshly fetched feed against the previous snapshot, if any.
///
/// Cold start (no previous snapshot): the fetched feed becomes the baseline
/// and nothing is reported as new, so a first run never dumps a feed's whole
/// history to the output.
///
/// Warm start: an item is new when its link, compared verbatim, does not
/// appear among the previous snapshot's links. Duplicate links within one
/// fetch are each checked independently; the fetched order is preserved.
pub fn reconcile(previous: Option<FeedSnapshot>, mut fetched: FeedSnapshot) -> Reconciliation {
    let Some(previous) = previous else {
        debug!(
            "cold start for feed {}: {} item(s) baselined",
            fetched.name,
            fetched.items.len()
        );
        fetched.recount_unread();
        return Reconciliation {
            new_items: Vec::new(),
            snapshot: fetched,
        };
    };

    let known: HashSet<&str> = previous.items.iter().map(|item| item.link.as_str()).collect();

    let mut new_items = Vec::new();
    for item in &mut fetched.items {
        if known.contains(item.link.as_str()) {
            item.read = true;
        } else {
            item.read = false;
            new_items.push(item.clone());
        }
    }
    fetched.recount_unread();

    debug!(
        "feed {}: {} fetched, {} new",
        fetched.name,
        fetched.items.len(),
        new_items.len()
    );

    Reconciliation {
        new_items,
        snapshot: fetched,
    }
}
