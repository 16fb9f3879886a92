//! Per-run orchestration: enumerate configured feeds, process each on its
//! own task, and collect the per-feed outcomes into a run report.

use crate::cache::CacheStore;
use crate::emitter::Emitter;
use crate::fetcher::Fetcher;
use crate::parser;
use crate::reconciler;
use crate::registry;
use crate::types::{CheckerConfig, CheckerError, FeedIdentity, FetchConfig, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Debug)]
pub struct RssChecker {
    conf_path: PathBuf,
    fetcher: Arc<Fetcher>,
    cache: Arc<CacheStore>,
    emitter: Arc<Emitter>,
}

#[derive(Debug)]
pub struct FeedOutcome {
    pub new_items: usize,
    pub rendered: String,
}

#[derive(Debug)]
pub struct FeedReport {
    pub feed: String,
    pub outcome: Result<usize>,
}

#[derive(Debug)]
pub struct RunReport {
    pub reports: Vec<FeedReport>,
    pub panicked: usize,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CheckerError)> {
        self.reports.iter().filter_map(|report| match &report.outcome {
            Err(e) => Some((report.feed.as_str(), e)),
            Ok(_) => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.panicked == 0 && self.reports.iter().all(|report| report.outcome.is_ok())
    }
}

impl RssChecker {
    /// Build a checker for one run. Fails if the output template does not
    /// compile, before any feed is fetched.
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let emitter = Emitter::new(&config.output_format)?;

        Ok(Self {
            conf_path: config.conf_path,
            fetcher: Arc::new(Fetcher::new(&FetchConfig::default())),
            cache: Arc::new(CacheStore::new(config.cache_path)),
            emitter: Arc::new(emitter),
        })
    }

    /// Process every configured feed once, writing each feed's rendered new
    /// items to `out` as that feed completes. A failed feed is reported and
    /// skipped; it never blocks the others and its cache stays untouched.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        let feeds = registry::load_feeds(&self.conf_path)?;
        info!("checking {} feed(s)", feeds.len());

        let mut tasks = JoinSet::new();
        for (name, url) in feeds {
            let fetcher = Arc::clone(&self.fetcher);
            let cache = Arc::clone(&self.cache);
            let emitter = Arc::clone(&self.emitter);
            let feed = FeedIdentity {
                name: name.clone(),
                source_url: url,
            };
            tasks.spawn(async move {
                let result = check_feed(&fetcher, &cache, &emitter, &feed).await;
                (name, result)
            });
        }

        let mut reports = Vec::new();
        let mut panicked = 0;
        while let Some(joined) = tasks.join_next().await {
            let (feed, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    error!("feed worker died: {}", e);
                    panicked += 1;
                    continue;
                }
            };

            let outcome = result.and_then(|outcome| {
                out.write_all(outcome.rendered.as_bytes())
                    .map_err(|source| CheckerError::Emit {
                        feed: feed.clone(),
                        source,
                    })?;
                Ok(outcome.new_items)
            });

            match &outcome {
                Ok(new_items) => info!("feed {}: {} new item(s)", feed, new_items),
                Err(e) => error!("feed {} failed: {}", feed, e),
            }
            reports.push(FeedReport { feed, outcome });
        }

        // Completion order is racy; keep the report stable for callers.
        reports.sort_by(|a, b| a.feed.cmp(&b.feed));

        Ok(RunReport { reports, panicked })
    }
}

/// One feed's strictly ordered pass: fetch, load cache, reconcile, persist,
/// render. Rendering happens only after the cache write succeeds, and the
/// cache is only written after this feed's own successful reconciliation.
pub async fn check_feed(
    fetcher: &Fetcher,
    cache: &CacheStore,
    emitter: &Emitter,
    feed: &FeedIdentity,
) -> Result<FeedOutcome> {
    let body = fetcher.fetch(&feed.name, &feed.source_url).await?;
    let fetched = parser::parse_feed(&feed.name, &body)?;
    let previous = cache.load(&feed.name)?;

    let reconciliation = reconciler::reconcile(previous, fetched);
    let new_items = reconciliation.new_items;
    let feed_title = reconciliation.snapshot.title.clone();

    cache.save(&feed.name, reconciliation.snapshot)?;

    let rendered = emitter.render_feed(feed, feed_title.as_deref(), &new_items)?;
    Ok(FeedOutcome {
        new_items: new_items.len(),
        rendered,
    })
}
