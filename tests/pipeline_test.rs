//! End-to-end coverage of the reconcile pipeline across runs, using static
//! feed documents and temp-dir conf/cache fixtures.

use rss_checker::parser::parse_feed;
use rss_checker::{
    reconcile, CacheStore, CheckerConfig, CheckerError, Emitter, FeedIdentity, RssChecker,
    DEFAULT_OUTPUT_FORMAT,
};
use std::fs;
use url::Url;

const FIRST_FETCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <item><title>A</title><link>https://example.com/a</link></item>
    <item><title>B</title><link>https://example.com/b</link></item>
  </channel>
</rss>"#;

const SECOND_FETCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <item><title>B</title><link>https://example.com/b</link></item>
    <item><title>C</title><link>https://example.com/c</link></item>
  </channel>
</rss>"#;

const EMPTY_FETCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
  </channel>
</rss>"#;

fn news_feed() -> FeedIdentity {
    FeedIdentity {
        name: "news".to_string(),
        source_url: Url::parse("https://example.com/rss.xml").unwrap(),
    }
}

#[test]
fn successive_runs_report_only_items_added_in_between() {
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = CacheStore::new(cache_dir.path());
    let emitter = Emitter::new(DEFAULT_OUTPUT_FORMAT).unwrap();
    let feed = news_feed();

    // Run 1: no prior cache, so the fetch becomes the baseline and nothing
    // is emitted.
    let previous = cache.load(&feed.name).unwrap();
    assert!(previous.is_none());
    let run1 = reconcile(previous, parse_feed(&feed.name, FIRST_FETCH).unwrap());
    assert!(run1.new_items.is_empty());
    let title = run1.snapshot.title.clone();
    cache.save(&feed.name, run1.snapshot).unwrap();
    let out1 = emitter
        .render_feed(&feed, title.as_deref(), &run1.new_items)
        .unwrap();
    assert_eq!(out1, "");

    // Run 2: "a" disappeared upstream, "c" appeared. Only "c" is new.
    let previous = cache.load(&feed.name).unwrap();
    assert!(previous.is_some());
    let run2 = reconcile(previous, parse_feed(&feed.name, SECOND_FETCH).unwrap());
    let title = run2.snapshot.title.clone();
    cache.save(&feed.name, run2.snapshot.clone()).unwrap();
    let out2 = emitter
        .render_feed(&feed, title.as_deref(), &run2.new_items)
        .unwrap();
    assert_eq!(out2, "https://example.com/c\n");

    // The persisted snapshot is the second fetch in full: "a" is gone.
    let persisted = cache.load(&feed.name).unwrap().unwrap();
    let links: Vec<&str> = persisted.items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(links, vec!["https://example.com/b", "https://example.com/c"]);
    assert!(persisted.items.iter().all(|i| i.read));
    assert_eq!(persisted.unread_count, 0);

    // Run 3: identical fetch, nothing new (idempotence).
    let previous = cache.load(&feed.name).unwrap();
    let run3 = reconcile(previous, parse_feed(&feed.name, SECOND_FETCH).unwrap());
    assert!(run3.new_items.is_empty());

    // Run 4: the feed went empty upstream; nothing new, empty snapshot.
    let previous = cache.load(&feed.name).unwrap();
    let run4 = reconcile(previous, parse_feed(&feed.name, EMPTY_FETCH).unwrap());
    assert!(run4.new_items.is_empty());
    cache.save(&feed.name, run4.snapshot).unwrap();
    assert!(cache.load(&feed.name).unwrap().unwrap().items.is_empty());
}

#[tokio::test]
async fn unreachable_feed_fails_without_touching_its_cache() {
    let conf_dir = tempfile::tempdir().unwrap();
    // Nothing listens on port 1; the connection is refused immediately.
    fs::write(conf_dir.path().join("dead"), "http://127.0.0.1:1/feed.xml\n").unwrap();
    let cache_dir = tempfile::tempdir().unwrap();

    let checker = RssChecker::new(CheckerConfig {
        conf_path: conf_dir.path().to_path_buf(),
        cache_path: cache_dir.path().to_path_buf(),
        output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
    })
    .unwrap();

    let mut out = Vec::new();
    let report = checker.run(&mut out).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.reports.len(), 1);
    let (feed, err) = report.failures().next().unwrap();
    assert_eq!(feed, "dead");
    assert!(matches!(err, CheckerError::Fetch { .. }));
    assert!(out.is_empty());
    assert!(!cache_dir.path().join("dead.json").exists());
}

#[tokio::test]
async fn blank_conf_file_fails_the_run_before_any_feed_work() {
    let conf_dir = tempfile::tempdir().unwrap();
    fs::write(conf_dir.path().join("blank"), "\n\n").unwrap();
    let cache_dir = tempfile::tempdir().unwrap();

    let checker = RssChecker::new(CheckerConfig {
        conf_path: conf_dir.path().to_path_buf(),
        cache_path: cache_dir.path().to_path_buf(),
        output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
    })
    .unwrap();

    let mut out = Vec::new();
    let err = checker.run(&mut out).await.unwrap_err();

    assert!(matches!(err, CheckerError::EmptyConfFile { .. }));
}

#[test]
fn template_syntax_error_is_fatal_at_startup() {
    let err = RssChecker::new(CheckerConfig {
        conf_path: "conf".into(),
        cache_path: "cache".into(),
        output_format: "{{#if}}".to_string(),
    })
    .unwrap_err();

    assert!(matches!(err, CheckerError::TemplateSyntax { .. }));
}
