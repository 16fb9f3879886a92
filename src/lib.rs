pub mod cache;
pub mod checker;
pub mod emitter;
pub mod fetcher;
pub mod parser;
pub mod reconciler;
pub mod registry;
pub mod types;

pub use cache::CacheStore;
pub use checker::{check_feed, FeedOutcome, FeedReport, RssChecker, RunReport};
pub use emitter::{Emitter, DEFAULT_OUTPUT_FORMAT};
pub use fetcher::Fetcher;
pub use reconciler::{reconcile, Reconciliation};
pub use types::*;
