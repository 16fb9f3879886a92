use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// A configured feed: the name comes from the conf file's base name, the URL
/// from its first non-blank line.
#[derive(Debug, Clone)]
pub struct FeedIdentity {
    pub name: String,
    pub source_url: Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub link: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// True once the item has been through a cache write.
    #[serde(default)]
    pub read: bool,
}

/// One feed's items as of a single fetch or cache read. `unread_count` must
/// always equal the number of items with `read == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub name: String,
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
    pub unread_count: usize,
}

impl FeedSnapshot {
    pub fn new(name: impl Into<String>, title: Option<String>, items: Vec<FeedItem>) -> Self {
        let mut snapshot = Self {
            name: name.into(),
            title,
            items,
            unread_count: 0,
        };
        snapshot.recount_unread();
        snapshot
    }

    pub fn recount_unread(&mut self) {
        self.unread_count = self.items.iter().filter(|item| !item.read).count();
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("rss-checker/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 5,
        }
    }
}

/// Per-run settings, resolved from flags and environment by the binary.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub conf_path: PathBuf,
    pub cache_path: PathBuf,
    pub output_format: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("conf file {} is empty", .path.display())]
    EmptyConfFile { path: PathBuf },

    #[error("conf file {} does not contain a valid url: {line}", .path.display())]
    InvalidFeedUrl {
        path: PathBuf,
        line: String,
        #[source]
        source: url::ParseError,
    },

    #[error("feed name {name:?} from {} collides with an earlier conf file", .path.display())]
    DuplicateFeedName { name: String, path: PathBuf },

    #[error("failed to read conf path {}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch feed {feed} from {url}")]
    Fetch {
        feed: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed {feed} returned HTTP {status}")]
    HttpStatus { feed: String, status: u16 },

    #[error("failed to parse feed {feed}: {message}")]
    Parse { feed: String, message: String },

    #[error("cache file {} for feed {feed} is corrupt: {message}", .path.display())]
    CacheCorrupt {
        feed: String,
        path: PathBuf,
        message: String,
    },

    #[error("failed to persist cache for feed {feed} at {}", .path.display())]
    Persist {
        feed: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output for feed {feed}")]
    Emit {
        feed: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid output template")]
    TemplateSyntax {
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render output for feed {feed}")]
    TemplateRender {
        feed: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}

pub type Result<T> = std::result::Result<T, CheckerError>;
