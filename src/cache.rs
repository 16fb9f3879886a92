//! Per-feed snapshot persistence: one JSON file per feed under the cache
//! directory, replaced atomically on every successful run.

use crate::types::{CheckerError, FeedSnapshot, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self, feed_name: &str) -> PathBuf {
        self.dir.join(format!("{feed_name}.json"))
    }

    /// Load the previous snapshot. A missing file is the cold-start signal
    /// and returns `None`; a file that exists but is empty or unparsable is
    /// corrupt and fails the feed instead of silently re-baselining it.
    pub fn load(&self, feed_name: &str) -> Result<Option<FeedSnapshot>> {
        let path = self.file_path(feed_name);

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cache file for feed {}, cold start", feed_name);
                return Ok(None);
            }
            Err(e) => {
                return Err(CheckerError::CacheCorrupt {
                    feed: feed_name.to_string(),
                    path,
                    message: format!("unreadable: {e}"),
                })
            }
        };

        if data.is_empty() {
            return Err(CheckerError::CacheCorrupt {
                feed: feed_name.to_string(),
                path,
                message: "file is empty".to_string(),
            });
        }

        let snapshot = serde_json::from_slice(&data).map_err(|e| CheckerError::CacheCorrupt {
            feed: feed_name.to_string(),
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!("loaded cached snapshot for feed {} from {}", feed_name, path.display());
        Ok(Some(snapshot))
    }

    /// Persist a snapshot, creating the cache directory if needed. Every
    /// item is marked read and `unread_count` reset before serialization,
    /// so the stored form is always "fully read". The file is written to a
    /// sibling temp path and renamed into place; a failed run never leaves
    /// a half-written cache file behind.
    pub fn save(&self, feed_name: &str, mut snapshot: FeedSnapshot) -> Result<()> {
        let path = self.file_path(feed_name);

        fs::create_dir_all(&self.dir).map_err(|source| CheckerError::Persist {
            feed: feed_name.to_string(),
            path: self.dir.clone(),
            source,
        })?;

        for item in &mut snapshot.items {
            item.read = true;
        }
        snapshot.unread_count = 0;

        let data = serde_json::to_vec(&snapshot).map_err(|e| CheckerError::Persist {
            feed: feed_name.to_string(),
            path: path.clone(),
            source: e.into(),
        })?;

        let tmp = tmp_path(&path);
        fs::write(&tmp, &data).map_err(|source| CheckerError::Persist {
            feed: feed_name.to_string(),
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| CheckerError::Persist {
            feed: feed_name.to_string(),
            path: path.clone(),
            source,
        })?;

        debug!(
            "cached {} item(s) for feed {} at {}",
            snapshot.items.len(),
            feed_name,
            path.display()
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
