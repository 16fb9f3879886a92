//! Conf-directory walk: every regular file under the conf root defines one
//! feed. The file's base name is the feed name and its first non-blank line
//! is the feed URL.

use crate::types::{CheckerError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use url::Url;

pub fn load_feeds(conf_dir: &Path) -> Result<BTreeMap<String, Url>> {
    let mut feeds = BTreeMap::new();
    walk_conf_dir(conf_dir, &mut feeds)?;
    debug!("loaded {} feed(s) from {}", feeds.len(), conf_dir.display());
    Ok(feeds)
}

fn walk_conf_dir(dir: &Path, feeds: &mut BTreeMap<String, Url>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| CheckerError::ConfigIo {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| CheckerError::ConfigIo {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| CheckerError::ConfigIo {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            walk_conf_dir(&path, feeds)?;
        } else if file_type.is_file() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let url = url_from_first_non_blank_line(&path)?;
            // Two conf files with the same base name would share one cache
            // file, so the collision is rejected here.
            if feeds.contains_key(&name) {
                return Err(CheckerError::DuplicateFeedName { name, path });
            }
            debug!("feed {name}: {url}");
            feeds.insert(name, url);
        }
        // symlinks and other non-regular entries are ignored
    }

    Ok(())
}

fn url_from_first_non_blank_line(path: &Path) -> Result<Url> {
    let contents = fs::read_to_string(path).map_err(|source| CheckerError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;

    let line = contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| CheckerError::EmptyConfFile {
            path: path.to_path_buf(),
        })?;

    Url::parse(line).map_err(|source| CheckerError::InvalidFeedUrl {
        path: path.to_path_buf(),
        line: line.to_string(),
        source,
    })
}
