use crate::types::{CheckerError, FetchConfig, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Thin HTTP client for pulling feed documents. One GET per feed per run,
/// no retries and no conditional requests.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("failed to create HTTP client");

        Self { client }
    }

    pub async fn fetch(&self, feed: &str, url: &Url) -> Result<String> {
        debug!("fetching feed {} from {}", feed, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CheckerError::Fetch {
                feed: feed.to_string(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckerError::HttpStatus {
                feed: feed.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| CheckerError::Fetch {
                feed: feed.to_string(),
                url: url.to_string(),
                source,
            })?;

        info!("fetched feed {} ({} bytes)", feed, body.len());
        Ok(body)
    }
}
