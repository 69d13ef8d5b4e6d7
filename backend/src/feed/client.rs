use std::time::Duration;

use async_trait::async_trait;
use corelib::FeedRecord;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::feed::errors::FeedError;
use crate::feed::source::SaleFeed;

/// HTTP client for the sale feed endpoint.
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    pub async fn fetch_sales(&self) -> Result<Vec<FeedRecord>, FeedError> {
        let resp = self.http.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let body = resp.bytes().await?;
        let records = decode_batch(&body)?;

        debug!(count = records.len(), "sale feed fetched");

        Ok(records)
    }
}

#[async_trait]
impl SaleFeed for FeedClient {
    async fn fetch(&self) -> Result<Vec<FeedRecord>, FeedError> {
        self.fetch_sales().await
    }
}

/// Decodes one feed response. Any malformed record fails the whole batch.
pub fn decode_batch(body: &[u8]) -> Result<Vec<FeedRecord>, FeedError> {
    Ok(serde_json::from_slice(body)?)
}
