use async_trait::async_trait;
use corelib::FeedRecord;

use crate::feed::errors::FeedError;

/// Anything the poller can pull a batch of sale records from.
#[async_trait]
pub trait SaleFeed: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<FeedRecord>, FeedError>;
}
