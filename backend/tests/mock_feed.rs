use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use backend::feed::{FeedError, SaleFeed};
use corelib::FeedRecord;

/// Feed that replays queued responses in order, then empty batches.
#[derive(Default, Clone)]
pub struct ScriptedFeed {
    pub responses: Arc<Mutex<VecDeque<Result<Vec<FeedRecord>, FeedError>>>>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test convenience
    pub async fn push_ok(&self, records: Vec<FeedRecord>) {
        self.responses.lock().await.push_back(Ok(records));
    }

    pub async fn push_err(&self, err: FeedError) {
        self.responses.lock().await.push_back(Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SaleFeed for ScriptedFeed {
    async fn fetch(&self) -> Result<Vec<FeedRecord>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
