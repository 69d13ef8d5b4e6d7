use std::time::Duration;

use async_trait::async_trait;
use corelib::NotifiedSale;
use reqwest::Client;
use tracing::{debug, instrument};

use super::SaleNotifier;
use crate::error::NotifyError;

/// POSTs each matched sale as camelCase JSON to a fixed URL.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl SaleNotifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, sale), fields(sale_id = sale.sale_id), level = "debug")]
    async fn notify(&self, sale: &NotifiedSale) -> Result<(), NotifyError> {
        let resp = self.http.post(&self.url).json(sale).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                sale_id: sale.sale_id,
                status,
            });
        }

        debug!(%status, "webhook accepted sale");
        Ok(())
    }
}
