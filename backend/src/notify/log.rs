use async_trait::async_trait;
use corelib::NotifiedSale;
use tracing::info;

use super::SaleNotifier;
use crate::error::NotifyError;

/// Writes matched sales to the structured log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl SaleNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, sale: &NotifiedSale) -> Result<(), NotifyError> {
        info!(
            sale_id = sale.sale_id,
            market_name = %sale.market_name,
            price = sale.sale_price,
            wear = ?sale.wear,
            pattern = ?sale.pattern,
            exterior = ?sale.exterior,
            rule = %sale.matched_rule,
            "matched sale"
        );
        Ok(())
    }
}
