use crate::error::FeedError;
use crate::series::PriceSeries;
use async_trait::async_trait;

/// Supplier of raw pool records and price histories.
///
/// Implementations own all I/O (HTTP, files, caches) and any retry policy;
/// the scoring pipeline only ever sees the values they return.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Raw pool records in whatever shape the upstream source produces.
    async fn pool_records(&self) -> Result<Vec<serde_json::Value>, FeedError>;

    /// Price history for one symbol.
    async fn price_history(&self, symbol: &str) -> Result<PriceSeries, FeedError>;

    fn name(&self) -> &str;
}
