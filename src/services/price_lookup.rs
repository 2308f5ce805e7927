use async_trait::async_trait;
use rust_decimal::Decimal;

/// Source of the current price for a stock symbol.
///
/// `None` means no quote is available right now (market closed, unknown or
/// delisted symbol, upstream failure). Callers treat it as "skip", not as an
/// error.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Option<Decimal>;
}
