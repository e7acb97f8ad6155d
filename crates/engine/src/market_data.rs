// In crates/engine/src/market_data.rs

use api_client::Exchange;
use core_types::{MarketSnapshot, Symbol};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Builds the market snapshots handed to the signal provider.
#[derive(Clone)]
pub struct MarketDataGateway {
    exchange: Arc<dyn Exchange>,
}

impl MarketDataGateway {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    pub async fn current_price(&self, symbol: &Symbol) -> api_client::Result<Decimal> {
        Ok(self.exchange.get_ticker_price(symbol).await?.price)
    }

    /// Latest price plus the 24h statistics for `symbol`.
    pub async fn snapshot(&self, symbol: &Symbol) -> api_client::Result<MarketSnapshot> {
        let price = self.current_price(symbol).await?;
        self.snapshot_at(symbol, price).await
    }

    /// A snapshot anchored on a price the caller already has, such as a mark price.
    pub async fn snapshot_at(
        &self,
        symbol: &Symbol,
        price: Decimal,
    ) -> api_client::Result<MarketSnapshot> {
        let ticker = self.exchange.get_24hr_ticker(symbol).await?;
        Ok(MarketSnapshot {
            price,
            change_24h: ticker.price_change_percent.to_f64().unwrap_or_default(),
            volume_24h: ticker.volume,
            high_24h: ticker.high_price,
            low_24h: ticker.low_price,
        })
    }
}
