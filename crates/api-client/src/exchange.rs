// In crates/api-client/src/exchange.rs

use crate::types::{FormattedBalance, NewOrderResponse, PositionRisk, Ticker24h, TickerPrice};
use crate::{ApiClient, Result};
use async_trait::async_trait;
use core_types::{OrderRequest, Symbol};

/// The exchange operations the trading loop depends on.
///
/// `ApiClient` is the live implementation; tests substitute in-memory fakes.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Returns `true` when the exchange answers a ping.
    async fn test_connection(&self) -> bool;

    async fn get_ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice>;

    async fn get_24hr_ticker(&self, symbol: &Symbol) -> Result<Ticker24h>;

    async fn get_formatted_balance(&self) -> Result<FormattedBalance>;

    async fn set_leverage(&self, symbol: &Symbol, leverage: u8) -> Result<()>;

    /// Places a market order exactly as described by `order`.
    async fn place_order(&self, order: &OrderRequest) -> Result<NewOrderResponse>;

    /// Every position-risk record on the account, flat symbols included.
    async fn get_position_risk(&self) -> Result<Vec<PositionRisk>>;
}

#[async_trait]
impl Exchange for ApiClient {
    async fn test_connection(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Binance connectivity check failed.");
                false
            }
        }
    }

    async fn get_ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice> {
        ApiClient::get_ticker_price(self, symbol).await
    }

    async fn get_24hr_ticker(&self, symbol: &Symbol) -> Result<Ticker24h> {
        ApiClient::get_24hr_ticker(self, symbol).await
    }

    async fn get_formatted_balance(&self) -> Result<FormattedBalance> {
        let account = self.get_account_state().await?;
        Ok(account.into())
    }

    async fn set_leverage(&self, symbol: &Symbol, leverage: u8) -> Result<()> {
        ApiClient::set_leverage(self, symbol, leverage).await
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<NewOrderResponse> {
        self.place_market_order(order).await
    }

    async fn get_position_risk(&self) -> Result<Vec<PositionRisk>> {
        ApiClient::get_position_risk(self).await
    }
}
