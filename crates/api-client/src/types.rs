// In crates/api-client/src/types.rs

use core_types::{Position, Symbol};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The main client for interacting with the Binance Futures API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The user's Binance API key.
    pub api_key: String,
    /// The user's Binance secret key.
    pub secret_key: String,
    /// The base URL for the Binance Futures API.
    pub base_url: String,
}

/// Latest traded price, from `GET /fapi/v1/ticker/price`.
#[derive(Debug, Deserialize, Clone)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Rolling 24h statistics, from `GET /fapi/v1/ticker/24hr`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub price_change_percent: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
}

/// Represents the overall futures account state, from `GET /fapi/v2/account`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    /// The total wallet balance in USDT.
    pub total_wallet_balance: Decimal,
    /// The total unrealized profit and loss in USDT.
    pub total_unrealized_profit: Decimal,
    /// The balance that can still be committed to new positions.
    pub available_balance: Decimal,
}

/// The balance figures the trading loop needs, in USDT.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedBalance {
    pub total_wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub unrealized_profit: Decimal,
}

impl From<AccountState> for FormattedBalance {
    fn from(account: AccountState) -> Self {
        Self {
            total_wallet_balance: account.total_wallet_balance,
            available_balance: account.available_balance,
            unrealized_profit: account.total_unrealized_profit,
        }
    }
}

/// Represents a single position-risk record, from `GET /fapi/v2/positionRisk`.
///
/// The exchange lists every symbol, including flat ones with a zero amount.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    /// The quantity of the position (positive for long, negative for short).
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    #[serde(rename = "unRealizedProfit")]
    pub unrealized_profit: Decimal,
    #[serde(default)]
    pub notional: Decimal,
    /// The leverage used for the position, as a decimal string (e.g., "10").
    pub leverage: String,
    #[serde(default)]
    pub position_side: String,
}

impl PositionRisk {
    /// Converts the record into a tracked position, or `None` when the symbol is flat.
    pub fn into_position(self) -> Option<Position> {
        if self.position_amt.is_zero() {
            return None;
        }
        Some(Position {
            symbol: Symbol(self.symbol),
            amount: self.position_amt,
            entry_price: self.entry_price,
            mark_price: self.mark_price,
            unrealized_pnl: self.unrealized_profit,
            notional: self.notional,
            leverage: self.leverage.parse().unwrap_or(1),
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub order_id: i64,
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    pub side: String,   // "BUY" or "SELL"
    pub r#type: String, // "MARKET", "LIMIT", etc.
    /// The average fill price; the testnet reports zero for orders acknowledged before fill.
    #[serde(default)]
    pub avg_price: Decimal,
    #[serde(default)]
    pub executed_qty: Decimal,
    #[serde(default)]
    pub cum_quote: Decimal,
    #[serde(default)]
    pub reduce_only: bool,
}
