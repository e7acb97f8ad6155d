// In crates/core-types/src/types.rs

use crate::Error;
use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading pair symbol as the exchange names it (e.g., "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// The direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The order side that grows a position in this direction.
    pub fn entry_order_side(self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }

    /// The order side that reduces a position in this direction.
    pub fn exit_order_side(self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Sell,
            Side::Short => OrderSide::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("LONG"),
            Side::Short => f.write_str("SHORT"),
        }
    }
}

/// The side of an order as sent to the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// What a signal wants done with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Close,
    Hold,
}

impl TradeAction {
    /// The side a fresh entry for this action would take, if any.
    pub fn entry_side(self) -> Option<Side> {
        match self {
            TradeAction::Buy => Some(Side::Long),
            TradeAction::Sell => Some(Side::Short),
            TradeAction::Close | TradeAction::Hold => None,
        }
    }

    /// True when the action points against a held position (SELL vs LONG, BUY vs SHORT).
    pub fn opposes(self, held: Side) -> bool {
        matches!(
            (self, held),
            (TradeAction::Sell, Side::Long) | (TradeAction::Buy, Side::Short)
        )
    }
}

impl FromStr for TradeAction {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            "CLOSE" => Ok(TradeAction::Close),
            "HOLD" => Ok(TradeAction::Hold),
            _ => Err(Error::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Close => "CLOSE",
            TradeAction::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Volatility {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub trend: Trend,
    pub support: Decimal,
    pub resistance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub volatility: Volatility,
    /// Suggested stop-loss price. Zero means "no suggestion".
    pub stop_loss: Decimal,
    /// Suggested take-profit price. Zero means "no suggestion".
    pub take_profit: Decimal,
    pub recommended_leverage: f64,
}

/// A single decision produced by the signal provider for one symbol and one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingDecision {
    pub symbol: Symbol,
    pub action: TradeAction,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    pub technical_indicators: TechnicalIndicators,
    pub risk_assessment: RiskAssessment,
    pub model_used: String,
    pub timestamp: DateTime<Utc>,
}

/// The market picture handed to the signal provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price: Decimal,
    /// Percent, as reported by the 24h ticker (e.g., `-2.4`).
    pub change_24h: f64,
    pub volume_24h: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
}

/// An open position as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: Symbol,
    /// Positive for long, negative for short. Never zero inside the position store.
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub notional: Decimal,
    pub leverage: u8,
}

impl Position {
    pub fn side(&self) -> Side {
        if self.amount > Decimal::ZERO {
            Side::Long
        } else {
            Side::Short
        }
    }

    /// Absolute position size in base asset.
    pub fn size(&self) -> Decimal {
        self.amount.abs()
    }

    /// Unrealized P&L as a percentage of the absolute notional, 0 when notional is 0.
    pub fn pnl_percent(&self) -> f64 {
        let notional = self.notional.abs();
        if notional.is_zero() {
            return 0.0;
        }
        (self.unrealized_pnl / notional * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> PositionSummary {
        PositionSummary {
            symbol: self.symbol.clone(),
            side: self.side(),
            size: self.size().to_f64().unwrap_or(0.0),
            entry_price: self.entry_price.to_f64().unwrap_or(0.0),
            mark_price: self.mark_price.to_f64().unwrap_or(0.0),
            pnl: self.unrealized_pnl.to_f64().unwrap_or(0.0),
            pnl_percent: self.pnl_percent(),
        }
    }
}

/// The per-position line shown by the status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub symbol: Symbol,
    pub side: Side,
    pub size: f64,
    pub entry_price: f64,
    pub mark_price: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}

/// The tunable risk parameters of the trading loop.
///
/// JSON uses camelCase; settings files and environment overrides use snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingConfig {
    #[serde(alias = "max_positions")]
    pub max_positions: usize,
    /// Fraction of the available balance put at risk per entry.
    #[serde(alias = "risk_per_trade")]
    pub risk_per_trade: f64,
    #[serde(alias = "max_leverage")]
    pub max_leverage: u32,
    #[serde(alias = "min_confidence")]
    pub min_confidence: f64,
    #[serde(alias = "stop_loss_percent")]
    pub stop_loss_percent: f64,
    #[serde(alias = "take_profit_percent")]
    pub take_profit_percent: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_positions: 5,
            risk_per_trade: 0.02,
            max_leverage: 10,
            min_confidence: 0.60,
            stop_loss_percent: 0.05,
            take_profit_percent: 0.10,
        }
    }
}

impl TradingConfig {
    /// Merges the fields present in `update`, leaving the others untouched.
    pub fn apply(&mut self, update: &TradingConfigUpdate) {
        if let Some(v) = update.max_positions {
            self.max_positions = v;
        }
        if let Some(v) = update.risk_per_trade {
            self.risk_per_trade = v;
        }
        if let Some(v) = update.max_leverage {
            self.max_leverage = v;
        }
        if let Some(v) = update.min_confidence {
            self.min_confidence = v;
        }
        if let Some(v) = update.stop_loss_percent {
            self.stop_loss_percent = v;
        }
        if let Some(v) = update.take_profit_percent {
            self.take_profit_percent = v;
        }
    }
}

/// A partial `TradingConfig` as sent by a config command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_positions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_per_trade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_leverage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_percent: Option<f64>,
}

/// A validated order, ready to be handed to an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: OrderSide,
    /// Base-asset quantity, already rounded to the exchange's 3-decimal step.
    pub quantity: Decimal,
    pub leverage: u8,
    pub reduce_only: bool,
}
