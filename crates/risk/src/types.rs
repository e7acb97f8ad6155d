// In crates/risk/src/types.rs

use core_types::OrderRequest;
use rust_decimal::Decimal;
use serde::Serialize;

/// A sized entry order together with the figures it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPlan {
    pub order: OrderRequest,
    /// `min(recommendedLeverage, maxLeverage)`; `order.leverage` is its whole-number form.
    pub leverage: Decimal,
    /// `availableBalance × riskPerTrade`, in quote asset.
    pub risk_amount: Decimal,
    /// `riskAmount × leverage`, in quote asset.
    pub notional: Decimal,
    /// The price the quantity was computed against.
    pub price: Decimal,
}

/// Software-enforced exit levels for a freshly opened position.
///
/// These are never sent to the exchange; the position supervisor enforces the
/// configured percentages on every cycle instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProtectiveLevels {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}
