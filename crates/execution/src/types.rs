// In crates/execution/src/types.rs

use core_types::{OrderRequest, OrderSide, Symbol};
use rust_decimal::Decimal;
use serde::Serialize;

/// The exchange's account of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub order_id: i64,
    pub symbol: Symbol,
    pub side: OrderSide,
    /// Zero when the exchange acknowledged the order before it filled.
    pub avg_price: Decimal,
    pub executed_qty: Decimal,
    pub status: String,
    pub source_request: OrderRequest,
}

impl Execution {
    /// The fill price, or `fallback` when the exchange has not reported one yet.
    pub fn fill_price_or(&self, fallback: Decimal) -> Decimal {
        if self.avg_price > Decimal::ZERO {
            self.avg_price
        } else {
            fallback
        }
    }
}
