// In crates/risk/src/lib.rs

use core_types::{Side, TradingConfig, TradingDecision};
use rust_decimal::Decimal;
pub mod simple_manager;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use simple_manager::SimpleRiskManager;
pub use types::{EntryPlan, ProtectiveLevels};

/// The universal interface for a risk management module.
///
/// A `RiskManager` turns an approved entry decision into a sized order and
/// derives the protective levels for the resulting position. The current
/// `TradingConfig` is passed on every call, since it can change between cycles.
pub trait RiskManager: Send + Sync {
    /// The name of the risk management strategy.
    fn name(&self) -> &'static str;

    /// Sizes an entry in direction `side` for `decision`.
    ///
    /// # Arguments
    ///
    /// * `decision`: The signal that asked for the entry.
    /// * `side`: The direction of the new position.
    /// * `config`: The trading configuration in force right now.
    /// * `available_balance`: The balance that can be committed, in quote asset.
    /// * `current_price`: The latest traded price of the symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(EntryPlan)`: The order to place and the figures behind it.
    /// * `Err(Error::Vetoed)`: The entry cannot be sized into a valid order.
    fn size_entry(
        &self,
        decision: &TradingDecision,
        side: Side,
        config: &TradingConfig,
        available_balance: Decimal,
        current_price: Decimal,
    ) -> Result<EntryPlan>;

    /// Stop-loss and take-profit prices for a position opened at `entry_price`.
    fn protective_levels(
        &self,
        decision: &TradingDecision,
        side: Side,
        config: &TradingConfig,
        entry_price: Decimal,
    ) -> Result<ProtectiveLevels>;
}
