// In crates/signals/src/lib.rs

use async_trait::async_trait;
use core_types::{MarketSnapshot, Symbol, TradingDecision};

pub mod decision;
pub mod error;
pub mod llm;

pub use error::{Error, Result};
pub use llm::LlmSignalProvider;

/// The universal interface for a trading-signal source.
///
/// A provider looks at one symbol's market snapshot and answers with a
/// `TradingDecision`. It holds no position state of its own; the trading loop
/// decides what to do with the answer.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// The name of the provider, used in logs.
    fn name(&self) -> &str;

    /// Returns `true` when the provider is reachable and accepts our credentials.
    async fn test_connection(&self) -> bool;

    /// Produces a decision for `symbol`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(decision))`: The provider produced a usable decision.
    /// * `Ok(None)`: The provider answered but had nothing to say.
    /// * `Err(_)`: The provider could not be reached or answered with garbage.
    async fn analyze(
        &self,
        symbol: &Symbol,
        snapshot: &MarketSnapshot,
    ) -> Result<Option<TradingDecision>>;
}
