// In crates/engine/src/state.rs

use crate::position_store::PositionStore;
use core_types::{Position, Symbol, TradingConfig};
use tokio::sync::RwLock;

/// The mutable state shared between the trading loop and the control surface.
///
/// Guards are only ever held for in-memory reads and writes, never across exchange or
/// provider calls, so a status query never waits on a running cycle.
#[derive(Debug, Default)]
pub struct SharedState {
    config: RwLock<TradingConfig>,
    positions: RwLock<PositionStore>,
}

impl SharedState {
    pub fn new(config: TradingConfig) -> Self {
        Self {
            config: RwLock::new(config),
            positions: RwLock::new(PositionStore::default()),
        }
    }

    /// A copy of the configuration as it stands right now.
    pub async fn config(&self) -> TradingConfig {
        self.config.read().await.clone()
    }

    pub async fn update_config(&self, update: &core_types::TradingConfigUpdate) -> TradingConfig {
        let mut config = self.config.write().await;
        config.apply(update);
        config.clone()
    }

    pub async fn position(&self, symbol: &Symbol) -> Option<Position> {
        self.positions.read().await.get(symbol).cloned()
    }

    pub async fn positions(&self) -> Vec<Position> {
        self.positions.read().await.all().cloned().collect()
    }

    pub async fn position_count(&self) -> usize {
        self.positions.read().await.len()
    }

    pub async fn replace_positions(&self, positions: Vec<Position>) {
        self.positions.write().await.replace(positions);
    }

    pub async fn remove_position(&self, symbol: &Symbol) -> Option<Position> {
        self.positions.write().await.remove(symbol)
    }
}
