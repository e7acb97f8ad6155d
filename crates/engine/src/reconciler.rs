// In crates/engine/src/reconciler.rs

use crate::state::SharedState;
use api_client::Exchange;
use core_types::Position;
use std::sync::Arc;

/// Rebuilds the local position store from what the exchange reports.
pub struct PositionReconciler {
    exchange: Arc<dyn Exchange>,
    state: Arc<SharedState>,
}

impl PositionReconciler {
    pub fn new(exchange: Arc<dyn Exchange>, state: Arc<SharedState>) -> Self {
        Self { exchange, state }
    }

    /// Replaces the store with the exchange's non-zero positions.
    ///
    /// On failure the previous contents are kept and `false` is returned; the cycle
    /// carries on with stale positions.
    pub async fn refresh(&self) -> bool {
        let records = match self.exchange.get_position_risk().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh positions; keeping the previous snapshot.");
                return false;
            }
        };

        let positions: Vec<Position> = records
            .into_iter()
            .filter_map(|record| record.into_position())
            .collect();
        tracing::debug!(open_positions = positions.len(), "Positions refreshed from the exchange.");

        self.state.replace_positions(positions).await;
        true
    }
}
