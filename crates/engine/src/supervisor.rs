// In crates/engine/src/supervisor.rs

use crate::market_data::MarketDataGateway;
use crate::processor::{DecisionOutcome, close_position};
use crate::state::SharedState;
use core_types::{Position, Symbol};
use execution::Executor;
use signals::SignalProvider;
use std::fmt;
use std::sync::Arc;

/// A contradicting signal must be strictly more confident than this to close a position.
pub const REVERSAL_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    SignalReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExitReason::TakeProfit => "take-profit",
            ExitReason::StopLoss => "stop-loss",
            ExitReason::SignalReversal => "signal reversal",
        })
    }
}

/// Re-examines every tracked position after the decisions of a cycle were applied.
///
/// Rules are checked in order and the first match wins: take-profit, stop-loss,
/// then a fresh signal that points against the held side.
pub struct PositionSupervisor {
    market_data: MarketDataGateway,
    signals: Arc<dyn SignalProvider>,
    executor: Arc<dyn Executor>,
    state: Arc<SharedState>,
}

impl PositionSupervisor {
    pub fn new(
        market_data: MarketDataGateway,
        signals: Arc<dyn SignalProvider>,
        executor: Arc<dyn Executor>,
        state: Arc<SharedState>,
    ) -> Self {
        Self { market_data, signals, executor, state }
    }

    /// Returns the positions that were closed and why.
    pub async fn supervise(&self) -> Vec<(Symbol, ExitReason)> {
        let mut exits = Vec::new();

        for position in self.state.positions().await {
            let reason = match self.exit_reason(&position).await {
                Ok(Some(reason)) => reason,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(symbol = %position.symbol, error = %e, "Failed to supervise position.");
                    continue;
                }
            };

            tracing::info!(
                symbol = %position.symbol,
                side = %position.side(),
                pnl_percent = position.pnl_percent(),
                reason = %reason,
                "Exit condition met."
            );
            if let DecisionOutcome::Closed(_) =
                close_position(self.executor.as_ref(), &self.state, &position).await
            {
                exits.push((position.symbol.clone(), reason));
            }
        }

        exits
    }

    async fn exit_reason(&self, position: &Position) -> anyhow::Result<Option<ExitReason>> {
        let config = self.state.config().await;
        let pnl_percent = position.pnl_percent();

        if pnl_percent >= config.take_profit_percent * 100.0 {
            return Ok(Some(ExitReason::TakeProfit));
        }
        if pnl_percent <= -config.stop_loss_percent * 100.0 {
            return Ok(Some(ExitReason::StopLoss));
        }

        let snapshot = self.market_data.snapshot_at(&position.symbol, position.mark_price).await?;
        let Some(decision) = self.signals.analyze(&position.symbol, &snapshot).await? else {
            return Ok(None);
        };

        if decision.confidence > REVERSAL_CONFIDENCE && decision.action.opposes(position.side()) {
            tracing::info!(
                symbol = %position.symbol,
                action = %decision.action,
                confidence = decision.confidence,
                reasoning = %decision.reasoning,
                "Signal reversed against the open position."
            );
            return Ok(Some(ExitReason::SignalReversal));
        }
        Ok(None)
    }
}
