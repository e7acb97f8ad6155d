// In crates/engine/src/task.rs

use crate::market_data::MarketDataGateway;
use crate::processor::{DecisionOutcome, DecisionProcessor};
use crate::reconciler::PositionReconciler;
use crate::supervisor::{ExitReason, PositionSupervisor};
use core_types::{Symbol, TradingDecision};
use signals::SignalProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// What a single cycle did, mostly for logging and for `app once`.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// False when the position refresh failed and the cycle ran on the previous snapshot.
    pub positions_refreshed: bool,
    pub decisions: Vec<TradingDecision>,
    pub outcomes: Vec<(Symbol, DecisionOutcome)>,
    pub exits: Vec<(Symbol, ExitReason)>,
}

impl CycleReport {
    pub fn opened(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| matches!(o, DecisionOutcome::Opened(_))).count()
    }

    pub fn closed(&self) -> usize {
        let by_signal = self.outcomes.iter().filter(|(_, o)| matches!(o, DecisionOutcome::Closed(_))).count();
        by_signal + self.exits.len()
    }
}

/// One trading cycle over the whole symbol universe, plus the periodic loop around it.
pub struct TradingTask {
    symbols: Vec<Symbol>,
    reconciler: PositionReconciler,
    market_data: MarketDataGateway,
    signals: Arc<dyn SignalProvider>,
    processor: DecisionProcessor,
    supervisor: PositionSupervisor,
}

impl TradingTask {
    pub fn new(
        symbols: Vec<Symbol>,
        reconciler: PositionReconciler,
        market_data: MarketDataGateway,
        signals: Arc<dyn SignalProvider>,
        processor: DecisionProcessor,
        supervisor: PositionSupervisor,
    ) -> Self {
        Self { symbols, reconciler, market_data, signals, processor, supervisor }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Refresh positions, collect a decision per symbol, apply them, then supervise.
    ///
    /// Symbols are handled one after another. A failure on one symbol is logged and the
    /// cycle moves on to the next.
    pub async fn run_cycle(&self) -> CycleReport {
        let positions_refreshed = self.reconciler.refresh().await;

        let decisions = self.collect_decisions().await;

        let mut outcomes = Vec::with_capacity(decisions.len());
        for decision in &decisions {
            let outcome = self.processor.process(decision).await;
            outcomes.push((decision.symbol.clone(), outcome));
        }

        let exits = self.supervisor.supervise().await;

        CycleReport { positions_refreshed, decisions, outcomes, exits }
    }

    async fn collect_decisions(&self) -> Vec<TradingDecision> {
        let mut decisions = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            match self.analyze(symbol).await {
                Ok(Some(decision)) => {
                    tracing::info!(
                        symbol = %symbol,
                        action = %decision.action,
                        confidence = decision.confidence,
                        model = %decision.model_used,
                        "Decision received."
                    );
                    decisions.push(decision);
                }
                Ok(None) => tracing::debug!(symbol = %symbol, "No decision for symbol."),
                Err(e) => tracing::error!(symbol = %symbol, error = %e, "Failed to analyze symbol."),
            }
        }
        decisions
    }

    async fn analyze(&self, symbol: &Symbol) -> anyhow::Result<Option<TradingDecision>> {
        let snapshot = self.market_data.snapshot(symbol).await?;
        Ok(self.signals.analyze(symbol, &snapshot).await?)
    }

    /// Runs a cycle immediately and then every `period` while `active` holds `true`.
    ///
    /// A cycle in progress always completes; the flag is checked before each new one.
    pub async fn run(self: Arc<Self>, period: Duration, mut active: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(symbols = self.symbols.len(), period_secs = period.as_secs(), "Trading loop started.");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*active.borrow() {
                        break;
                    }
                    let report = self.run_cycle().await;
                    tracing::info!(
                        positions_refreshed = report.positions_refreshed,
                        decisions = report.decisions.len(),
                        opened = report.opened(),
                        closed = report.closed(),
                        "Trading cycle complete."
                    );
                }
                changed = active.changed() => {
                    // The sender is gone or the flag was lowered.
                    if changed.is_err() || !*active.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Trading loop stopped.");
    }
}
