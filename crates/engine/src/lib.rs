// In crates/engine/src/lib.rs

pub mod control;
pub mod error;
pub mod market_data;
pub mod position_store;
pub mod processor;
pub mod reconciler;
pub mod state;
pub mod supervisor;
pub mod task;

#[cfg(test)]
mod testing;

pub use control::{ControlRequest, ControlResponse, ExecutorStatus, StatusReport};
pub use error::{Error, Result};
pub use task::CycleReport;

use crate::market_data::MarketDataGateway;
use crate::processor::DecisionProcessor;
use crate::reconciler::PositionReconciler;
use crate::state::SharedState;
use crate::supervisor::PositionSupervisor;
use crate::task::TradingTask;
use api_client::Exchange;
use app_config::types::TradingSettings;
use chrono::Utc;
use core_types::{PositionSummary, Symbol, TradingConfig, TradingConfigUpdate};
use execution::{Executor, LiveExecutor};
use risk::{RiskManager, SimpleRiskManager};
use signals::SignalProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// What the executor trades and how often.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub symbols: Vec<Symbol>,
    pub cycle_interval: Duration,
    pub config: TradingConfig,
}

impl From<&TradingSettings> for ExecutorSettings {
    fn from(settings: &TradingSettings) -> Self {
        Self {
            symbols: settings.symbols.clone(),
            cycle_interval: Duration::from_secs(settings.cycle_interval_secs),
            config: settings.config.clone(),
        }
    }
}

/// The trading service: owns the shared state and the lifecycle of the trading loop.
///
/// Construct one per process and share it behind an `Arc`. `start` and `stop` are
/// serialized, and a restart waits for the previous loop to finish so two cycles
/// never run at the same time.
pub struct TradingExecutor {
    exchange: Arc<dyn Exchange>,
    signals: Arc<dyn SignalProvider>,
    state: Arc<SharedState>,
    task: Arc<TradingTask>,
    cycle_interval: Duration,
    active: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TradingExecutor {
    /// An executor that trades live through `exchange` with fixed-fractional sizing.
    pub fn new(
        exchange: Arc<dyn Exchange>,
        signals: Arc<dyn SignalProvider>,
        settings: ExecutorSettings,
    ) -> Self {
        let executor = Arc::new(LiveExecutor::new(exchange.clone()));
        Self::with_components(exchange, signals, executor, Arc::new(SimpleRiskManager::new()), settings)
    }

    pub fn with_components(
        exchange: Arc<dyn Exchange>,
        signals: Arc<dyn SignalProvider>,
        executor: Arc<dyn Executor>,
        risk_manager: Arc<dyn RiskManager>,
        settings: ExecutorSettings,
    ) -> Self {
        let state = Arc::new(SharedState::new(settings.config));
        let market_data = MarketDataGateway::new(exchange.clone());

        tracing::info!(
            executor = executor.name(),
            risk_manager = risk_manager.name(),
            signal_provider = signals.name(),
            "Trading executor assembled."
        );

        let task = TradingTask::new(
            settings.symbols,
            PositionReconciler::new(exchange.clone(), state.clone()),
            market_data.clone(),
            signals.clone(),
            DecisionProcessor::new(exchange.clone(), executor.clone(), risk_manager, state.clone()),
            PositionSupervisor::new(market_data, signals.clone(), executor, state.clone()),
        );

        let (active, _) = watch::channel(false);

        Self {
            exchange,
            signals,
            state,
            task: Arc::new(task),
            cycle_interval: settings.cycle_interval,
            active,
            worker: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Verifies both collaborators and launches the trading loop.
    ///
    /// Does nothing when already running. Fails without changing state when either the
    /// exchange or the signal provider is unreachable.
    pub async fn start(&self) -> Result<ExecutorStatus> {
        let mut worker = self.worker.lock().await;

        if self.is_active() {
            tracing::info!("Trading executor is already running.");
            return Ok(self.status().await);
        }

        if !self.exchange.test_connection().await {
            return Err(Error::Connectivity { service: "Binance" });
        }
        if !self.signals.test_connection().await {
            return Err(Error::Connectivity { service: "AI signal provider" });
        }

        // Let a loop stopped earlier drain before the next one starts.
        if let Some(previous) = worker.take() {
            if let Err(e) = previous.await {
                tracing::warn!(error = %e, "Previous trading loop ended abnormally.");
            }
        }

        self.active.send_replace(true);
        let receiver = self.active.subscribe();
        *worker = Some(tokio::spawn(self.task.clone().run(self.cycle_interval, receiver)));

        tracing::info!(
            symbols = ?self.task.symbols(),
            interval_secs = self.cycle_interval.as_secs(),
            "Trading executor started."
        );
        Ok(self.status().await)
    }

    /// Lowers the active flag. A cycle already in progress runs to completion.
    pub async fn stop(&self) -> ExecutorStatus {
        let _worker = self.worker.lock().await;

        if self.active.send_replace(false) {
            tracing::info!("Trading executor stopped.");
        } else {
            tracing::debug!("Stop requested while the executor was not running.");
        }
        self.status().await
    }

    /// Stops trading and waits for the loop to finish the cycle it is in. Call before
    /// the process exits.
    pub async fn shutdown(&self) {
        let mut worker = self.worker.lock().await;
        self.active.send_replace(false);

        if let Some(handle) = worker.take() {
            tracing::info!("Waiting for the trading loop to finish.");
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Trading loop ended abnormally.");
            }
        }
        tracing::info!("Trading executor shut down.");
    }

    pub async fn status(&self) -> ExecutorStatus {
        ExecutorStatus {
            is_active: self.is_active(),
            active_positions: self.state.position_count().await,
            config: self.state.config().await,
        }
    }

    pub async fn status_report(&self) -> StatusReport {
        StatusReport {
            status: self.status().await,
            positions: self.positions_summary().await,
            timestamp: Utc::now(),
        }
    }

    pub async fn positions_summary(&self) -> Vec<PositionSummary> {
        let mut summaries: Vec<PositionSummary> =
            self.state.positions().await.iter().map(|p| p.summary()).collect();
        summaries.sort_by(|a, b| a.symbol.0.cmp(&b.symbol.0));
        summaries
    }

    /// Merges `update` into the live configuration; the next decision sees the new values.
    pub async fn update_config(&self, update: &TradingConfigUpdate) -> TradingConfig {
        let config = self.state.update_config(update).await;
        tracing::info!(?config, "Trading configuration updated.");
        config
    }

    /// Runs a single cycle without touching the active flag.
    pub async fn run_once(&self) -> CycleReport {
        self.task.run_cycle().await
    }
}
