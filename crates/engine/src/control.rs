// In crates/engine/src/control.rs

use crate::{Error, Result, TradingExecutor};
use chrono::{DateTime, Utc};
use core_types::{PositionSummary, TradingConfig, TradingConfigUpdate};
use serde::{Deserialize, Serialize};

/// The command document accepted by the control surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlRequest {
    pub action: String,
    #[serde(default)]
    pub config: Option<TradingConfigUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorStatus {
    pub is_active: bool,
    pub active_positions: usize,
    pub config: TradingConfig,
}

/// The status document: executor state plus a summary of every tracked position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(flatten)]
    pub status: ExecutorStatus,
    pub positions: Vec<PositionSummary>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TradingConfig>,
}

impl ControlResponse {
    fn with_status(message: &str, status: ExecutorStatus) -> Self {
        Self { message: message.to_string(), status: Some(status), config: None }
    }
}

impl TradingExecutor {
    /// Executes a `start`, `stop` or `config` command.
    pub async fn handle(&self, request: ControlRequest) -> Result<ControlResponse> {
        match request.action.as_str() {
            "start" => {
                let status = self.start().await?;
                Ok(ControlResponse::with_status("Trading executor started", status))
            }
            "stop" => {
                let status = self.stop().await;
                Ok(ControlResponse::with_status("Trading executor stopped", status))
            }
            "config" => {
                let update = request.config.ok_or_else(|| {
                    Error::Configuration("Configuration data required for config action".to_string())
                })?;
                let config = self.update_config(&update).await;
                Ok(ControlResponse {
                    message: "Configuration updated".to_string(),
                    status: None,
                    config: Some(config),
                })
            }
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}
