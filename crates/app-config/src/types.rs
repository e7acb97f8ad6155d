// In crates/app-config/src/types.rs

use serde::Deserialize;

use core_types::{Symbol, TradingConfig};

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Credentials and endpoint for the Binance Futures API.
    pub binance: BinanceSettings,
    /// Credentials and model selection for the AI signal provider.
    pub signal_provider: SignalProviderSettings,
    /// Where the control API listens.
    pub server: ServerSettings,
    #[serde(default)]
    pub trading: TradingSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BinanceSettings {
    /// The API key for Binance. Absent means empty, which validation rejects.
    #[serde(default)]
    pub api_key: String,
    /// The secret key for Binance.
    #[serde(default)]
    pub secret_key: String,
    /// The REST API base URL for Binance Futures (testnet or production).
    pub rest_base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SignalProviderSettings {
    /// Bearer token for the OpenAI-compatible inference endpoint.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Settings for the trading loop itself.
#[derive(Deserialize, Debug, Clone)]
pub struct TradingSettings {
    /// The symbol universe analysed every cycle.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<Symbol>,
    /// Seconds between the start of two consecutive cycles.
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_secs: u64,
    /// Initial risk parameters; they can be changed at runtime with a config command.
    #[serde(default)]
    pub config: TradingConfig,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            cycle_interval_secs: default_cycle_interval(),
            config: TradingConfig::default(),
        }
    }
}

// Helper functions for serde defaults
fn default_provider_url() -> String { "https://api.studio.nebius.ai/v1".to_string() }
fn default_model() -> String { "meta-llama/Meta-Llama-3.1-8B-Instruct".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_tokens() -> u32 { 1024 }
fn default_cycle_interval() -> u64 { 30 }
fn default_symbols() -> Vec<Symbol> {
    ["BTCUSDT", "ETHUSDT", "SOLUSDT", "ADAUSDT", "DOGEUSDT"]
        .into_iter()
        .map(Symbol::from)
        .collect()
}
