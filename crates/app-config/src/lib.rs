// In crates/app-config/src/lib.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AppSettings, BinanceSettings, ServerSettings, Settings, SignalProviderSettings,
    TradingSettings,
};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name("config/base"))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_BINANCE__API_KEY=...`).
        // The prefix is `APP`, separator is `__`.
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("trading.symbols")
                .try_parsing(true),
        );

    build_settings(builder)
}

/// Builds, deserializes and validates settings from an already assembled source stack.
pub fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

/// Rejects settings that would let the bot run with blank credentials or an empty universe.
fn validate(settings: &Settings) -> Result<()> {
    if settings.binance.api_key.trim().is_empty() {
        return Err(Error::MissingCredential("binance.api_key"));
    }
    if settings.binance.secret_key.trim().is_empty() {
        return Err(Error::MissingCredential("binance.secret_key"));
    }
    if settings.signal_provider.api_key.trim().is_empty() {
        return Err(Error::MissingCredential("signal_provider.api_key"));
    }
    if settings.trading.symbols.is_empty() {
        return Err(Error::InvalidSetting("trading.symbols must not be empty".into()));
    }
    if settings.trading.cycle_interval_secs == 0 {
        return Err(Error::InvalidSetting("trading.cycle_interval_secs must be positive".into()));
    }
    Ok(())
}
