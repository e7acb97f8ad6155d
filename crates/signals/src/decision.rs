// In crates/signals/src/decision.rs

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use core_types::{
    RiskAssessment, Symbol, TechnicalIndicators, TradeAction, TradingDecision, Trend, Volatility,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::Value;

/// The JSON document the model is asked to produce.
///
/// The nested blocks are kept as raw values so that a malformed block falls
/// back to defaults instead of discarding the whole answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub action: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub technical_indicators: Option<Value>,
    #[serde(default)]
    pub risk_assessment: Option<Value>,
    #[serde(default)]
    pub model_used: Option<String>,
}

/// An indicators block as the model wrote it; any field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialIndicators {
    rsi: Option<f64>,
    trend: Option<Trend>,
    support: Option<Decimal>,
    resistance: Option<Decimal>,
}

impl PartialIndicators {
    fn complete(self, price: Decimal) -> TechnicalIndicators {
        let defaults = default_indicators(price);
        TechnicalIndicators {
            rsi: self.rsi.unwrap_or(defaults.rsi),
            trend: self.trend.unwrap_or(defaults.trend),
            support: self.support.unwrap_or(defaults.support),
            resistance: self.resistance.unwrap_or(defaults.resistance),
        }
    }
}

/// A risk block as the model wrote it; any field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialRiskAssessment {
    volatility: Option<Volatility>,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    recommended_leverage: Option<f64>,
}

impl PartialRiskAssessment {
    /// A missing level becomes zero ("no suggestion") so sizing falls back to the
    /// configured percentages rather than to levels the model never gave.
    fn complete(self, price: Decimal) -> RiskAssessment {
        let defaults = default_risk_assessment(price);
        RiskAssessment {
            volatility: self.volatility.unwrap_or(defaults.volatility),
            stop_loss: self.stop_loss.unwrap_or(Decimal::ZERO),
            take_profit: self.take_profit.unwrap_or(Decimal::ZERO),
            recommended_leverage: self.recommended_leverage.unwrap_or(defaults.recommended_leverage),
        }
    }
}

/// Neutral indicators anchored on the current price.
pub fn default_indicators(price: Decimal) -> TechnicalIndicators {
    TechnicalIndicators {
        rsi: 50.0,
        trend: Trend::Neutral,
        support: price * dec!(0.95),
        resistance: price * dec!(1.05),
    }
}

/// A medium-risk assessment at 2x leverage anchored on the current price.
pub fn default_risk_assessment(price: Decimal) -> RiskAssessment {
    RiskAssessment {
        volatility: Volatility::Medium,
        stop_loss: price * dec!(0.95),
        take_profit: price * dec!(1.10),
        recommended_leverage: 2.0,
    }
}

/// Removes a surrounding markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parses the model's reply and fills every omitted block with its default.
pub fn parse_decision(
    symbol: &Symbol,
    content: &str,
    price: Decimal,
    default_model: &str,
    now: DateTime<Utc>,
) -> Result<TradingDecision> {
    let body = strip_code_fence(content);
    let raw: RawAnalysis = serde_json::from_str(body)
        .map_err(|e| Error::InvalidResponse(format!("{} (text: {})", e, body)))?;
    build_decision(symbol, raw, price, default_model, now)
}

pub fn build_decision(
    symbol: &Symbol,
    raw: RawAnalysis,
    price: Decimal,
    default_model: &str,
    now: DateTime<Utc>,
) -> Result<TradingDecision> {
    let action: TradeAction = raw
        .action
        .parse()
        .map_err(|e: core_types::Error| Error::InvalidResponse(e.to_string()))?;

    if !raw.confidence.is_finite() {
        return Err(Error::InvalidResponse("confidence is not a number".into()));
    }

    // An absent or unreadable block takes the full default; a readable one keeps
    // every field it has.
    let technical_indicators = raw
        .technical_indicators
        .and_then(|v| serde_json::from_value::<PartialIndicators>(v).ok())
        .map_or_else(|| default_indicators(price), |block| block.complete(price));

    let risk_assessment = raw
        .risk_assessment
        .and_then(|v| serde_json::from_value::<PartialRiskAssessment>(v).ok())
        .map_or_else(|| default_risk_assessment(price), |block| block.complete(price));

    Ok(TradingDecision {
        symbol: symbol.clone(),
        action,
        confidence: raw.confidence.clamp(0.0, 1.0),
        reasoning: raw.reasoning,
        technical_indicators,
        risk_assessment,
        model_used: raw.model_used.unwrap_or_else(|| default_model.to_string()),
        timestamp: now,
    })
}
