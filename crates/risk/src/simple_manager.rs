// In crates/risk/src/simple_manager.rs

use crate::types::{EntryPlan, ProtectiveLevels};
use crate::{Error, Result, RiskManager}; // Import our own trait and errors
use core_types::{OrderRequest, Side, TradingConfig, TradingDecision};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec; // For creating decimals from literals

/// The number of decimals the exchange accepts for order quantities.
pub const QUANTITY_DECIMALS: u32 = 3;

/// A fixed-fractional risk manager.
///
/// The order notional is a fixed fraction of the available balance, scaled by
/// the signal's recommended leverage capped at the configured maximum:
///
/// `quantity = round(balance × riskPerTrade × min(recommended, maxLeverage) / price, 3)`
#[derive(Debug, Default)]
pub struct SimpleRiskManager;

impl SimpleRiskManager {
    pub fn new() -> Self {
        Self
    }
}

fn to_decimal(value: f64, name: &str) -> Result<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| Error::InvalidParameters(format!("{} ({}) is not representable", name, value)))
}

/// Rounds a quantity to the exchange step, half away from zero.
pub fn round_quantity(quantity: Decimal) -> Decimal {
    quantity.round_dp_with_strategy(QUANTITY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// The highest leverage a Binance USDⓈ-M symbol can be set to.
pub const MAX_EXCHANGE_LEVERAGE: u8 = 125;

/// `min(recommended, max)`, the multiplier the notional is sized with.
///
/// Fractional values are kept as they are; only a value that is not a number
/// is rejected.
pub fn effective_leverage(recommended: f64, max_leverage: u32) -> Result<Decimal> {
    if !recommended.is_finite() {
        return Err(Error::InvalidParameters(format!(
            "recommended leverage ({}) is not a number",
            recommended
        )));
    }
    to_decimal(recommended.min(f64::from(max_leverage)), "recommended_leverage")
}

/// The whole-number leverage sent to the exchange for a sizing multiplier.
///
/// Rounded up so the margin posted never exceeds the risk amount, and kept
/// within `1..=MAX_EXCHANGE_LEVERAGE`.
pub fn exchange_leverage(multiplier: Decimal) -> u8 {
    multiplier
        .ceil()
        .clamp(Decimal::ONE, Decimal::from(MAX_EXCHANGE_LEVERAGE))
        .to_u8()
        .unwrap_or(1)
}

impl RiskManager for SimpleRiskManager {
    fn name(&self) -> &'static str {
        "SimpleRiskManager"
    }

    fn size_entry(
        &self,
        decision: &TradingDecision,
        side: Side,
        config: &TradingConfig,
        available_balance: Decimal,
        current_price: Decimal,
    ) -> Result<EntryPlan> {
        if current_price <= Decimal::ZERO {
            return Err(Error::InvalidParameters(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }

        let leverage = effective_leverage(
            decision.risk_assessment.recommended_leverage,
            config.max_leverage,
        )?;

        let risk_amount = available_balance * to_decimal(config.risk_per_trade, "risk_per_trade")?;
        let notional = risk_amount * leverage;
        let quantity = round_quantity(notional / current_price);

        if quantity <= Decimal::ZERO {
            return Err(Error::Vetoed {
                reason: format!(
                    "Order quantity rounds to {} (notional {} at price {})",
                    quantity, notional, current_price
                ),
            });
        }

        Ok(EntryPlan {
            order: OrderRequest {
                symbol: decision.symbol.clone(),
                side: side.entry_order_side(),
                quantity,
                leverage: exchange_leverage(leverage),
                reduce_only: false,
            },
            leverage,
            risk_amount,
            notional,
            price: current_price,
        })
    }

    fn protective_levels(
        &self,
        decision: &TradingDecision,
        side: Side,
        config: &TradingConfig,
        entry_price: Decimal,
    ) -> Result<ProtectiveLevels> {
        let stop_pct = to_decimal(config.stop_loss_percent, "stop_loss_percent")?;
        let take_pct = to_decimal(config.take_profit_percent, "take_profit_percent")?;

        let (stop_loss, take_profit) = match side {
            Side::Long => (
                entry_price * (dec!(1) - stop_pct),
                entry_price * (dec!(1) + take_pct),
            ),
            Side::Short => (
                entry_price * (dec!(1) + stop_pct),
                entry_price * (dec!(1) - take_pct),
            ),
        };

        // The signal's own levels win whenever it supplied them.
        let assessment = &decision.risk_assessment;
        Ok(ProtectiveLevels {
            stop_loss: if assessment.stop_loss > Decimal::ZERO { assessment.stop_loss } else { stop_loss },
            take_profit: if assessment.take_profit > Decimal::ZERO { assessment.take_profit } else { take_profit },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{
        OrderSide, RiskAssessment, Symbol, TechnicalIndicators, TradeAction, Trend, Volatility,
    };

    fn decision(recommended_leverage: f64, stop_loss: Decimal, take_profit: Decimal) -> TradingDecision {
        TradingDecision {
            symbol: Symbol::from("BTCUSDT"),
            action: TradeAction::Buy,
            confidence: 0.8,
            reasoning: String::new(),
            technical_indicators: TechnicalIndicators {
                rsi: 50.0,
                trend: Trend::Neutral,
                support: Decimal::ZERO,
                resistance: Decimal::ZERO,
            },
            risk_assessment: RiskAssessment {
                volatility: Volatility::Medium,
                stop_loss,
                take_profit,
                recommended_leverage,
            },
            model_used: "test".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn sizes_reference_scenario() {
        // balance 1000, risk 2%, recommended 5x under a 10x cap, price 50 000.
        let plan = SimpleRiskManager::new()
            .size_entry(
                &decision(5.0, Decimal::ZERO, Decimal::ZERO),
                Side::Long,
                &TradingConfig::default(),
                dec!(1000),
                dec!(50000),
            )
            .unwrap();

        assert_eq!(plan.risk_amount.round_dp(8), dec!(20));
        assert_eq!(plan.order.leverage, 5);
        assert_eq!(plan.notional.round_dp(8), dec!(100));
        assert_eq!(plan.order.quantity, dec!(0.002));
        assert_eq!(plan.order.side, OrderSide::Buy);
        assert!(!plan.order.reduce_only);
    }

    #[test]
    fn leverage_is_capped_by_config() {
        let config = TradingConfig {
            max_leverage: 3,
            ..TradingConfig::default()
        };
        let plan = SimpleRiskManager::new()
            .size_entry(
                &decision(20.0, Decimal::ZERO, Decimal::ZERO),
                Side::Short,
                &config,
                dec!(1000),
                dec!(100),
            )
            .unwrap();

        assert_eq!(plan.order.leverage, 3);
        // 1000 × 0.02 × 3 / 100
        assert_eq!(plan.order.quantity, dec!(0.6));
        assert_eq!(plan.order.side, OrderSide::Sell);
    }

    #[test]
    fn quantity_rounds_half_away_from_zero() {
        assert_eq!(round_quantity(dec!(0.0025)), dec!(0.003));
        assert_eq!(round_quantity(dec!(0.0024999)), dec!(0.002));
    }

    #[test]
    fn dust_orders_are_vetoed() {
        let err = SimpleRiskManager::new()
            .size_entry(
                &decision(1.0, Decimal::ZERO, Decimal::ZERO),
                Side::Long,
                &TradingConfig::default(),
                dec!(10),
                dec!(50000),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Vetoed { .. }));
    }

    #[test]
    fn fractional_leverage_sizes_unrounded() {
        let manager = SimpleRiskManager::new();
        let config = TradingConfig::default();

        let plan = manager
            .size_entry(&decision(2.5, Decimal::ZERO, Decimal::ZERO), Side::Long, &config, dec!(1000), dec!(100))
            .unwrap();
        // 1000 × 0.02 × 2.5 / 100
        assert_eq!(plan.order.quantity, dec!(0.5));
        assert_eq!(plan.leverage, dec!(2.5));
        assert_eq!(plan.order.leverage, 3);

        let plan = manager
            .size_entry(&decision(0.5, Decimal::ZERO, Decimal::ZERO), Side::Long, &config, dec!(1000), dec!(100))
            .unwrap();
        assert_eq!(plan.order.quantity, dec!(0.1));
        assert_eq!(plan.order.leverage, 1);
    }

    #[test]
    fn leverage_cap_above_exchange_limit_is_accepted() {
        let config = TradingConfig {
            max_leverage: 300,
            ..TradingConfig::default()
        };
        let plan = SimpleRiskManager::new()
            .size_entry(&decision(200.0, Decimal::ZERO, Decimal::ZERO), Side::Long, &config, dec!(1000), dec!(50000))
            .unwrap();
        // 1000 × 0.02 × 200 / 50 000
        assert_eq!(plan.order.quantity, dec!(0.08));
        assert_eq!(plan.order.leverage, MAX_EXCHANGE_LEVERAGE);
    }

    #[test]
    fn unusable_leverage_is_rejected() {
        assert!(matches!(effective_leverage(f64::NAN, 10), Err(Error::InvalidParameters(_))));
        assert_eq!(effective_leverage(2.9, 10).unwrap().round_dp(8), dec!(2.9));

        // A zero cap sizes a zero quantity, which is vetoed.
        let config = TradingConfig {
            max_leverage: 0,
            ..TradingConfig::default()
        };
        let err = SimpleRiskManager::new()
            .size_entry(&decision(5.0, Decimal::ZERO, Decimal::ZERO), Side::Long, &config, dec!(1000), dec!(100))
            .unwrap_err();
        assert!(matches!(err, Error::Vetoed { .. }));
    }

    #[test]
    fn protective_levels_from_config_percentages() {
        let manager = SimpleRiskManager::new();
        let config = TradingConfig::default();
        let d = decision(2.0, Decimal::ZERO, Decimal::ZERO);

        let long = manager.protective_levels(&d, Side::Long, &config, dec!(100)).unwrap();
        assert_eq!(long.stop_loss, dec!(95));
        assert_eq!(long.take_profit, dec!(110));

        let short = manager.protective_levels(&d, Side::Short, &config, dec!(100)).unwrap();
        assert_eq!(short.stop_loss, dec!(105));
        assert_eq!(short.take_profit, dec!(90));
    }

    #[test]
    fn signal_levels_override_config() {
        let manager = SimpleRiskManager::new();
        let d = decision(2.0, dec!(97.5), dec!(120));
        let levels = manager
            .protective_levels(&d, Side::Long, &TradingConfig::default(), dec!(100))
            .unwrap();
        assert_eq!(levels.stop_loss, dec!(97.5));
        assert_eq!(levels.take_profit, dec!(120));
    }
}
