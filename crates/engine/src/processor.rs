// In crates/engine/src/processor.rs

use crate::market_data::MarketDataGateway;
use crate::state::SharedState;
use api_client::Exchange;
use core_types::{Position, Side, Symbol, TradeAction, TradingConfig, TradingDecision};
use execution::{Execution, Executor};
use risk::RiskManager;
use std::sync::Arc;

/// What became of a single decision.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    BelowConfidence,
    Held,
    /// BUY/SELL for a symbol that already has a position, whichever side it is on.
    AlreadyPositioned,
    MaxPositionsReached,
    NothingToClose,
    Opened(Execution),
    Closed(Execution),
    Failed(String),
}

/// Applies the entry/exit rules to decisions, one symbol at a time.
pub struct DecisionProcessor {
    exchange: Arc<dyn Exchange>,
    market_data: MarketDataGateway,
    executor: Arc<dyn Executor>,
    risk_manager: Arc<dyn RiskManager>,
    state: Arc<SharedState>,
}

impl DecisionProcessor {
    pub fn new(
        exchange: Arc<dyn Exchange>,
        executor: Arc<dyn Executor>,
        risk_manager: Arc<dyn RiskManager>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            market_data: MarketDataGateway::new(exchange.clone()),
            exchange,
            executor,
            risk_manager,
            state,
        }
    }

    pub async fn process(&self, decision: &TradingDecision) -> DecisionOutcome {
        let config = self.state.config().await;
        let symbol = &decision.symbol;

        if decision.confidence < config.min_confidence {
            tracing::info!(
                symbol = %symbol,
                action = %decision.action,
                confidence = decision.confidence,
                min_confidence = config.min_confidence,
                "Decision below the confidence threshold, ignoring."
            );
            return DecisionOutcome::BelowConfidence;
        }

        match (decision.action, decision.action.entry_side()) {
            (TradeAction::Close, _) => match self.state.position(symbol).await {
                Some(position) => close_position(self.executor.as_ref(), &self.state, &position).await,
                None => {
                    tracing::info!(symbol = %symbol, "CLOSE signal without a tracked position, nothing to do.");
                    DecisionOutcome::NothingToClose
                }
            },
            (_, Some(side)) => self.enter(decision, side, &config).await,
            _ => {
                tracing::info!(symbol = %symbol, reasoning = %decision.reasoning, "Holding.");
                DecisionOutcome::Held
            }
        }
    }

    async fn enter(&self, decision: &TradingDecision, side: Side, config: &TradingConfig) -> DecisionOutcome {
        let symbol = &decision.symbol;

        if let Some(position) = self.state.position(symbol).await {
            tracing::info!(
                symbol = %symbol,
                held = %position.side(),
                action = %decision.action,
                "Symbol already positioned, not entering again."
            );
            return DecisionOutcome::AlreadyPositioned;
        }

        let open_positions = self.state.position_count().await;
        if open_positions >= config.max_positions {
            tracing::info!(
                symbol = %symbol,
                open_positions,
                max_positions = config.max_positions,
                "Maximum number of positions reached, skipping entry."
            );
            return DecisionOutcome::MaxPositionsReached;
        }

        match self.open_position(decision, side, config).await {
            Ok(execution) => DecisionOutcome::Opened(execution),
            Err(e) => {
                tracing::error!(symbol = %symbol, side = %side, error = %e, "Failed to open position.");
                DecisionOutcome::Failed(e.to_string())
            }
        }
    }

    async fn open_position(
        &self,
        decision: &TradingDecision,
        side: Side,
        config: &TradingConfig,
    ) -> anyhow::Result<Execution> {
        let symbol = &decision.symbol;
        let balance = self.exchange.get_formatted_balance().await?;
        let price = self.market_data.current_price(symbol).await?;

        let plan = self.risk_manager.size_entry(decision, side, config, balance.available_balance, price)?;
        tracing::info!(
            symbol = %symbol,
            side = %side,
            quantity = %plan.order.quantity,
            leverage = %plan.leverage,
            exchange_leverage = plan.order.leverage,
            risk_amount = %plan.risk_amount,
            notional = %plan.notional,
            %price,
            "Opening position."
        );

        let execution = self.executor.open(&plan.order).await?;
        let entry_price = execution.fill_price_or(price);

        match self.risk_manager.protective_levels(decision, side, config, entry_price) {
            Ok(levels) => tracing::info!(
                symbol = %symbol,
                order_id = execution.order_id,
                %entry_price,
                stop_loss = %levels.stop_loss,
                take_profit = %levels.take_profit,
                "Position opened."
            ),
            Err(e) => tracing::warn!(
                symbol = %symbol,
                order_id = execution.order_id,
                error = %e,
                "Position opened but protective levels could not be computed."
            ),
        }

        Ok(execution)
    }
}

/// Flattens `position` and drops it from the store once the exchange accepted the order.
pub(crate) async fn close_position(
    executor: &dyn Executor,
    state: &SharedState,
    position: &Position,
) -> DecisionOutcome {
    let symbol: &Symbol = &position.symbol;
    match executor.close(position).await {
        Ok(execution) => {
            state.remove_position(symbol).await;
            tracing::info!(symbol = %symbol, side = %position.side(), order_id = execution.order_id, "Position closed.");
            DecisionOutcome::Closed(execution)
        }
        Err(e) => {
            tracing::error!(symbol = %symbol, error = %e, "Failed to close position.");
            DecisionOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExchange, decision, position};
    use core_types::OrderSide;
    use execution::LiveExecutor;
    use risk::SimpleRiskManager;
    use rust_decimal_macros::dec;

    fn processor(exchange: Arc<MockExchange>, state: Arc<SharedState>) -> DecisionProcessor {
        DecisionProcessor::new(
            exchange.clone(),
            Arc::new(LiveExecutor::new(exchange)),
            Arc::new(SimpleRiskManager::new()),
            state,
        )
    }

    fn setup() -> (Arc<MockExchange>, Arc<SharedState>) {
        let exchange = Arc::new(MockExchange::new().with_price("BTCUSDT", dec!(50000)).with_price("ETHUSDT", dec!(2500)));
        (exchange, Arc::new(SharedState::new(TradingConfig::default())))
    }

    #[tokio::test]
    async fn buy_opens_a_sized_long() {
        let (exchange, state) = setup();

        let outcome = processor(exchange.clone(), state).process(&decision("BTCUSDT", TradeAction::Buy, 0.75)).await;

        assert!(matches!(outcome, DecisionOutcome::Opened(_)));
        let orders = exchange.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, OrderSide::Buy);
        // 1000 × 0.02 × 5 / 50 000
        assert_eq!(orders[0].quantity, dec!(0.002));
        assert!(!orders[0].reduce_only);
    }

    #[tokio::test]
    async fn low_confidence_is_ignored_before_anything_else() {
        let (exchange, state) = setup();

        let outcome = processor(exchange.clone(), state).process(&decision("BTCUSDT", TradeAction::Buy, 0.59)).await;

        assert_eq!(outcome, DecisionOutcome::BelowConfidence);
        assert!(exchange.orders().is_empty());
    }

    #[tokio::test]
    async fn low_confidence_sell_places_nothing() {
        let (exchange, state) = setup();

        let outcome = processor(exchange.clone(), state.clone())
            .process(&decision("ETHUSDT", TradeAction::Sell, 0.4))
            .await;

        assert_eq!(outcome, DecisionOutcome::BelowConfidence);
        assert!(exchange.orders().is_empty());
        assert_eq!(state.position_count().await, 0);
    }

    #[tokio::test]
    async fn low_confidence_close_keeps_the_held_position() {
        let (exchange, state) = setup();
        state.replace_positions(vec![position("ETHUSDT", dec!(-2), dec!(10), dec!(-5000))]).await;

        let outcome = processor(exchange.clone(), state.clone())
            .process(&decision("ETHUSDT", TradeAction::Close, 0.5))
            .await;

        assert_eq!(outcome, DecisionOutcome::BelowConfidence);
        assert!(exchange.orders().is_empty());
        assert!(state.position(&Symbol::from("ETHUSDT")).await.is_some());
    }

    #[tokio::test]
    async fn positioned_symbol_is_never_re_entered() {
        let (exchange, state) = setup();
        state.replace_positions(vec![position("BTCUSDT", dec!(0.01), dec!(1), dec!(500))]).await;
        let processor = processor(exchange.clone(), state);

        // Same side and opposite side are both no-ops.
        assert_eq!(processor.process(&decision("BTCUSDT", TradeAction::Buy, 0.9)).await, DecisionOutcome::AlreadyPositioned);
        assert_eq!(processor.process(&decision("BTCUSDT", TradeAction::Sell, 0.9)).await, DecisionOutcome::AlreadyPositioned);
        assert!(exchange.orders().is_empty());
    }

    #[tokio::test]
    async fn entry_refused_at_max_positions() {
        let (exchange, state) = setup();
        state.update_config(&core_types::TradingConfigUpdate { max_positions: Some(1), ..Default::default() }).await;
        state.replace_positions(vec![position("BTCUSDT", dec!(0.01), dec!(1), dec!(500))]).await;

        let outcome = processor(exchange.clone(), state).process(&decision("ETHUSDT", TradeAction::Sell, 0.9)).await;

        assert_eq!(outcome, DecisionOutcome::MaxPositionsReached);
        assert!(exchange.orders().is_empty());
    }

    #[tokio::test]
    async fn close_flattens_and_forgets_the_position() {
        let (exchange, state) = setup();
        state.replace_positions(vec![position("ETHUSDT", dec!(-2), dec!(10), dec!(-5000))]).await;

        let outcome = processor(exchange.clone(), state.clone()).process(&decision("ETHUSDT", TradeAction::Close, 0.7)).await;

        assert!(matches!(outcome, DecisionOutcome::Closed(_)));
        let orders = exchange.orders();
        assert_eq!(orders[0].side, OrderSide::Buy);
        assert_eq!(orders[0].quantity, dec!(2.000));
        assert!(orders[0].reduce_only);
        assert_eq!(state.position_count().await, 0);
    }

    #[tokio::test]
    async fn close_without_position_does_nothing() {
        let (exchange, state) = setup();

        let outcome = processor(exchange.clone(), state).process(&decision("ETHUSDT", TradeAction::Close, 0.9)).await;

        assert_eq!(outcome, DecisionOutcome::NothingToClose);
        assert!(exchange.orders().is_empty());
    }

    #[tokio::test]
    async fn failed_close_keeps_the_position() {
        let (exchange, state) = setup();
        exchange.failing_orders.lock().unwrap().insert(Symbol::from("ETHUSDT"));
        state.replace_positions(vec![position("ETHUSDT", dec!(1), dec!(0), dec!(2500))]).await;

        let outcome = processor(exchange, state.clone()).process(&decision("ETHUSDT", TradeAction::Close, 0.9)).await;

        assert!(matches!(outcome, DecisionOutcome::Failed(_)));
        assert!(state.position(&Symbol::from("ETHUSDT")).await.is_some());
    }

    #[tokio::test]
    async fn hold_does_nothing() {
        let (exchange, state) = setup();

        let outcome = processor(exchange.clone(), state).process(&decision("BTCUSDT", TradeAction::Hold, 0.95)).await;

        assert_eq!(outcome, DecisionOutcome::Held);
        assert!(exchange.orders().is_empty());
    }

    #[tokio::test]
    async fn unsized_entry_never_reaches_the_exchange() {
        let (exchange, state) = setup();
        *exchange.available_balance.lock().unwrap() = dec!(1);

        let outcome = processor(exchange.clone(), state).process(&decision("BTCUSDT", TradeAction::Buy, 0.8)).await;

        assert!(matches!(outcome, DecisionOutcome::Failed(_)));
        assert!(exchange.orders().is_empty());
    }
}
