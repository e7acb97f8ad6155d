// In crates/engine/src/testing.rs

//! In-memory collaborators for the engine tests.

use api_client::{FormattedBalance, NewOrderResponse, PositionRisk, Ticker24h, TickerPrice};
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    MarketSnapshot, OrderRequest, Position, RiskAssessment, Symbol, TechnicalIndicators,
    TradeAction, TradingDecision, Trend, Volatility,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn api_error(body: &str) -> api_client::Error {
    api_client::Error::ApiError { status: 400, body: body.to_string() }
}

pub struct MockExchange {
    pub connected: AtomicBool,
    pub available_balance: Mutex<Decimal>,
    pub prices: Mutex<HashMap<Symbol, Decimal>>,
    pub positions: Mutex<Vec<Position>>,
    pub fail_position_risk: AtomicBool,
    pub position_risk_calls: AtomicUsize,
    pub failing_orders: Mutex<HashSet<Symbol>>,
    pub orders: Mutex<Vec<OrderRequest>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            available_balance: Mutex::new(dec!(1000)),
            prices: Mutex::new(HashMap::new()),
            positions: Mutex::new(Vec::new()),
            fail_position_risk: AtomicBool::new(false),
            position_risk_calls: AtomicUsize::new(0),
            failing_orders: Mutex::new(HashSet::new()),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.prices.lock().unwrap().insert(Symbol::from(symbol), price);
        self
    }

    pub fn set_positions(&self, positions: Vec<Position>) {
        *self.positions.lock().unwrap() = positions;
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn position_risk_calls(&self) -> usize {
        self.position_risk_calls.load(Ordering::SeqCst)
    }

    fn price_of(&self, symbol: &Symbol) -> api_client::Result<Decimal> {
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| api_error("Invalid symbol."))
    }
}

#[async_trait]
impl api_client::Exchange for MockExchange {
    async fn test_connection(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn get_ticker_price(&self, symbol: &Symbol) -> api_client::Result<TickerPrice> {
        Ok(TickerPrice { symbol: symbol.0.clone(), price: self.price_of(symbol)? })
    }

    async fn get_24hr_ticker(&self, symbol: &Symbol) -> api_client::Result<Ticker24h> {
        let price = self.price_of(symbol)?;
        Ok(Ticker24h {
            symbol: symbol.0.clone(),
            price_change_percent: dec!(1.25),
            last_price: price,
            volume: dec!(1000),
            high_price: price * dec!(1.02),
            low_price: price * dec!(0.98),
        })
    }

    async fn get_formatted_balance(&self) -> api_client::Result<FormattedBalance> {
        let available_balance = *self.available_balance.lock().unwrap();
        Ok(FormattedBalance {
            total_wallet_balance: available_balance,
            available_balance,
            unrealized_profit: Decimal::ZERO,
        })
    }

    async fn set_leverage(&self, _symbol: &Symbol, _leverage: u8) -> api_client::Result<()> {
        Ok(())
    }

    async fn place_order(&self, order: &OrderRequest) -> api_client::Result<NewOrderResponse> {
        self.orders.lock().unwrap().push(order.clone());
        if self.failing_orders.lock().unwrap().contains(&order.symbol) {
            return Err(api_error("Margin is insufficient."));
        }
        let avg_price = self.price_of(&order.symbol).unwrap_or_default();
        Ok(NewOrderResponse {
            order_id: self.orders.lock().unwrap().len() as i64,
            symbol: order.symbol.0.clone(),
            status: "FILLED".into(),
            side: order.side.as_str().into(),
            r#type: "MARKET".into(),
            avg_price,
            executed_qty: order.quantity,
            cum_quote: avg_price * order.quantity,
            reduce_only: order.reduce_only,
        })
    }

    async fn get_position_risk(&self) -> api_client::Result<Vec<PositionRisk>> {
        self.position_risk_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_position_risk.load(Ordering::SeqCst) {
            return Err(api_error("Timestamp for this request is outside of the recvWindow."));
        }
        Ok(self
            .positions
            .lock()
            .unwrap()
            .iter()
            .map(|p| PositionRisk {
                symbol: p.symbol.0.clone(),
                position_amt: p.amount,
                entry_price: p.entry_price,
                mark_price: p.mark_price,
                unrealized_profit: p.unrealized_pnl,
                notional: p.notional,
                leverage: p.leverage.to_string(),
                position_side: "BOTH".into(),
            })
            .collect())
    }
}

pub struct MockSignals {
    pub connected: AtomicBool,
    pub decisions: Mutex<HashMap<Symbol, TradingDecision>>,
    pub failing: Mutex<HashSet<Symbol>>,
    pub calls: Mutex<Vec<Symbol>>,
}

impl MockSignals {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            decisions: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_decision(self, decision: TradingDecision) -> Self {
        self.set_decision(decision);
        self
    }

    pub fn set_decision(&self, decision: TradingDecision) {
        self.decisions.lock().unwrap().insert(decision.symbol.clone(), decision);
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        let symbol = Symbol::from(symbol);
        self.calls.lock().unwrap().iter().filter(|s| **s == symbol).count()
    }
}

#[async_trait]
impl signals::SignalProvider for MockSignals {
    fn name(&self) -> &str {
        "mock"
    }

    async fn test_connection(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn analyze(
        &self,
        symbol: &Symbol,
        _snapshot: &MarketSnapshot,
    ) -> signals::Result<Option<TradingDecision>> {
        self.calls.lock().unwrap().push(symbol.clone());
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(signals::Error::InvalidResponse("not json".into()));
        }
        Ok(self.decisions.lock().unwrap().get(symbol).cloned())
    }
}

pub fn decision(symbol: &str, action: TradeAction, confidence: f64) -> TradingDecision {
    TradingDecision {
        symbol: Symbol::from(symbol),
        action,
        confidence,
        reasoning: "test".into(),
        technical_indicators: TechnicalIndicators {
            rsi: 50.0,
            trend: Trend::Neutral,
            support: Decimal::ZERO,
            resistance: Decimal::ZERO,
        },
        risk_assessment: RiskAssessment {
            volatility: Volatility::Medium,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            recommended_leverage: 5.0,
        },
        model_used: "mock".into(),
        timestamp: Utc::now(),
    }
}

/// A position whose pnl percent is `unrealized_pnl / |notional| × 100`.
pub fn position(symbol: &str, amount: Decimal, unrealized_pnl: Decimal, notional: Decimal) -> Position {
    Position {
        symbol: Symbol::from(symbol),
        amount,
        entry_price: dec!(100),
        mark_price: dec!(100),
        unrealized_pnl,
        notional,
        leverage: 5,
    }
}
