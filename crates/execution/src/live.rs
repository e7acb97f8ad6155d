// In crates/execution/src/live.rs
use crate::{Error, Execution, Executor, Result};
use api_client::{Exchange, NewOrderResponse};
use async_trait::async_trait;
use core_types::{OrderRequest, Position};
use risk::simple_manager::round_quantity;
use rust_decimal::Decimal;
use std::sync::Arc;

/// An executor that places real orders on the Binance exchange.
///
/// This executor interacts directly with an `Exchange` to send signed
/// requests for setting leverage and placing market orders.
#[derive(Clone)]
pub struct LiveExecutor {
    /// The exchange the orders are routed to.
    exchange: Arc<dyn Exchange>,
}

impl LiveExecutor {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    async fn submit(&self, order_request: &OrderRequest) -> Result<Execution> {
        let order_response = match self.exchange.place_order(order_request).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(symbol = %order_request.symbol, error = %e, "Failed to place market order.");
                return Err(Error::ExecutionFailed { reason: format!("Failed to place order: {}", e) });
            }
        };
        tracing::info!(?order_response, "Market order accepted.");

        Ok(to_execution(order_request, order_response))
    }
}

fn to_execution(order_request: &OrderRequest, response: NewOrderResponse) -> Execution {
    Execution {
        order_id: response.order_id,
        symbol: order_request.symbol.clone(),
        side: order_request.side,
        avg_price: response.avg_price,
        executed_qty: response.executed_qty,
        status: response.status,
        source_request: order_request.clone(),
    }
}

#[async_trait]
impl Executor for LiveExecutor {
    fn name(&self) -> &'static str {
        "LiveExecutor"
    }

    async fn open(&self, order_request: &OrderRequest) -> Result<Execution> {
        tracing::info!(?order_request, "Executing live order request...");

        // --- Step 1: Set Leverage ---
        // A failure here is not fatal; the order goes out at whatever leverage the symbol has.
        match self
            .exchange
            .set_leverage(&order_request.symbol, order_request.leverage)
            .await
        {
            Ok(()) => tracing::info!(symbol = %order_request.symbol, leverage = order_request.leverage, "Leverage set."),
            Err(e) => tracing::error!(symbol = %order_request.symbol, error = %e, "Failed to set leverage."),
        }

        // --- Step 2: Place the Market Order ---
        self.submit(order_request).await
    }

    async fn close(&self, position: &Position) -> Result<Execution> {
        let quantity = round_quantity(position.size());
        if quantity <= Decimal::ZERO {
            return Err(Error::ExecutionFailed {
                reason: format!("Position {} is too small to close ({})", position.symbol, position.amount),
            });
        }

        let order_request = OrderRequest {
            symbol: position.symbol.clone(),
            side: position.side().exit_order_side(),
            quantity,
            leverage: position.leverage,
            reduce_only: true,
        };
        tracing::info!(symbol = %position.symbol, side = ?order_request.side, %quantity, "Closing position.");

        self.submit(&order_request).await
    }
}
