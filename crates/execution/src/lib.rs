// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::{OrderRequest, Position};
pub mod error;
pub mod live;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use live::LiveExecutor;
pub use types::Execution;

/// The universal interface for an execution handler.
///
/// An `Executor` is responsible for taking a sized `OrderRequest` and
/// submitting it to the exchange, and for flattening tracked positions.
#[async_trait]
pub trait Executor: Send + Sync {
    /// The name of the executor (e.g., "LiveExecutor").
    fn name(&self) -> &'static str;

    /// Opens a position as described by `order_request`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Execution` details on success, or an `Error`
    /// if the order could not be placed.
    async fn open(&self, order_request: &OrderRequest) -> Result<Execution>;

    /// Flattens `position` with a reduce-only market order for its full size.
    async fn close(&self, position: &Position) -> Result<Execution>;
}
