// In crates/engine/src/position_store.rs

use core_types::{Position, Symbol};
use std::collections::HashMap;

/// The locally tracked open positions, keyed by symbol.
///
/// Only non-zero positions are ever stored. The exchange is the source of truth; the
/// store is rebuilt wholesale at the start of every cycle.
#[derive(Debug, Default, Clone)]
pub struct PositionStore {
    positions: HashMap<Symbol, Position>,
}

impl PositionStore {
    /// Replaces the whole contents, dropping any flat entries.
    pub fn replace(&mut self, positions: impl IntoIterator<Item = Position>) {
        self.positions = positions
            .into_iter()
            .filter(|p| !p.amount.is_zero())
            .map(|p| (p.symbol.clone(), p))
            .collect();
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn all(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<Position> {
        self.positions.remove(symbol)
    }
}
