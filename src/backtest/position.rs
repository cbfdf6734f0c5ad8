//! Position tracking and round-trip trade extraction.

use crate::core::events::FillEvent;
use crate::core::types::{Direction, SymbolId, TimestampUs};
use crate::regime::Regime;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One open position in a symbol
#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: SymbolId,
    /// Signed quantity; zero means no open position
    pub quantity: f64,
    pub avg_price: f64,
    pub direction: Direction,
    pub entry_timestamp_us: TimestampUs,
    /// Regime label at the time the position was opened
    pub entry_regime: Regime,
    /// Commission accumulated on entry fills
    pub entry_commission: f64,
}

impl Position {
    fn open(fill: &FillEvent, entry_regime: Regime) -> Self {
        Self {
            symbol: fill.symbol,
            quantity: fill.quantity,
            avg_price: fill.fill_price,
            direction: fill.direction,
            entry_timestamp_us: fill.timestamp_us,
            entry_regime,
            entry_commission: fill.commission,
        }
    }

    /// Weighted-average add to an existing position
    fn add(&mut self, fill: &FillEvent) {
        let total_cost = self.avg_price * self.quantity + fill.fill_price * fill.quantity;
        self.quantity += fill.quantity;
        self.avg_price = total_cost / self.quantity;
        self.entry_commission += fill.commission;
    }
}

/// A closed round trip, append-only in the trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_timestamp_us: TimestampUs,
    pub exit_timestamp_us: TimestampUs,
    pub symbol: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub regime: Regime,
    /// Commission across entry and exit fills; informational unless
    /// net-of-commission accounting is enabled
    #[serde(default)]
    pub commission: f64,
}

/// Per-symbol position book.
///
/// Applies fills, extracts a [`TradeRecord`] whenever a position is
/// closed, and force-closes leftovers at end of stream.
#[derive(Debug, Default)]
pub struct PositionBook {
    positions: HashMap<SymbolId, Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: SymbolId) -> Option<&Position> {
        self.positions.get(&symbol)
    }

    pub fn has_open_position(&self, symbol: SymbolId) -> bool {
        self.positions
            .get(&symbol)
            .is_some_and(|p| p.quantity != 0.0)
    }

    /// Symbols with a non-zero position, in ascending id order
    pub fn open_symbols(&self) -> Vec<SymbolId> {
        let mut symbols: Vec<SymbolId> = self
            .positions
            .iter()
            .filter(|(_, p)| p.quantity != 0.0)
            .map(|(&symbol, _)| symbol)
            .collect();
        symbols.sort_unstable();
        symbols
    }

    /// Apply a fill; returns a trade record when the fill closes a position.
    ///
    /// `entry_regime` is stamped on positions this fill opens. Exit fills
    /// against a flat book are dropped.
    pub fn apply_fill(
        &mut self,
        fill: &FillEvent,
        entry_regime: Regime,
        symbol_name: &str,
    ) -> Option<TradeRecord> {
        match fill.direction {
            Direction::Exit => self.close(
                fill.symbol,
                fill.fill_price,
                fill.timestamp_us,
                fill.commission,
                symbol_name,
            ),
            Direction::Long | Direction::Short => {
                // Closed positions are removed from the map, so an occupied
                // entry is always a live position being added to.
                match self.positions.entry(fill.symbol) {
                    Entry::Occupied(mut entry) => entry.get_mut().add(fill),
                    Entry::Vacant(entry) => {
                        entry.insert(Position::open(fill, entry_regime));
                    }
                }
                None
            }
        }
    }

    /// Close the symbol's position at the given price, if one is open
    pub fn close(
        &mut self,
        symbol: SymbolId,
        exit_price: f64,
        timestamp_us: TimestampUs,
        exit_commission: f64,
        symbol_name: &str,
    ) -> Option<TradeRecord> {
        let position = self.positions.get_mut(&symbol)?;
        if position.quantity == 0.0 {
            return None;
        }

        let pnl = match position.direction {
            Direction::Short => (position.avg_price - exit_price) * position.quantity,
            _ => (exit_price - position.avg_price) * position.quantity,
        };

        let trade = TradeRecord {
            entry_timestamp_us: position.entry_timestamp_us,
            exit_timestamp_us: timestamp_us,
            symbol: symbol_name.to_string(),
            entry_price: position.avg_price,
            exit_price,
            quantity: position.quantity,
            pnl,
            regime: position.entry_regime,
            commission: position.entry_commission + exit_commission,
        };

        self.positions.remove(&symbol);
        Some(trade)
    }

    /// Total commission paid on the open position, if any
    pub fn entry_commission(&self, symbol: SymbolId) -> f64 {
        self.positions
            .get(&symbol)
            .map_or(0.0, |p| p.entry_commission)
    }
}
