//! Event types that flow through the simulator

use crate::core::types::{Direction, SymbolId, Tick, TimestampUs};

/// Events that flow through the backtesting system
#[derive(Debug, Clone)]
pub enum Event {
    /// A market tick replayed from history
    MarketUpdate(MarketUpdateEvent),
    /// A strategy decision
    Signal(SignalEvent),
    /// An order submitted to the simulated venue
    Order(OrderEvent),
    /// A synthetic execution after latency
    Fill(FillEvent),
}

impl Event {
    /// Event timestamp in microseconds
    pub fn timestamp_us(&self) -> TimestampUs {
        match self {
            Self::MarketUpdate(e) => e.timestamp_us,
            Self::Signal(e) => e.timestamp_us,
            Self::Order(e) => e.timestamp_us,
            Self::Fill(e) => e.timestamp_us,
        }
    }
}

/// Market data event carrying one tick
#[derive(Debug, Clone, Copy)]
pub struct MarketUpdateEvent {
    pub timestamp_us: TimestampUs,
    pub symbol: SymbolId,
    pub tick: Tick,
}

/// Strategy decision event
#[derive(Debug, Clone, Copy)]
pub struct SignalEvent {
    pub timestamp_us: TimestampUs,
    pub symbol: SymbolId,
    pub direction: Direction,
    pub quantity: f64,
    pub price: f64,
}

/// Order submission event
#[derive(Debug, Clone, Copy)]
pub struct OrderEvent {
    pub timestamp_us: TimestampUs,
    pub symbol: SymbolId,
    pub direction: Direction,
    pub quantity: f64,
    pub price: f64,
}

impl OrderEvent {
    /// Promote a signal to an order, preserving its payload
    pub fn from_signal(signal: &SignalEvent) -> Self {
        Self {
            timestamp_us: signal.timestamp_us,
            symbol: signal.symbol,
            direction: signal.direction,
            quantity: signal.quantity,
            price: signal.price,
        }
    }
}

/// Synthetic execution event
#[derive(Debug, Clone, Copy)]
pub struct FillEvent {
    pub timestamp_us: TimestampUs,
    pub symbol: SymbolId,
    pub direction: Direction,
    pub quantity: f64,
    pub fill_price: f64,
    pub commission: f64,
}
