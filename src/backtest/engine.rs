//! Priority-queue event loop: latency modelling, fill synthesis, and
//! position bookkeeping.
//!
//! Events are dispatched in timestamp order; a monotonic sequence number
//! breaks ties so that equal-timestamp events drain FIFO. This secondary
//! key is what makes runs bit-for-bit reproducible.

use crate::backtest::position::{PositionBook, TradeRecord};
use crate::backtest::BacktestConfig;
use crate::core::events::{Event, FillEvent, MarketUpdateEvent, OrderEvent, SignalEvent};
use crate::core::types::{SymbolId, Tick, TimestampUs};
use crate::market_data::{loader, LoadError};
use crate::regime::Regime;
use crate::strategy::Strategy;
use hashbrown::HashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Heap entry: timestamp-ordered with FIFO tie-breaking
#[derive(Debug)]
struct QueuedEvent {
    event: Event,
    timestamp_us: TimestampUs,
    seq: u64,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp_us == other.timestamp_us && self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the earliest timestamp wins,
        // then the lowest sequence number among equal timestamps
        other
            .timestamp_us
            .cmp(&self.timestamp_us)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Event-driven backtester over historical tick streams.
///
/// Owns the event queue, per-symbol tick arrays, the position book, and
/// the trade log. Strategies are registered per symbol and driven through
/// market updates; their signals are promoted to orders, latency-shifted,
/// and materialised as fills.
pub struct Backtester {
    config: BacktestConfig,
    queue: BinaryHeap<QueuedEvent>,
    next_seq: u64,
    symbols: Vec<String>,
    tick_data: HashMap<SymbolId, Vec<Tick>>,
    strategies: HashMap<SymbolId, Box<dyn Strategy>>,
    positions: PositionBook,
    trade_log: Vec<TradeRecord>,
    current_time_us: TimestampUs,
    events_processed: u64,
}

impl Default for Backtester {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            queue: BinaryHeap::new(),
            next_seq: 0,
            symbols: Vec::new(),
            tick_data: HashMap::new(),
            strategies: HashMap::new(),
            positions: PositionBook::new(),
            trade_log: Vec::new(),
            current_time_us: 0,
            events_processed: 0,
        }
    }

    /// Intern a symbol name, returning its id
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.symbols.iter().position(|s| s == name) {
            return id as SymbolId;
        }
        self.symbols.push(name.to_string());
        (self.symbols.len() - 1) as SymbolId
    }

    /// Resolve a symbol id back to its name
    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.symbols
            .get(symbol as usize)
            .map_or("<unknown>", String::as_str)
    }

    /// Load a CSV tick file for a named symbol and enqueue its market
    /// updates. Fails on unreadable or malformed input, or when the file
    /// holds no data rows.
    pub fn load_tick_data(&mut self, path: &Path, symbol: &str) -> Result<usize, LoadError> {
        let ticks = loader::load_ticks_csv(path)?;
        if ticks.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        let count = ticks.len();
        self.load_ticks(symbol, ticks);
        info!(count, symbol, path = %path.display(), "loaded tick data");
        Ok(count)
    }

    /// Load an in-memory tick stream for a named symbol
    pub fn load_ticks(&mut self, symbol: &str, ticks: Vec<Tick>) {
        let id = self.intern_symbol(symbol);
        for tick in &ticks {
            self.push_event(Event::MarketUpdate(MarketUpdateEvent {
                timestamp_us: tick.timestamp_us,
                symbol: id,
                tick: *tick,
            }));
        }
        self.tick_data.insert(id, ticks);
    }

    /// Register the strategy that trades a symbol
    pub fn register_strategy(&mut self, symbol: &str, strategy: Box<dyn Strategy>) {
        let id = self.intern_symbol(symbol);
        self.strategies.insert(id, strategy);
    }

    /// Drain the event queue, then force-close any leftover positions at
    /// the last known tick price of their symbol
    pub fn run(&mut self) {
        info!(
            latency_ms = self.config.latency_ms,
            queued = self.queue.len(),
            "starting backtest"
        );
        let started = Instant::now();

        while let Some(queued) = self.queue.pop() {
            self.current_time_us = queued.timestamp_us;
            self.dispatch(queued.event);

            self.events_processed += 1;
            if self.events_processed % self.config.progress_interval == 0 {
                info!(events = self.events_processed, "processing events");
            }
        }

        self.close_remaining_positions();

        info!(
            events = self.events_processed,
            trades = self.trade_log.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backtest complete"
        );
    }

    /// Sum of PnL over the trade log
    pub fn total_pnl(&self) -> f64 {
        self.trade_log.iter().map(|t| t.pnl).sum()
    }

    pub fn num_trades(&self) -> usize {
        self.trade_log.len()
    }

    pub fn trade_log(&self) -> &[TradeRecord] {
        &self.trade_log
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Timestamp of the most recently dispatched event
    pub fn current_time_us(&self) -> TimestampUs {
        self.current_time_us
    }

    fn push_event(&mut self, event: Event) {
        let timestamp_us = event.timestamp_us();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(QueuedEvent {
            event,
            timestamp_us,
            seq,
        });
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::MarketUpdate(update) => self.on_market_update(update),
            Event::Signal(signal) => self.on_signal(signal),
            Event::Order(order) => self.on_order(order),
            Event::Fill(fill) => self.on_fill(fill),
        }
    }

    fn on_market_update(&mut self, update: MarketUpdateEvent) {
        let Some(strategy) = self.strategies.get_mut(&update.symbol) else {
            debug!(symbol = update.symbol, "market update for unregistered symbol dropped");
            return;
        };
        let signals = strategy.process_market_update(&update);
        for signal in signals {
            self.push_event(Event::Signal(signal));
        }
    }

    fn on_signal(&mut self, signal: SignalEvent) {
        self.push_event(Event::Order(OrderEvent::from_signal(&signal)));
    }

    fn on_order(&mut self, order: OrderEvent) {
        let latency_us = (self.config.latency_ms * 1_000.0) as TimestampUs;
        let fill_timestamp_us = order.timestamp_us + latency_us;
        let fill_price = self.fill_price_at(order.symbol, fill_timestamp_us, order.price);
        let commission = fill_price * order.quantity * self.config.commission_rate;

        self.push_event(Event::Fill(FillEvent {
            timestamp_us: fill_timestamp_us,
            symbol: order.symbol,
            direction: order.direction,
            quantity: order.quantity,
            fill_price,
            commission,
        }));
    }

    fn on_fill(&mut self, fill: FillEvent) {
        let entry_regime = self
            .strategies
            .get(&fill.symbol)
            .and_then(|s| s.current_regime())
            .unwrap_or(Regime::Choppy);

        let symbol_name = self
            .symbols
            .get(fill.symbol as usize)
            .cloned()
            .unwrap_or_default();
        if let Some(trade) = self.positions.apply_fill(&fill, entry_regime, &symbol_name) {
            self.record_trade(trade);
        }

        if let Some(strategy) = self.strategies.get_mut(&fill.symbol) {
            strategy.on_fill(&fill);
        }
    }

    /// Price of the first tick at or after `timestamp_us`, falling back to
    /// the order price when the stream has no later tick
    fn fill_price_at(&self, symbol: SymbolId, timestamp_us: TimestampUs, fallback: f64) -> f64 {
        let Some(ticks) = self.tick_data.get(&symbol) else {
            return fallback;
        };
        let index = ticks.partition_point(|t| t.timestamp_us < timestamp_us);
        ticks.get(index).map_or(fallback, |t| t.price)
    }

    fn close_remaining_positions(&mut self) {
        for symbol in self.positions.open_symbols() {
            let Some(last_tick) = self.tick_data.get(&symbol).and_then(|t| t.last()) else {
                continue;
            };
            let symbol_name = self
                .symbols
                .get(symbol as usize)
                .cloned()
                .unwrap_or_default();
            if let Some(trade) = self.positions.close(
                symbol,
                last_tick.price,
                last_tick.timestamp_us,
                0.0,
                &symbol_name,
            ) {
                debug!(symbol = %symbol_name, "force-closing position at end of stream");
                self.record_trade(trade);
            }
        }
    }

    fn record_trade(&mut self, mut trade: TradeRecord) {
        if self.config.net_of_commission {
            trade.pnl -= trade.commission;
        }
        self.trade_log.push(trade);
    }
}
