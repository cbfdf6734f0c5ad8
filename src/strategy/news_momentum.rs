//! News-catalyst momentum strategy, long only.
//!
//! Entries require a volume spike and a gap up on top of a fully aligned
//! bullish indicator stack in a TRENDING regime; exits fire on a VWAP
//! break, fading MACD momentum, or a regime flip to CHOPPY.

use crate::core::events::{FillEvent, MarketUpdateEvent, SignalEvent};
use crate::core::types::{Direction, SymbolId, Tick};
use crate::indicators::IndicatorEngine;
use crate::regime::{Regime, RegimeClassifier};
use crate::strategy::traits::{Signals, Strategy};
use smallvec::smallvec;
use std::cell::RefCell;
use std::rc::Rc;

const MICROS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000;

/// Strategy parameters
#[derive(Debug, Clone)]
pub struct NewsMomentumConfig {
    /// Minimum relative volume for the spike trigger
    pub min_relative_volume: f64,
    /// Minimum one-tick gap up, in percent
    pub min_gap_up_percent: f64,
    /// Minimum bid/ask size ratio
    pub min_bid_ask_ratio: f64,
    /// Position size before the regime multiplier
    pub base_position_size: f64,
}

impl Default for NewsMomentumConfig {
    fn default() -> Self {
        Self {
            min_relative_volume: 5.0,
            min_gap_up_percent: 10.0,
            min_bid_ask_ratio: 1.5,
            base_position_size: 100.0,
        }
    }
}

/// Long-only news momentum strategy over a single symbol.
///
/// Holds its indicator state and a shared handle to the symbol's regime
/// classifier. Never pyramids: one open position at a time.
pub struct NewsMomentumStrategy {
    symbol: SymbolId,
    config: NewsMomentumConfig,
    indicators: IndicatorEngine,
    regime: Rc<RefCell<RegimeClassifier>>,
    position: f64,
    was_long_ema_above_short: bool,
    session_day: Option<i64>,
}

impl NewsMomentumStrategy {
    pub fn new(symbol: SymbolId, regime: Rc<RefCell<RegimeClassifier>>) -> Self {
        Self::with_config(symbol, regime, NewsMomentumConfig::default())
    }

    pub fn with_config(
        symbol: SymbolId,
        regime: Rc<RefCell<RegimeClassifier>>,
        config: NewsMomentumConfig,
    ) -> Self {
        Self {
            symbol,
            config,
            indicators: IndicatorEngine::new(),
            regime,
            position: 0.0,
            was_long_ema_above_short: false,
            session_day: None,
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn has_position(&self) -> bool {
        self.position != 0.0
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn indicators(&self) -> &IndicatorEngine {
        &self.indicators
    }

    /// Fast-over-slow EMA state as of the most recent tick; feeds
    /// crossover detection
    pub fn fast_ema_above_slow(&self) -> bool {
        self.was_long_ema_above_short
    }

    fn update_indicators(&mut self, tick: &Tick) {
        self.indicators.update_price(tick.price);
        self.indicators.update_ema(tick.price, 9);
        self.indicators.update_ema(tick.price, 90);
        self.indicators.update_ema(tick.price, 200);
        self.indicators.update_macd(tick.price);
        self.indicators
            .update_vwap(tick.price, tick.volume, tick.timestamp_us);
        self.indicators.update_volume(tick.volume, tick.timestamp_us);

        if let (Some(ema_9), Some(ema_90)) = (self.indicators.ema(9), self.indicators.ema(90)) {
            self.was_long_ema_above_short = ema_9 > ema_90;
        }
    }

    // VWAP is session scoped; a UTC day boundary opens a new session.
    fn roll_session(&mut self, timestamp_us: i64) {
        let day = timestamp_us.div_euclid(MICROS_PER_DAY);
        if let Some(previous) = self.session_day {
            if day != previous {
                self.indicators.reset_vwap_session();
            }
        }
        self.session_day = Some(day);
    }

    fn check_volume_spike(&self) -> bool {
        self.indicators
            .relative_volume()
            .is_some_and(|rv| rv >= self.config.min_relative_volume)
    }

    fn check_gap_up(&self) -> bool {
        self.indicators
            .gap_up_percent()
            .is_some_and(|gap| gap >= self.config.min_gap_up_percent)
    }

    fn check_ema_trend(&self, price: f64) -> bool {
        let above_90 = self.indicators.is_price_above_ema(price, 90);
        let above_200 = self.indicators.is_price_above_ema(price, 200);
        let aligned = match (self.indicators.ema(90), self.indicators.ema(200)) {
            (Some(ema_90), Some(ema_200)) => ema_90 > ema_200,
            _ => false,
        };
        above_90 && above_200 && aligned
    }

    // Entry is allowed on the crossing tick and for as long as the fast
    // EMA stays above the slow one.
    fn check_ema_crossover(&self) -> bool {
        match (self.indicators.ema(9), self.indicators.ema(90)) {
            (Some(ema_9), Some(ema_90)) => ema_9 > ema_90,
            _ => false,
        }
    }

    fn check_order_book_imbalance(&self, tick: &Tick) -> bool {
        tick.bid_ask_ratio()
            .is_some_and(|ratio| ratio >= self.config.min_bid_ask_ratio)
    }

    fn check_entry_conditions(&self, tick: &Tick) -> bool {
        if !self.check_volume_spike() || !self.check_gap_up() {
            return false;
        }
        if !self.check_ema_trend(tick.price) || !self.check_ema_crossover() {
            return false;
        }
        if !self.indicators.is_price_above_vwap(tick.price) {
            return false;
        }
        if !self.indicators.is_macd_histogram_expanding() {
            return false;
        }
        if !self.check_order_book_imbalance(tick) {
            return false;
        }
        self.regime.borrow().current_regime() == Regime::Trending
    }

    fn check_exit_conditions(&self, tick: &Tick) -> bool {
        if !self.indicators.is_price_above_vwap(tick.price) {
            return true;
        }
        if !self.indicators.is_macd_histogram_expanding()
            && self.indicators.macd_histogram().is_some_and(|h| h < 0.0)
        {
            return true;
        }
        self.regime.borrow().current_regime() == Regime::Choppy
    }

    fn position_size(&self) -> f64 {
        self.config.base_position_size * self.regime.borrow().position_multiplier()
    }
}

impl Strategy for NewsMomentumStrategy {
    fn process_market_update(&mut self, event: &MarketUpdateEvent) -> Signals {
        let tick = &event.tick;

        self.roll_session(event.timestamp_us);
        self.regime.borrow_mut().update_and_classify(tick);
        self.update_indicators(tick);

        // Exit and entry are mutually exclusive within one tick.
        if self.has_position() {
            if self.check_exit_conditions(tick) {
                return smallvec![SignalEvent {
                    timestamp_us: event.timestamp_us,
                    symbol: self.symbol,
                    direction: Direction::Exit,
                    quantity: self.position.abs(),
                    price: tick.price,
                }];
            }
            return Signals::new();
        }

        if self.check_entry_conditions(tick) {
            let quantity = self.position_size();
            if quantity > 0.0 {
                return smallvec![SignalEvent {
                    timestamp_us: event.timestamp_us,
                    symbol: self.symbol,
                    direction: Direction::Long,
                    quantity,
                    price: tick.price,
                }];
            }
        }

        Signals::new()
    }

    fn on_fill(&mut self, fill: &FillEvent) {
        match fill.direction {
            Direction::Long => self.position += fill.quantity,
            Direction::Short => self.position -= fill.quantity,
            Direction::Exit => self.position = 0.0,
        }
    }

    fn current_regime(&self) -> Option<Regime> {
        Some(self.regime.borrow().current_regime())
    }
}
