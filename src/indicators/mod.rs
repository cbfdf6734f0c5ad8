//! Online indicator engine.
//!
//! Every indicator is updated strictly in tick order and never looks at
//! future data. Accessors return `None` while an indicator is warming up
//! or a denominator is degenerate; predicates treat `None` as false.

pub mod ema;
pub mod macd;
pub mod price;
pub mod volume;
pub mod vwap;

pub use ema::{Ema, EmaBank};
pub use macd::Macd;
pub use price::PriceTracker;
pub use volume::VolumeWindow;
pub use vwap::Vwap;

use crate::core::types::TimestampUs;

/// Per-symbol indicator state: EMAs by period, MACD, session VWAP,
/// rolling volume, and tick-to-tick price tracking.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    emas: EmaBank,
    macd: Macd,
    vwap: Vwap,
    volume: VolumeWindow,
    price: PriceTracker,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_price(&mut self, price: f64) {
        self.price.update(price);
    }

    pub fn update_ema(&mut self, price: f64, period: usize) {
        self.emas.update(price, period);
    }

    pub fn update_macd(&mut self, price: f64) {
        self.macd.update(price);
    }

    pub fn update_vwap(&mut self, price: f64, volume: i64, timestamp_us: TimestampUs) {
        self.vwap.update(price, volume, timestamp_us);
    }

    pub fn update_volume(&mut self, volume: i64, timestamp_us: TimestampUs) {
        self.volume.update(volume, timestamp_us);
    }

    pub fn ema(&self, period: usize) -> Option<f64> {
        self.emas.value(period)
    }

    pub fn is_price_above_ema(&self, price: f64, period: usize) -> bool {
        self.emas.is_price_above(price, period)
    }

    pub fn macd_line(&self) -> Option<f64> {
        self.macd.line()
    }

    pub fn macd_signal_line(&self) -> Option<f64> {
        self.macd.signal_line()
    }

    pub fn macd_histogram(&self) -> Option<f64> {
        self.macd.histogram()
    }

    pub fn is_macd_histogram_expanding(&self) -> bool {
        self.macd.is_histogram_expanding()
    }

    pub fn vwap(&self) -> Option<f64> {
        self.vwap.value()
    }

    pub fn is_price_above_vwap(&self, price: f64) -> bool {
        self.vwap.is_price_above(price)
    }

    /// Start a new VWAP session; the caller decides the boundary
    pub fn reset_vwap_session(&mut self) {
        self.vwap.reset();
    }

    pub fn average_volume(&self, lookback: usize) -> Option<f64> {
        self.volume.average(lookback)
    }

    pub fn relative_volume(&self) -> Option<f64> {
        self.volume.relative()
    }

    pub fn gap_up_percent(&self) -> Option<f64> {
        self.price.gap_up_percent()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.price.current_price()
    }

    /// Clear all indicator state, e.g. before reusing the engine for a
    /// different symbol
    pub fn reset(&mut self) {
        self.emas.reset();
        self.macd.reset();
        self.vwap.reset();
        self.volume.reset();
        self.price.reset();
    }
}
