//! Session-scoped volume-weighted average price.

use crate::core::types::TimestampUs;

/// Running `sum(price * volume) / sum(volume)` within one session.
///
/// The session opens on the first update after construction or
/// [`Vwap::reset`]; the caller decides where session boundaries fall.
#[derive(Debug, Clone, Default)]
pub struct Vwap {
    cum_px_vol: f64,
    cum_vol: i64,
    session_start_us: Option<TimestampUs>,
}

impl Vwap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, price: f64, volume: i64, timestamp_us: TimestampUs) {
        if self.session_start_us.is_none() {
            self.session_start_us = Some(timestamp_us);
        }
        self.cum_px_vol += price * volume as f64;
        self.cum_vol += volume;
    }

    /// Current VWAP, `None` until positive volume has accumulated
    pub fn value(&self) -> Option<f64> {
        if self.cum_vol > 0 {
            Some(self.cum_px_vol / self.cum_vol as f64)
        } else {
            None
        }
    }

    /// True iff VWAP is ready and strictly below `price`
    pub fn is_price_above(&self, price: f64) -> bool {
        self.value().is_some_and(|vwap| price > vwap)
    }

    /// Timestamp of the first update in the current session
    pub fn session_start_us(&self) -> Option<TimestampUs> {
        self.session_start_us
    }

    /// Zero the accumulators; the next update opens a new session
    pub fn reset(&mut self) {
        self.cum_px_vol = 0.0;
        self.cum_vol = 0;
        self.session_start_us = None;
    }
}
