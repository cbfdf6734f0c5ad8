//! Tick-to-tick price tracking for the gap-up trigger.

/// Tracks the current and immediately preceding tick price.
///
/// `prev_close` here is the previous *tick* price, not a session close;
/// the gap-up percentage is therefore a one-tick jump measure.
#[derive(Debug, Clone)]
pub struct PriceTracker {
    prev_close: f64,
    current_price: f64,
    open_price: f64,
    is_first_tick: bool,
}

impl Default for PriceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceTracker {
    pub fn new() -> Self {
        Self {
            prev_close: 0.0,
            current_price: 0.0,
            open_price: 0.0,
            is_first_tick: true,
        }
    }

    pub fn update(&mut self, price: f64) {
        if self.is_first_tick {
            self.prev_close = price;
            self.open_price = price;
            self.is_first_tick = false;
        } else {
            self.prev_close = self.current_price;
        }
        self.current_price = price;
    }

    /// Percentage change from the previous tick price.
    ///
    /// `None` before the first update or when the previous price is zero.
    pub fn gap_up_percent(&self) -> Option<f64> {
        if self.is_first_tick || self.prev_close == 0.0 {
            return None;
        }
        Some((self.current_price - self.prev_close) / self.prev_close * 100.0)
    }

    pub fn current_price(&self) -> Option<f64> {
        if self.is_first_tick {
            None
        } else {
            Some(self.current_price)
        }
    }

    /// First price seen since construction or reset
    pub fn open_price(&self) -> Option<f64> {
        if self.is_first_tick {
            None
        } else {
            Some(self.open_price)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
