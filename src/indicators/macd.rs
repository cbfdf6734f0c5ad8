//! MACD: fast EMA minus slow EMA, smoothed by a signal EMA.
//!
//! The histogram (line minus signal) is kept in a bounded history so the
//! strategy can ask whether momentum is still widening.

use crate::indicators::ema::Ema;
use std::collections::VecDeque;

const FAST_PERIOD: usize = 12;
const SLOW_PERIOD: usize = 26;
const SIGNAL_PERIOD: usize = 9;
const HISTOGRAM_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    histogram: VecDeque<f64>,
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Macd {
    pub fn new() -> Self {
        Self {
            fast: Ema::new(FAST_PERIOD),
            slow: Ema::new(SLOW_PERIOD),
            signal: Ema::new(SIGNAL_PERIOD),
            histogram: VecDeque::with_capacity(HISTOGRAM_CAPACITY),
        }
    }

    pub fn update(&mut self, price: f64) {
        self.fast.update(price);
        self.slow.update(price);

        // Both legs are seeded by the first update, so the line is ready here.
        let line = match (self.fast.value(), self.slow.value()) {
            (Some(fast), Some(slow)) => fast - slow,
            _ => return,
        };
        self.signal.update(line);

        let histogram = line - self.signal.value().unwrap_or(line);
        if self.histogram.len() == HISTOGRAM_CAPACITY {
            self.histogram.pop_front();
        }
        self.histogram.push_back(histogram);
    }

    /// MACD line (fast EMA - slow EMA), `None` before any update
    pub fn line(&self) -> Option<f64> {
        match (self.fast.value(), self.slow.value()) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        }
    }

    /// Signal line, `None` before any update
    pub fn signal_line(&self) -> Option<f64> {
        self.signal.value()
    }

    /// Latest histogram value, `None` before any update
    pub fn histogram(&self) -> Option<f64> {
        self.histogram.back().copied()
    }

    /// True iff at least two histogram values exist and the latest strictly
    /// exceeds the one before it
    pub fn is_histogram_expanding(&self) -> bool {
        let len = self.histogram.len();
        if len < 2 {
            return false;
        }
        self.histogram[len - 1] > self.histogram[len - 2]
    }

    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
        self.histogram.clear();
    }
}
