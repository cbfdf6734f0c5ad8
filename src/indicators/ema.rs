//! Exponential moving averages, updated one price at a time.
//!
//! Recursive: `ema = alpha * price + (1 - alpha) * ema` with
//! `alpha = 2 / (period + 1)`. The first observed price seeds the EMA.

use hashbrown::HashMap;

/// Single EMA keyed by an integer period
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            value: None,
        }
    }

    pub fn update(&mut self, price: f64) {
        self.value = Some(match self.value {
            None => price,
            Some(prev) => self.alpha * price + (1.0 - self.alpha) * prev,
        });
    }

    /// Current value, `None` before the first update
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// A set of EMAs over the same price stream, keyed by period
#[derive(Debug, Clone, Default)]
pub struct EmaBank {
    emas: HashMap<usize, Ema>,
}

impl EmaBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, price: f64, period: usize) {
        self.emas
            .entry(period)
            .or_insert_with(|| Ema::new(period))
            .update(price);
    }

    /// Value for a period, `None` if that period was never updated
    pub fn value(&self, period: usize) -> Option<f64> {
        self.emas.get(&period).and_then(Ema::value)
    }

    /// True iff the EMA for this period is ready and strictly below `price`
    pub fn is_price_above(&self, price: f64, period: usize) -> bool {
        self.value(period).is_some_and(|ema| price > ema)
    }

    pub fn reset(&mut self) {
        self.emas.clear();
    }
}
