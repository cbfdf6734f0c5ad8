use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol identifier, interned by the simulator
pub type SymbolId = u32;

/// Microseconds since the Unix epoch
pub type TimestampUs = i64;

/// Direction of a signal, order, or fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
    Exit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
            Self::Exit => write!(f, "EXIT"),
        }
    }
}

/// A single market tick: point-in-time price, traded volume, and top-of-book sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Microseconds since epoch, non-decreasing per symbol
    pub timestamp_us: TimestampUs,
    /// Last traded price, > 0
    pub price: f64,
    /// Volume traded at this tick
    pub volume: i64,
    /// Size resting at the best bid
    pub bid_size: f64,
    /// Size resting at the best ask
    pub ask_size: f64,
}

impl Tick {
    /// Ratio of bid size to ask size, `None` when the ask side is empty
    pub fn bid_ask_ratio(&self) -> Option<f64> {
        if self.ask_size == 0.0 {
            None
        } else {
            Some(self.bid_size / self.ask_size)
        }
    }
}
