//! Market regime classification over a rolling tick window.
//!
//! A k-means model over (volatility, direction, volume) features labels
//! the market CHOPPY or TRENDING at every tick. The label gates strategy
//! entries and scales position size.

pub mod features;
pub mod kmeans;

pub use features::{FeatureVector, WINDOW_SIZE};
pub use kmeans::KMeans;

use crate::core::types::Tick;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Ticks required in the window before classification is attempted;
/// below this the regime is forced to CHOPPY
pub const WARMUP_TICKS: usize = 20;

/// Feature thresholds that promote a cluster-0 assignment to TRENDING
const VOLATILITY_OVERRIDE: f64 = 0.02;
const DIRECTION_OVERRIDE: f64 = 0.01;

/// Categorical market state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Mean-reverting, low directed volatility
    Choppy,
    /// Directed high volatility
    Trending,
}

impl Regime {
    /// Position-size multiplier applied by strategies.
    ///
    /// CHOPPY disables new entries outright.
    pub fn position_multiplier(&self) -> f64 {
        match self {
            Self::Choppy => 0.0,
            Self::Trending => 1.5,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choppy => write!(f, "CHOPPY"),
            Self::Trending => write!(f, "TRENDING"),
        }
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHOPPY" => Ok(Self::Choppy),
            "TRENDING" => Ok(Self::Trending),
            other => Err(format!("unknown regime label: {other}")),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone)]
pub struct RegimeConfig {
    /// Rolling tick window capacity
    pub lookback: usize,
    /// Number of k-means clusters
    pub clusters: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            lookback: 100,
            clusters: 2,
        }
    }
}

/// Online regime classifier: rolling tick window, per-tick k-means refit,
/// and nearest-centroid labelling of the current market state.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    config: RegimeConfig,
    tick_history: VecDeque<Tick>,
    kmeans: KMeans,
    current_regime: Regime,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self::new(RegimeConfig::default())
    }
}

impl RegimeClassifier {
    pub fn new(config: RegimeConfig) -> Self {
        let kmeans = KMeans::new(config.clusters);
        let tick_history = VecDeque::with_capacity(config.lookback);
        Self {
            config,
            tick_history,
            kmeans,
            current_regime: Regime::Choppy,
        }
    }

    /// Absorb one tick and return the updated regime label
    pub fn update_and_classify(&mut self, tick: &Tick) -> Regime {
        if self.tick_history.len() == self.config.lookback {
            self.tick_history.pop_front();
        }
        self.tick_history.push_back(*tick);

        if self.tick_history.len() < WARMUP_TICKS {
            self.current_regime = Regime::Choppy;
            return self.current_regime;
        }

        let window: &[Tick] = self.tick_history.make_contiguous();
        let training = features::extract_features(window);
        self.kmeans.fit(&training);

        let current = FeatureVector {
            volatility: features::volatility(window),
            direction: features::direction(window),
            volume_norm: features::normalise_volume(tick.volume, window),
        };

        self.current_regime = Self::label(self.kmeans.nearest(&current), &current);
        self.current_regime
    }

    pub fn current_regime(&self) -> Regime {
        self.current_regime
    }

    pub fn position_multiplier(&self) -> f64 {
        self.current_regime.position_multiplier()
    }

    /// Number of ticks currently held in the rolling window
    pub fn tick_count(&self) -> usize {
        self.tick_history.len()
    }

    // Cluster 1 is the high-percentile seed and maps straight to TRENDING.
    // Cluster 0 still counts as TRENDING when the current feature shows
    // strong directed volatility.
    fn label(cluster: usize, current: &FeatureVector) -> Regime {
        if cluster == 1 {
            Regime::Trending
        } else if current.volatility > VOLATILITY_OVERRIDE && current.direction > DIRECTION_OVERRIDE
        {
            Regime::Trending
        } else {
            Regime::Choppy
        }
    }
}
