//! Feature extraction for regime classification.
//!
//! Each feature vector is 3-dimensional: return volatility, directional
//! strength, and last-volume normalised by window mean volume.

use crate::core::types::Tick;

/// Windows are `WINDOW_SIZE + 1` ticks long, endpoint inclusive
pub const WINDOW_SIZE: usize = 10;

/// One point in the 3-feature space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    pub volatility: f64,
    pub direction: f64,
    pub volume_norm: f64,
}

impl FeatureVector {
    /// Euclidean distance in feature space
    pub fn distance(&self, other: &Self) -> f64 {
        let dv = self.volatility - other.volatility;
        let dd = self.direction - other.direction;
        let dn = self.volume_norm - other.volume_norm;
        (dv * dv + dd * dd + dn * dn).sqrt()
    }

    /// Build one feature vector from a tick window
    pub fn from_window(ticks: &[Tick]) -> Self {
        Self {
            volatility: volatility(ticks),
            direction: direction(ticks),
            volume_norm: volume_norm(ticks),
        }
    }
}

/// Standard deviation of simple tick-to-tick returns, 0 with fewer than
/// two valid prices
pub fn volatility(ticks: &[Tick]) -> f64 {
    let returns = simple_returns(ticks);
    if returns.is_empty() {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / returns.len() as f64;
    variance.sqrt()
}

/// Absolute cumulative return divided by the window length.
///
/// A magnitude of directed movement, not a signed direction.
pub fn direction(ticks: &[Tick]) -> f64 {
    if ticks.len() < 2 {
        return 0.0;
    }
    let total: f64 = simple_returns(ticks).iter().sum();
    total.abs() / ticks.len() as f64
}

/// Last volume over the window's mean volume, 0 when the mean is degenerate
pub fn volume_norm(ticks: &[Tick]) -> f64 {
    let Some(last) = ticks.last() else {
        return 0.0;
    };
    normalise_volume(last.volume, ticks)
}

/// Normalise an arbitrary volume against a window's mean volume
pub fn normalise_volume(volume: i64, window: &[Tick]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: i64 = window.iter().map(|t| t.volume).sum();
    if sum <= 0 {
        return 0.0;
    }
    let mean = sum as f64 / window.len() as f64;
    volume as f64 / mean
}

fn simple_returns(ticks: &[Tick]) -> Vec<f64> {
    ticks
        .windows(2)
        .filter(|pair| pair[0].price > 0.0)
        .map(|pair| (pair[1].price - pair[0].price) / pair[0].price)
        .collect()
}

/// Slide an 11-tick window across the history; each window yields one
/// feature vector. When the history is too short for a single window, one
/// vector is derived from the entire slice.
pub fn extract_features(ticks: &[Tick]) -> Vec<FeatureVector> {
    if ticks.len() < 2 {
        return Vec::new();
    }

    let mut features: Vec<FeatureVector> = (WINDOW_SIZE..ticks.len())
        .map(|i| FeatureVector::from_window(&ticks[i - WINDOW_SIZE..=i]))
        .collect();

    if features.is_empty() {
        features.push(FeatureVector::from_window(ticks));
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks_from_prices(prices: &[f64]) -> Vec<Tick> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| Tick {
                timestamp_us: i as i64,
                price,
                volume: 100,
                bid_size: 1.0,
                ask_size: 1.0,
            })
            .collect()
    }

    #[test]
    fn volatility_of_constant_prices_is_zero() {
        let ticks = ticks_from_prices(&[10.0; 5]);
        assert_eq!(volatility(&ticks), 0.0);
    }

    #[test]
    fn volatility_of_single_tick_is_zero() {
        let ticks = ticks_from_prices(&[10.0]);
        assert_eq!(volatility(&ticks), 0.0);
    }

    #[test]
    fn direction_is_a_magnitude() {
        let up = ticks_from_prices(&[100.0, 101.0, 102.0, 103.0]);
        let down = ticks_from_prices(&[103.0, 102.0, 101.0, 100.0]);
        assert!(direction(&up) > 0.0);
        assert!(direction(&down) > 0.0);
    }

    #[test]
    fn constant_growth_has_zero_volatility_but_nonzero_direction() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let ticks = ticks_from_prices(&prices);
        assert!(volatility(&ticks) < 1e-9);
        assert!(direction(&ticks) > 0.0);
    }

    #[test]
    fn volume_norm_of_uniform_volumes_is_one() {
        let ticks = ticks_from_prices(&[10.0, 11.0, 12.0]);
        assert!((volume_norm(&ticks) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn volume_norm_degenerate_sum_is_zero() {
        let mut ticks = ticks_from_prices(&[10.0, 11.0]);
        for tick in &mut ticks {
            tick.volume = 0;
        }
        assert_eq!(volume_norm(&ticks), 0.0);
    }

    #[test]
    fn short_history_yields_single_feature() {
        let ticks = ticks_from_prices(&[10.0, 11.0, 12.0, 13.0]);
        let features = extract_features(&ticks);
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn window_count_matches_history_length() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let ticks = ticks_from_prices(&prices);
        let features = extract_features(&ticks);
        // One window per position in [10, 29]
        assert_eq!(features.len(), 20);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = FeatureVector {
            volatility: 0.0,
            direction: 0.0,
            volume_norm: 0.0,
        };
        let b = FeatureVector {
            volatility: 3.0,
            direction: 4.0,
            volume_norm: 0.0,
        };
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }
}
