//! Rolling volume statistics over the most recent ticks.

use crate::core::types::TimestampUs;
use std::collections::VecDeque;

const HISTORY_CAPACITY: usize = 20;

/// Bounded history of the last 20 `(timestamp, volume)` pairs
#[derive(Debug, Clone, Default)]
pub struct VolumeWindow {
    history: VecDeque<(TimestampUs, i64)>,
}

impl VolumeWindow {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn update(&mut self, volume: i64, timestamp_us: TimestampUs) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back((timestamp_us, volume));
    }

    /// Arithmetic mean of the last `min(lookback, len)` volumes.
    ///
    /// `None` until at least two observations exist.
    pub fn average(&self, lookback: usize) -> Option<f64> {
        let len = self.history.len();
        if len < 2 {
            return None;
        }
        let count = lookback.min(len);
        let sum: i64 = self
            .history
            .iter()
            .skip(len - count)
            .map(|&(_, volume)| volume)
            .sum();
        Some(sum as f64 / count as f64)
    }

    /// Last volume divided by the 20-tick average.
    ///
    /// `None` while the window is warming up or the average is zero.
    pub fn relative(&self) -> Option<f64> {
        let average = self.average(HISTORY_CAPACITY)?;
        if average == 0.0 {
            return None;
        }
        let (_, last) = *self.history.back()?;
        Some(last as f64 / average)
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(volumes: &[i64]) -> VolumeWindow {
        let mut window = VolumeWindow::new();
        for (i, &volume) in volumes.iter().enumerate() {
            window.update(volume, i as i64);
        }
        window
    }

    #[test]
    fn average_needs_two_observations() {
        let window = window_with(&[100]);
        assert_eq!(window.average(20), None);
    }

    #[test]
    fn average_over_last_n() {
        let window = window_with(&[10, 20, 30, 40]);
        assert_eq!(window.average(2), Some(35.0));
        assert_eq!(window.average(20), Some(25.0));
    }

    #[test]
    fn history_is_bounded_at_twenty() {
        let volumes: Vec<i64> = (1..=30).collect();
        let window = window_with(&volumes);
        // Only 11..=30 remain: mean = 20.5
        assert_eq!(window.average(20), Some(20.5));
    }

    #[test]
    fn relative_volume_spike() {
        let mut volumes = vec![100; 19];
        volumes.push(5_000);
        let window = window_with(&volumes);
        // avg = (19*100 + 5000)/20 = 345
        let relative = window.relative().unwrap();
        assert!((relative - 5_000.0 / 345.0).abs() < 1e-9);
        assert!(relative >= 5.0);
    }

    #[test]
    fn relative_volume_degenerate_average_is_none() {
        let window = window_with(&[0, 0, 0]);
        assert_eq!(window.relative(), None);
    }
}
