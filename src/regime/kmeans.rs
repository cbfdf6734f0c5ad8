//! Lloyd's k-means with deterministic percentile seeding.
//!
//! Centroid 0 seeds at the 25th percentile of each feature dimension,
//! centroid 1 at the 75th. Seeding from the sorted feature distribution
//! removes all randomness, so regime labels are reproducible across runs.

use crate::regime::features::FeatureVector;

const MAX_ITERATIONS: usize = 10;
const CONVERGENCE_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct KMeans {
    centroids: Vec<FeatureVector>,
}

impl KMeans {
    pub fn new(clusters: usize) -> Self {
        Self {
            centroids: vec![FeatureVector::default(); clusters],
        }
    }

    pub fn centroids(&self) -> &[FeatureVector] {
        &self.centroids
    }

    /// Re-seed and refine centroids over the given training set.
    ///
    /// No-op on an empty set; empty clusters keep their previous centroid.
    pub fn fit(&mut self, features: &[FeatureVector]) {
        if features.is_empty() {
            return;
        }
        self.seed(features);

        for _ in 0..MAX_ITERATIONS {
            let mut sums = vec![FeatureVector::default(); self.centroids.len()];
            let mut counts = vec![0usize; self.centroids.len()];

            for feature in features {
                let nearest = self.nearest(feature);
                sums[nearest].volatility += feature.volatility;
                sums[nearest].direction += feature.direction;
                sums[nearest].volume_norm += feature.volume_norm;
                counts[nearest] += 1;
            }

            let mut converged = true;
            for (i, count) in counts.iter().enumerate() {
                if *count == 0 {
                    continue;
                }
                let n = *count as f64;
                let updated = FeatureVector {
                    volatility: sums[i].volatility / n,
                    direction: sums[i].direction / n,
                    volume_norm: sums[i].volume_norm / n,
                };
                if updated.distance(&self.centroids[i]) > CONVERGENCE_EPSILON {
                    converged = false;
                }
                self.centroids[i] = updated;
            }

            if converged {
                break;
            }
        }
    }

    /// Index of the nearest centroid; ties resolve to the lower index
    pub fn nearest(&self, feature: &FeatureVector) -> usize {
        let mut best = 0;
        let mut best_distance = f64::MAX;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let distance = feature.distance(centroid);
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }
        best
    }

    fn seed(&mut self, features: &[FeatureVector]) {
        let mut volatilities: Vec<f64> = features.iter().map(|f| f.volatility).collect();
        let mut directions: Vec<f64> = features.iter().map(|f| f.direction).collect();
        let mut volumes: Vec<f64> = features.iter().map(|f| f.volume_norm).collect();
        volatilities.sort_by(|a, b| a.total_cmp(b));
        directions.sort_by(|a, b| a.total_cmp(b));
        volumes.sort_by(|a, b| a.total_cmp(b));

        let len = features.len();
        self.centroids[0] = FeatureVector {
            volatility: volatilities[len / 4],
            direction: directions[len / 4],
            volume_norm: volumes[len / 4],
        };
        if self.centroids.len() > 1 {
            self.centroids[1] = FeatureVector {
                volatility: volatilities[3 * len / 4],
                direction: directions[3 * len / 4],
                volume_norm: volumes[3 * len / 4],
            };
        }
    }
}
