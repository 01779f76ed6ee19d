//! Seeded k-means clustering
//!
//! k-means++ seeding followed by Lloyd iterations, repeated `n_init` times
//! from one seeded RNG. The run with the lowest inertia wins, so the same
//! seed and input always produce the same labels.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Result of a k-means fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster of each input point
    pub labels: Vec<usize>,

    /// One centroid per cluster
    pub centroids: Vec<Vec<f64>>,

    /// Sum of squared distances from each point to its centroid
    pub inertia: f64,

    /// Lloyd iterations used by the winning run
    pub iterations: usize,
}

/// k-means settings
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    seed: u64,
    tolerance: f64,
}

impl KMeans {
    /// Cluster into `n_clusters` groups with ten restarts and seed 42
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            n_init: 10,
            max_iter: 300,
            seed: 42,
            tolerance: 1e-4,
        }
    }

    /// Set the number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set the iteration cap per restart
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cluster `points`
    ///
    /// The cluster count is capped at the number of points. No points gives
    /// an empty fit.
    pub fn fit(&self, points: &[Vec<f64>]) -> KMeansFit {
        let k = self.n_clusters.clamp(1, points.len().max(1));
        if points.is_empty() {
            return KMeansFit {
                labels: Vec::new(),
                centroids: Vec::new(),
                inertia: 0.0,
                iterations: 0,
            };
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for run in 0..self.n_init {
            let centroids = plus_plus_init(points, k, &mut rng);
            let fit = self.lloyd(points, centroids);
            debug!(run, inertia = fit.inertia, iterations = fit.iterations, "k-means run");

            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.unwrap_or_else(|| self.lloyd(points, plus_plus_init(points, k, &mut rng)))
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> KMeansFit {
        let dims = points[0].len();
        let mut labels = assign(points, &centroids);
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;

            let mut sums = vec![vec![0.0; dims]; centroids.len()];
            let mut counts = vec![0usize; centroids.len()];
            for (point, &label) in points.iter().zip(&labels) {
                counts[label] += 1;
                for (s, v) in sums[label].iter_mut().zip(point) {
                    *s += v;
                }
            }

            let mut shift = 0.0;
            for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(&counts) {
                // an empty cluster keeps its previous centroid
                if *count == 0 {
                    continue;
                }
                let updated: Vec<f64> = sum.into_iter().map(|s| s / *count as f64).collect();
                shift += squared_distance(centroid, &updated);
                *centroid = updated;
            }

            let new_labels = assign(points, &centroids);
            let stable = new_labels == labels;
            labels = new_labels;
            if stable || shift <= self.tolerance * self.tolerance {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();

        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

/// Squared Euclidean distance
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid; ties go to the lowest index
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centroids).0).collect()
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the closest chosen one
fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();

        let pick = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if *w > 0.0 && target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            // float drift can walk past the end; fall back to the farthest point
            if weights[chosen] == 0.0 {
                chosen = weights
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, w)| if *w > weights[best] { i } else { best });
            }
            chosen
        } else {
            // every point coincides with a chosen centroid
            rng.gen_range(0..points.len())
        };

        centroids.push(points[pick].clone());
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let fit = KMeans::new(2).fit(&blobs());
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = KMeans::new(3).with_seed(7).fit(&blobs());
        let b = KMeans::new(3).with_seed(7).fit(&blobs());
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_capped_at_point_count() {
        let points = vec![vec![1.0], vec![2.0]];
        let fit = KMeans::new(5).fit(&points);
        assert_eq!(fit.centroids.len(), 2);
        assert_ne!(fit.labels[0], fit.labels[1]);
    }

    #[test]
    fn test_identical_points() {
        let points = vec![vec![1.0, 1.0]; 4];
        let fit = KMeans::new(2).fit(&points);
        assert_eq!(fit.labels.len(), 4);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let fit = KMeans::new(3).fit(&[]);
        assert!(fit.labels.is_empty());
        assert!(fit.centroids.is_empty());
    }

    #[test]
    fn test_squared_distance() {
        assert_eq!(squared_distance(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
