//! Clustering of canvas points.
//!
//! [`ClusterRoutine`] is the seam the canvas calls through; [`KMeans`] is the
//! stock implementation (seeded k-means++ with restarts, Lloyd iterations).

use kurbo::Point;
use std::fmt;
use thiserror::Error;

/// Clustering errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("Cannot form zero clusters")]
    ZeroClusters,
    #[error("Need at least {k} points, have {points}")]
    NotEnoughPoints { k: usize, points: usize },
    #[error("Point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("Malformed clustering result: {0}")]
    MalformedResult(String),
}

/// Raw output of a clustering routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster label per input point, in input order.
    pub labels: Vec<usize>,
    pub centroids: Vec<Point>,
}

/// Partitions points into `k` groups.
pub trait ClusterRoutine: fmt::Debug {
    fn cluster(&self, points: &[Point], k: usize) -> Result<Clustering, ClusterError>;
}

/// Validated clustering of the current point set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    labels: Vec<usize>,
    centroids: Vec<Point>,
}

impl ClusterResult {
    /// Check a routine's output against the point count and `k`.
    pub fn from_clustering(clustering: Clustering, points: usize, k: usize) -> Result<Self, ClusterError> {
        let Clustering { labels, centroids } = clustering;
        if centroids.len() != k {
            return Err(ClusterError::MalformedResult(format!(
                "expected {} centroids, got {}",
                k,
                centroids.len()
            )));
        }
        if labels.len() != points {
            return Err(ClusterError::MalformedResult(format!(
                "expected {} labels, got {}",
                points,
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&label| label >= k) {
            return Err(ClusterError::MalformedResult(format!("label {} out of range", bad)));
        }
        Ok(Self { labels, centroids })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of points per cluster.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.k()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Indices of the points labelled `label`, in insertion order.
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Xorshift generator so restarts are reproducible.
struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random float in [0, 1).
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    fn index(&mut self, len: usize) -> usize {
        self.next_u32() as usize % len
    }
}

/// Lloyd's k-means with k-means++ seeding.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Independent seedings; the lowest-inertia run wins.
    pub restarts: usize,
    pub max_iterations: usize,
    /// Convergence threshold relative to the data variance.
    pub tolerance: f64,
    pub seed: u32,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 0x5EED_CAFE,
        }
    }
}

struct Run {
    labels: Vec<usize>,
    centroids: Vec<Point>,
    inertia: f64,
}

fn nearest(point: Point, centroids: &[Point]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (point - *c).hypot2()))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

fn variance(points: &[Point]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().fold(Point::ZERO, |acc, p| acc + p.to_vec2()).to_vec2() / n;
    let sum: f64 = points.iter().map(|p| (p.to_vec2() - mean).hypot2()).sum();
    sum / n / 2.0
}

impl KMeans {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    fn seed_centroids(points: &[Point], k: usize, rng: &mut SimpleRng) -> Vec<Point> {
        let mut centroids = Vec::with_capacity(k);
        centroids.push(points[rng.index(points.len())]);

        let mut min_distances: Vec<f64> = points
            .iter()
            .map(|p| (*p - centroids[0]).hypot2())
            .collect();

        while centroids.len() < k {
            let total: f64 = min_distances.iter().sum();
            let next = if total > 0.0 {
                let target = rng.next_f64() * total;
                let mut acc = 0.0;
                min_distances
                    .iter()
                    .position(|d| {
                        acc += d;
                        acc > target
                    })
                    .unwrap_or(points.len() - 1)
            } else {
                // Every point coincides with a centroid.
                rng.index(points.len())
            };
            let centroid = points[next];
            centroids.push(centroid);
            for (d, p) in min_distances.iter_mut().zip(points) {
                *d = d.min((*p - centroid).hypot2());
            }
        }
        centroids
    }

    fn run(&self, points: &[Point], k: usize, tol: f64, rng: &mut SimpleRng) -> Run {
        let mut centroids = Self::seed_centroids(points, k, rng);
        let mut labels = vec![0; points.len()];

        for _ in 0..self.max_iterations {
            for (label, p) in labels.iter_mut().zip(points) {
                *label = nearest(*p, &centroids).0;
            }

            let mut sums = vec![Point::ZERO; k];
            let mut counts = vec![0usize; k];
            for (&label, p) in labels.iter().zip(points) {
                sums[label] += p.to_vec2();
                counts[label] += 1;
            }

            let mut updated: Vec<Point> = sums
                .iter()
                .zip(&counts)
                .zip(&centroids)
                .map(|((sum, &count), old)| {
                    if count > 0 {
                        (sum.to_vec2() / count as f64).to_point()
                    } else {
                        *old
                    }
                })
                .collect();

            // Move empty clusters onto the points worst served by their centroid.
            let empty: Vec<usize> = (0..k).filter(|&c| counts[c] == 0).collect();
            if !empty.is_empty() {
                let mut by_distance: Vec<usize> = (0..points.len()).collect();
                by_distance.sort_by(|&a, &b| {
                    let da = (points[a] - updated[labels[a]]).hypot2();
                    let db = (points[b] - updated[labels[b]]).hypot2();
                    db.total_cmp(&da)
                });
                for (cluster, &index) in empty.iter().zip(&by_distance) {
                    updated[*cluster] = points[index];
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| (*a - *b).hypot2())
                .sum();
            centroids = updated;
            if shift <= tol && empty.is_empty() {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, p) in labels.iter_mut().zip(points) {
            let (best, dist) = nearest(*p, &centroids);
            *label = best;
            inertia += dist;
        }

        Run {
            labels,
            centroids,
            inertia,
        }
    }
}

impl ClusterRoutine for KMeans {
    fn cluster(&self, points: &[Point], k: usize) -> Result<Clustering, ClusterError> {
        if k == 0 {
            return Err(ClusterError::ZeroClusters);
        }
        if points.len() < k {
            return Err(ClusterError::NotEnoughPoints {
                k,
                points: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(ClusterError::NonFinite { index });
        }

        let tol = self.tolerance * variance(points);
        let mut best: Option<Run> = None;
        for restart in 0..self.restarts.max(1) {
            let seed = self
                .seed
                .wrapping_add((restart as u32).wrapping_mul(0x9E37_79B9));
            let mut rng = SimpleRng::new(seed);
            let run = self.run(points, k, tol, &mut rng);
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let run = best.ok_or_else(|| ClusterError::MalformedResult("no k-means run completed".to_string()))?;
        log::debug!("k-means with k={} finished, inertia {:.3}", k, run.inertia);
        Ok(Clustering {
            labels: run.labels,
            centroids: run.centroids,
        })
    }
}
