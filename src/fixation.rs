//! Fixation detection by running-centroid clustering.
//!
//! A single forward pass grows a cluster while each new sample stays within
//! `max_distance` of the cluster centroid. When a sample falls outside, the
//! cluster is closed and either emitted as a fixation or dropped as noise,
//! and the outlying sample seeds the next cluster. Clusters are never split
//! or merged after the fact.

use crate::{
    config::FixationConfig,
    types::{Fixation, GazePoint},
};
use log::debug;

/// Clusters an ordered gaze sequence into fixations
#[derive(Debug, Clone)]
pub struct FixationDetector {
    max_distance: f64,
    min_duration_ms: i64,
    min_points: usize,
}

/// Cluster under construction
struct Cluster {
    first: GazePoint,
    last: GazePoint,
    sum_x: f64,
    sum_y: f64,
    count: usize,
}

impl Cluster {
    const fn start(point: GazePoint) -> Self {
        Self {
            first: point,
            last: point,
            sum_x: point.x,
            sum_y: point.y,
            count: 1,
        }
    }

    fn push(&mut self, point: GazePoint) {
        self.sum_x += point.x;
        self.sum_y += point.y;
        self.count += 1;
        self.last = point;
    }

    #[allow(clippy::cast_precision_loss)]
    fn centroid(&self) -> (f64, f64) {
        let n = self.count as f64;
        (self.sum_x / n, self.sum_y / n)
    }

    const fn span_ms(&self) -> i64 {
        self.last.timestamp - self.first.timestamp
    }
}

impl FixationDetector {
    /// Create a detector
    #[must_use]
    pub const fn new(max_distance: f64, min_duration_ms: i64, min_points: usize) -> Self {
        Self {
            max_distance,
            min_duration_ms,
            min_points,
        }
    }

    /// Create a detector from configuration
    #[must_use]
    pub const fn from_config(config: &FixationConfig) -> Self {
        Self::new(config.max_distance, config.min_duration_ms, config.min_points)
    }

    #[must_use]
    pub const fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Detect fixations in a time-ordered point sequence
    #[must_use]
    pub fn detect(&self, points: &[GazePoint]) -> Vec<Fixation> {
        let mut fixations = Vec::new();
        let Some((&first, rest)) = points.split_first() else {
            return fixations;
        };

        let mut cluster = Cluster::start(first);
        for &point in rest {
            let (cx, cy) = cluster.centroid();
            if point.distance_to(cx, cy) <= self.max_distance {
                cluster.push(point);
            } else {
                self.close(&cluster, &mut fixations);
                cluster = Cluster::start(point);
            }
        }
        self.close(&cluster, &mut fixations);

        debug!(
            "Detected {} fixations from {} points",
            fixations.len(),
            points.len()
        );
        fixations
    }

    fn close(&self, cluster: &Cluster, out: &mut Vec<Fixation>) {
        let duration = cluster.span_ms();
        // A lone sample has zero span and never qualifies
        if cluster.count < 2 || cluster.count < self.min_points || duration < self.min_duration_ms {
            return;
        }
        let (x, y) = cluster.centroid();
        out.push(Fixation {
            x,
            y,
            duration,
            start_time: cluster.first.timestamp,
        });
    }
}

impl Default for FixationDetector {
    fn default() -> Self {
        Self::from_config(&FixationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, t: i64) -> GazePoint {
        GazePoint::new(x, y, t, 1.0)
    }

    #[test]
    fn test_empty_and_single_point() {
        let detector = FixationDetector::default();
        assert!(detector.detect(&[]).is_empty());
        assert!(detector.detect(&[point(10.0, 10.0, 0)]).is_empty());
    }

    #[test]
    fn test_single_point_never_qualifies_even_with_lenient_thresholds() {
        let detector = FixationDetector::new(50.0, 0, 1);
        assert!(detector.detect(&[point(10.0, 10.0, 0)]).is_empty());
    }

    #[test]
    fn test_two_clusters() {
        let detector = FixationDetector::new(20.0, 100, 3);
        let points = vec![
            point(100.0, 100.0, 0),
            point(102.0, 101.0, 50),
            point(101.0, 99.0, 100),
            point(99.0, 100.0, 150),
            point(400.0, 400.0, 200),
            point(401.0, 402.0, 260),
            point(399.0, 401.0, 320),
        ];

        let fixations = detector.detect(&points);
        assert_eq!(fixations.len(), 2);
        assert_eq!(fixations[0].start_time, 0);
        assert_eq!(fixations[0].duration, 150);
        assert!((fixations[0].x - 100.5).abs() < 1e-9);
        assert_eq!(fixations[1].start_time, 200);
        assert_eq!(fixations[1].duration, 120);
    }

    #[test]
    fn test_short_cluster_is_discarded() {
        let detector = FixationDetector::new(20.0, 100, 3);
        let points = vec![point(0.0, 0.0, 0), point(1.0, 1.0, 20), point(2.0, 0.0, 40)];
        assert!(detector.detect(&points).is_empty());
    }

    #[test]
    fn test_sparse_cluster_is_discarded() {
        let detector = FixationDetector::new(20.0, 100, 3);
        let points = vec![point(0.0, 0.0, 0), point(1.0, 1.0, 300)];
        assert!(detector.detect(&points).is_empty());
    }

    #[test]
    fn test_no_retroactive_merge() {
        // Third point is far from the first centroid, so it starts a new
        // cluster even though the fourth point returns near the first.
        let detector = FixationDetector::new(10.0, 0, 2);
        let points = vec![
            point(0.0, 0.0, 0),
            point(1.0, 0.0, 10),
            point(100.0, 0.0, 20),
            point(2.0, 0.0, 30),
            point(3.0, 0.0, 40),
        ];
        let fixations = detector.detect(&points);
        assert_eq!(fixations.len(), 2);
        assert_eq!(fixations[0].start_time, 0);
        assert_eq!(fixations[1].start_time, 30);
    }
}
