//! Post-hoc sanity checks over mapped gaze data.

use crate::{
    config::ValidationConfig,
    constants::EPSILON,
    types::{GazePoint, ImageBounds},
};
use log::warn;
use serde::{Deserialize, Serialize};

/// Result of validating a mapped point set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Aggregate acceptability of the session's data
    pub is_valid: bool,
    /// Points that are on the image and above the confidence floor
    pub valid_points: Vec<GazePoint>,
    /// Human-readable description of every failed check
    pub issues: Vec<String>,
}

/// Checks bounds, confidence, and density of mapped gaze points
#[derive(Debug, Clone)]
pub struct GazeDataValidator {
    config: ValidationConfig,
}

impl GazeDataValidator {
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate points expressed in image-natural coordinates
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self, points: &[GazePoint], bounds: &ImageBounds) -> ValidationReport {
        let mut issues = Vec::new();

        if points.is_empty() {
            issues.push("No gaze points to validate".to_string());
            return ValidationReport {
                is_valid: false,
                valid_points: Vec::new(),
                issues,
            };
        }

        let total = points.len() as f64;
        let floor = self.config.confidence_floor;

        let in_bounds = points.iter().filter(|p| bounds.contains_natural(p.x, p.y)).count();
        let confident = points.iter().filter(|p| p.confidence >= floor).count();

        let in_bounds_ratio = in_bounds as f64 / total;
        if in_bounds_ratio < self.config.min_in_bounds_ratio {
            issues.push(format!(
                "Only {:.1}% of gaze points fall within the image ({} of {}); minimum is {:.1}%",
                in_bounds_ratio * 100.0,
                in_bounds,
                points.len(),
                self.config.min_in_bounds_ratio * 100.0
            ));
        } else if in_bounds < points.len() {
            // Not a failure, but the off-image points are still worth surfacing
            issues.push(format!(
                "{} gaze points fall outside the image bounds",
                points.len() - in_bounds
            ));
        }

        let confident_ratio = confident as f64 / total;
        if confident_ratio < self.config.min_confident_ratio {
            issues.push(format!(
                "Only {:.1}% of gaze points have confidence >= {:.2}; minimum is {:.1}%",
                confident_ratio * 100.0,
                floor,
                self.config.min_confident_ratio * 100.0
            ));
        }

        let degenerate = Self::is_degenerate(points);
        if degenerate {
            issues.push("All gaze points are identical; the sensor appears stuck".to_string());
        }

        let valid_points: Vec<GazePoint> = points
            .iter()
            .filter(|p| p.confidence >= floor && bounds.contains_natural(p.x, p.y))
            .copied()
            .collect();

        let is_valid = in_bounds_ratio >= self.config.min_in_bounds_ratio
            && confident_ratio >= self.config.min_confident_ratio
            && !degenerate;

        if !is_valid {
            warn!("Gaze data failed validation: {}", issues.join("; "));
        }

        ValidationReport {
            is_valid,
            valid_points,
            issues,
        }
    }

    fn is_degenerate(points: &[GazePoint]) -> bool {
        let Some(first) = points.first() else {
            return true;
        };
        points.len() > 1
            && points
                .iter()
                .all(|p| (p.x - first.x).abs() < EPSILON && (p.y - first.y).abs() < EPSILON)
    }
}

impl Default for GazeDataValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ImageBounds {
        ImageBounds::new(0.0, 0.0, 800.0, 600.0, 4000.0, 3000.0)
    }

    #[test]
    fn test_clean_data_is_valid() {
        let points: Vec<GazePoint> = (0..10)
            .map(|i| GazePoint::new(100.0 + f64::from(i) * 10.0, 200.0, i64::from(i) * 30, 0.9))
            .collect();
        let report = GazeDataValidator::default().validate(&points, &bounds());

        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.valid_points.len(), 10);
    }

    #[test]
    fn test_out_of_bounds_points_are_excluded_not_clamped() {
        let points = vec![
            GazePoint::new(4300.0, 2450.0, 0, 0.9),
            GazePoint::new(100.0, 100.0, 30, 0.9),
            GazePoint::new(120.0, 110.0, 60, 0.9),
        ];
        let report = GazeDataValidator::default().validate(&points, &bounds());

        assert!(report.is_valid);
        assert_eq!(report.valid_points.len(), 2);
        assert!(report.valid_points.iter().all(|p| p.x < 4000.0));
        assert!(report.issues.iter().any(|i| i.contains("outside the image")));
    }

    #[test]
    fn test_mostly_off_image_is_invalid() {
        let points = vec![
            GazePoint::new(4300.0, 2450.0, 0, 0.9),
            GazePoint::new(-5.0, 100.0, 30, 0.9),
            GazePoint::new(100.0, 100.0, 60, 0.9),
        ];
        let report = GazeDataValidator::default().validate(&points, &bounds());

        assert!(!report.is_valid);
        assert_eq!(report.valid_points.len(), 1);
        assert!(report.issues[0].contains("fall within the image"));
    }

    #[test]
    fn test_low_confidence_is_flagged() {
        let points: Vec<GazePoint> = (0..10)
            .map(|i| GazePoint::new(100.0 + f64::from(i), 100.0, i64::from(i), if i < 3 { 0.9 } else { 0.1 }))
            .collect();
        let report = GazeDataValidator::default().validate(&points, &bounds());

        assert!(!report.is_valid);
        assert_eq!(report.valid_points.len(), 3);
        assert!(report.issues.iter().any(|i| i.contains("confidence")));
    }

    #[test]
    fn test_stuck_sensor_is_flagged() {
        let points: Vec<GazePoint> = (0..5).map(|i| GazePoint::new(50.0, 50.0, i, 1.0)).collect();
        let report = GazeDataValidator::default().validate(&points, &bounds());

        assert!(!report.is_valid);
        assert_eq!(report.valid_points.len(), 5);
        assert!(report.issues.iter().any(|i| i.contains("identical")));
    }

    #[test]
    fn test_empty_input() {
        let report = GazeDataValidator::default().validate(&[], &bounds());
        assert!(!report.is_valid);
        assert!(report.valid_points.is_empty());
        assert_eq!(report.issues.len(), 1);
    }
}
