//! Calibration acceptance and quality heuristics.
//!
//! The validator inspects the samples collected while the user looked at
//! calibration targets and decides whether the estimator is usable. Beyond
//! the hard acceptance rules (sample count and mean confidence) it reports
//! three advisory metrics:
//!
//! - lighting quality, from the mean and spread of confidence values
//! - suspected eyewear, from abrupt confidence dropouts clustered in one
//!   screen region (lens reflections tend to appear at particular gaze angles)
//! - camera positioning, from how much of the viewport the samples span and
//!   how far their centroid sits from the centre
//!
//! The spatial heuristics work in viewport pixels. Samples are projected
//! through the estimator domain when the source reports one; otherwise
//! estimator space is taken to be screen-like.
//!
//! The thresholds are empirically tuned and live in [`CalibrationConfig`].

use crate::{
    config::CalibrationConfig,
    constants::CALIBRATION_GRID_RATIOS,
    mapping::CoordinateMapper,
    types::{CalibrationDomain, CalibrationResult, CameraPositioning, GazePoint, LightingQuality, Viewport},
    utils::{calculate_stats, Statistics},
    Error, Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Decides whether a calibration window is acceptable
#[derive(Debug, Clone)]
pub struct CalibrationValidator {
    config: CalibrationConfig,
}

impl CalibrationValidator {
    #[must_use]
    pub const fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Evaluate calibration samples given in estimator space
    ///
    /// With a domain the samples are rescaled to the viewport before the
    /// spatial heuristics run. Without one this is `validate`.
    #[must_use]
    pub fn validate_in_domain(
        &self,
        samples: &[GazePoint],
        domain: Option<&CalibrationDomain>,
        viewport: &Viewport,
    ) -> CalibrationResult {
        let Some(domain) = domain else {
            return self.validate(samples, viewport);
        };
        let mapper = match CoordinateMapper::new(Some(*domain), *viewport) {
            Ok(mapper) => mapper,
            Err(e) => {
                warn!("Ignoring unusable estimator domain for calibration: {}", e);
                return self.validate(samples, viewport);
            }
        };
        let projected: Vec<GazePoint> = samples
            .iter()
            .map(|p| {
                let (x, y) = mapper.to_viewport(p.x, p.y);
                GazePoint { x, y, ..*p }
            })
            .collect();
        self.validate(&projected, viewport)
    }

    /// Evaluate the samples collected during calibration
    ///
    /// Sample positions are read as viewport pixels.
    #[must_use]
    pub fn validate(&self, samples: &[GazePoint], viewport: &Viewport) -> CalibrationResult {
        let points_collected = samples.len();
        let confidence = calculate_stats(samples.iter().map(|p| p.confidence));

        let average_confidence = confidence.map_or(0.0, |s| s.mean);
        let lighting_quality = confidence.map_or(LightingQuality::Poor, |s| self.classify_lighting(&s));
        let eyeglasses_detected = self.detect_eyeglasses(samples, viewport);
        let camera_positioning = self.classify_camera(samples, viewport);

        let error_message = if points_collected < self.config.min_points {
            Some(format!(
                "Not enough gaze samples collected ({points_collected} of {} required)",
                self.config.min_points
            ))
        } else if average_confidence < self.config.min_average_confidence {
            Some(format!(
                "Average tracking confidence {average_confidence:.2} is below the required {:.2}",
                self.config.min_average_confidence
            ))
        } else {
            None
        };

        let result = CalibrationResult {
            is_valid: error_message.is_none(),
            points_collected,
            average_confidence,
            lighting_quality,
            eyeglasses_detected,
            camera_positioning,
            error_message,
        };

        if result.is_valid {
            info!(
                "Calibration accepted: {} samples, confidence {:.2}, lighting {}, camera {}",
                points_collected, average_confidence, lighting_quality, camera_positioning
            );
        } else {
            warn!(
                "Calibration rejected: {}",
                result.error_message.as_deref().unwrap_or("unknown reason")
            );
        }

        result
    }

    /// Classify lighting from the confidence distribution
    #[must_use]
    pub fn classify_lighting(&self, confidence: &Statistics) -> LightingQuality {
        let c = &self.config;
        if confidence.mean < c.poor_mean || confidence.std_dev > c.poor_std_dev {
            LightingQuality::Poor
        } else if confidence.mean < c.fair_mean || confidence.std_dev > c.fair_std_dev {
            LightingQuality::Fair
        } else {
            LightingQuality::Good
        }
    }

    /// Flag suspected eyewear from dropouts concentrated in one screen region
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn detect_eyeglasses(&self, samples: &[GazePoint], viewport: &Viewport) -> bool {
        let c = &self.config;
        let grid = c.dropout_grid.max(1);
        let mut cells = vec![0usize; grid * grid];
        let mut dropouts = 0usize;

        for pair in samples.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.confidence - curr.confidence >= c.dropout_drop {
                dropouts += 1;
                let col = region_index(curr.x, viewport.width, grid);
                let row = region_index(curr.y, viewport.height, grid);
                cells[row * grid + col] += 1;
            }
        }

        if dropouts < c.min_dropouts || samples.is_empty() {
            return false;
        }

        let rate = dropouts as f64 / samples.len() as f64;
        let busiest = cells.iter().copied().max().unwrap_or(0);
        let concentration = busiest as f64 / dropouts as f64;
        debug!(
            "Confidence dropouts: {} (rate {:.3}, concentration {:.2})",
            dropouts, rate, concentration
        );

        rate >= c.min_dropout_rate && concentration >= c.dropout_concentration
    }

    /// Classify camera placement from the spatial spread of samples
    #[must_use]
    pub fn classify_camera(&self, samples: &[GazePoint], viewport: &Viewport) -> CameraPositioning {
        let (Some(xs), Some(ys)) = (
            calculate_stats(samples.iter().map(|p| p.x)),
            calculate_stats(samples.iter().map(|p| p.y)),
        ) else {
            return CameraPositioning::Suboptimal;
        };

        let coverage_x = xs.range / viewport.width;
        let coverage_y = ys.range / viewport.height;

        let offset_x = (xs.mean - viewport.width / 2.0).abs() / (viewport.width / 2.0);
        let offset_y = (ys.mean - viewport.height / 2.0).abs() / (viewport.height / 2.0);

        debug!(
            "Calibration coverage {:.2}x{:.2}, centroid offset {:.2}/{:.2}",
            coverage_x, coverage_y, offset_x, offset_y
        );

        let spread_ok = coverage_x >= self.config.min_coverage && coverage_y >= self.config.min_coverage;
        let centred = offset_x <= self.config.max_centroid_offset && offset_y <= self.config.max_centroid_offset;

        if spread_ok && centred {
            CameraPositioning::Optimal
        } else {
            CameraPositioning::Suboptimal
        }
    }
}

impl Default for CalibrationValidator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn region_index(value: f64, extent: f64, grid: usize) -> usize {
    if !value.is_finite() || extent <= 0.0 {
        return 0;
    }
    let ratio = (value / extent).clamp(0.0, 1.0);
    ((ratio * grid as f64) as usize).min(grid - 1)
}

/// An on-screen calibration target, as a fraction of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTarget {
    pub x_ratio: f64,
    pub y_ratio: f64,
}

impl CalibrationTarget {
    /// Target position in viewport pixels
    #[must_use]
    pub fn position(&self, viewport: &Viewport) -> (f64, f64) {
        (self.x_ratio * viewport.width, self.y_ratio * viewport.height)
    }

    /// The standard nine-point grid, row by row from the top-left
    #[must_use]
    pub fn nine_point_grid() -> Vec<Self> {
        CALIBRATION_GRID_RATIOS
            .iter()
            .flat_map(|&y_ratio| {
                CALIBRATION_GRID_RATIOS
                    .iter()
                    .map(move |&x_ratio| Self { x_ratio, y_ratio })
            })
            .collect()
    }
}

/// Per-target confirmation counts for point-based calibration
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProgress {
    targets: Vec<CalibrationTarget>,
    confirmations: Vec<u32>,
    required: u32,
}

impl CalibrationProgress {
    #[must_use]
    pub fn new(targets: Vec<CalibrationTarget>, required: u32) -> Self {
        let confirmations = vec![0; targets.len()];
        Self {
            targets,
            confirmations,
            required,
        }
    }

    /// Record one confirmation on a target; returns whether that target is done
    ///
    /// Confirmations beyond the required count are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an unknown target index.
    pub fn confirm(&mut self, index: usize) -> Result<bool> {
        let count = self
            .confirmations
            .get_mut(index)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown calibration target {index}")))?;
        if *count < self.required {
            *count += 1;
        }
        Ok(*count >= self.required)
    }

    #[must_use]
    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    #[must_use]
    pub fn confirmations(&self, index: usize) -> Option<u32> {
        self.confirmations.get(index).copied()
    }

    /// Confirmations still outstanding across all targets
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.confirmations
            .iter()
            .map(|c| self.required.saturating_sub(*c))
            .sum()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }
}
