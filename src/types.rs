//! Data model shared by every stage of the gaze pipeline.

use crate::{constants::DOMAIN_PADDING, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single gaze sample.
///
/// Coordinates are expressed in whatever space the producing stage works in:
/// estimator space straight from the sample source, image-natural pixels after
/// mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Acquisition time in milliseconds
    pub timestamp: i64,
    /// Estimator confidence in `[0, 1]`
    pub confidence: f64,
}

impl GazePoint {
    /// Create a new gaze point
    #[must_use]
    pub const fn new(x: f64, y: f64, timestamp: i64, confidence: f64) -> Self {
        Self {
            x,
            y,
            timestamp,
            confidence,
        }
    }

    /// Euclidean distance to a position
    #[must_use]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Bounding rectangle of estimator-space coordinates seen during calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationDomain {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CalibrationDomain {
    /// Create a domain, rejecting empty or inverted ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if either axis has a non-positive span
    /// or any bound is not finite.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let domain = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// Observed bounding box of a sample set.
    ///
    /// A collapsed axis is padded by `DOMAIN_PADDING` on both sides so the
    /// domain always has positive extent. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[GazePoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        if max_x - min_x <= 0.0 {
            min_x -= DOMAIN_PADDING;
            max_x += DOMAIN_PADDING;
        }
        if max_y - min_y <= 0.0 {
            min_y -= DOMAIN_PADDING;
            max_y += DOMAIN_PADDING;
        }

        Some(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Check the `max > min` invariant on both axes
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` describing the offending axis.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidInput(format!("Calibration domain has non-finite bounds: {self:?}")));
        }
        if self.max_x <= self.min_x {
            return Err(Error::InvalidInput(format!(
                "Degenerate calibration domain: max_x ({}) must exceed min_x ({})",
                self.max_x, self.min_x
            )));
        }
        if self.max_y <= self.min_y {
            return Err(Error::InvalidInput(format!(
                "Degenerate calibration domain: max_y ({}) must exceed min_y ({})",
                self.max_y, self.min_y
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Size of the viewport the estimator output is rescaled into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidInput` unless both dimensions are positive and finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Viewport must have positive size, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// On-screen placement of the stimulus image plus its intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBounds {
    /// Left edge of the rendered box in viewport pixels
    pub x: f64,
    /// Top edge of the rendered box in viewport pixels
    pub y: f64,
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
    /// Intrinsic pixel width of the image
    pub natural_width: f64,
    /// Intrinsic pixel height of the image
    pub natural_height: f64,
}

impl ImageBounds {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, natural_width: f64, natural_height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            natural_width,
            natural_height,
        }
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the rendered or natural size is not positive.
    pub fn validate(&self) -> Result<()> {
        let sizes = [self.width, self.height, self.natural_width, self.natural_height];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) || !self.x.is_finite() || !self.y.is_finite() {
            return Err(Error::InvalidInput(format!("Image bounds must have positive size: {self:?}")));
        }
        Ok(())
    }

    /// Whether an image-natural position lies on the image (edges inclusive)
    #[must_use]
    pub fn contains_natural(&self, x: f64, y: f64) -> bool {
        (0.0..=self.natural_width).contains(&x) && (0.0..=self.natural_height).contains(&y)
    }
}

/// Lighting quality inferred from the calibration confidence distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingQuality {
    Good,
    Fair,
    Poor,
}

impl fmt::Display for LightingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

/// Camera placement inferred from the spatial spread of calibration samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPositioning {
    Optimal,
    Suboptimal,
}

impl fmt::Display for CameraPositioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Suboptimal => write!(f, "suboptimal"),
        }
    }
}

/// Outcome of one calibration attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    pub is_valid: bool,
    pub points_collected: usize,
    pub average_confidence: f64,
    pub lighting_quality: LightingQuality,
    pub eyeglasses_detected: bool,
    pub camera_positioning: CameraPositioning,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A cluster of gaze samples the eye rested on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixation {
    /// Centroid x in image-natural pixels
    pub x: f64,
    /// Centroid y in image-natural pixels
    pub y: f64,
    /// Time span of the cluster in milliseconds
    pub duration: i64,
    /// Timestamp of the first sample in the cluster
    pub start_time: i64,
}

/// Aggregate produced once when a tracking session stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeTrackingSessionResult {
    pub gaze_points: Vec<GazePoint>,
    pub fixation_points: Vec<Fixation>,
    pub scan_path: Vec<GazePoint>,
    pub session_duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap_data: Option<Vec<Vec<u32>>>,
}
