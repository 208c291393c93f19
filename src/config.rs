//! Configuration management for the gaze tracking pipeline

use crate::{constants::*, types::Viewport, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session timing
    pub session: SessionConfig,

    /// Viewport the estimator output is rescaled into
    pub viewport: ViewportConfig,

    /// Calibration acceptance and quality heuristics
    pub calibration: CalibrationConfig,

    /// Fixation clustering
    pub fixation: FixationConfig,

    /// Post-hoc gaze data validation
    pub validation: ValidationConfig,

    /// Attention density grid
    pub heatmap: HeatmapConfig,

    /// Overlay rendering
    pub render: RenderConfig,
}

/// Session timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of a tracking session in seconds
    pub duration_secs: u64,

    /// Countdown tick interval in milliseconds
    pub tick_interval_ms: u64,
}

/// Viewport size configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels
    pub width: f64,

    /// Viewport height in pixels
    pub height: f64,
}

/// Calibration thresholds
///
/// The lighting, eyewear and camera heuristics are empirically tuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Minimum number of samples for a calibration to be considered
    pub min_points: usize,

    /// Minimum mean confidence (0.0-1.0)
    pub min_average_confidence: f64,

    /// Mean confidence below which lighting is poor
    pub poor_mean: f64,

    /// Confidence standard deviation above which lighting is poor
    pub poor_std_dev: f64,

    /// Mean confidence below which lighting is fair
    pub fair_mean: f64,

    /// Confidence standard deviation above which lighting is fair
    pub fair_std_dev: f64,

    /// Confidence drop between consecutive samples counted as a dropout
    pub dropout_drop: f64,

    /// Minimum dropouts before eyewear is suspected
    pub min_dropouts: usize,

    /// Minimum dropouts per sample before eyewear is suspected
    pub min_dropout_rate: f64,

    /// Share of dropouts that must fall in one screen region
    pub dropout_concentration: f64,

    /// Cells per axis of the dropout region grid
    pub dropout_grid: usize,

    /// Minimum share of the viewport the samples must span on each axis
    pub min_coverage: f64,

    /// Maximum centroid offset from the viewport centre (fraction of half-extent)
    pub max_centroid_offset: f64,

    /// Confirmations required per point-based calibration target
    pub confirmations_per_target: u32,
}

/// Fixation clustering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationConfig {
    /// Maximum distance from the running centroid, in image pixels
    pub max_distance: f64,

    /// Minimum cluster time span in milliseconds
    pub min_duration_ms: i64,

    /// Minimum samples per cluster
    pub min_points: usize,
}

/// Gaze data validation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum share of points inside the image
    pub min_in_bounds_ratio: f64,

    /// Per-point confidence floor
    pub confidence_floor: f64,

    /// Minimum share of points at or above the confidence floor
    pub min_confident_ratio: f64,
}

/// Heatmap grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Bins per axis
    pub grid_size: usize,
}

/// Overlay rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Heatmap disc radius in canvas pixels
    pub heatmap_radius: f64,

    /// Disc alpha at full confidence
    pub heatmap_max_alpha: f64,

    /// Scan path stroke width
    pub scanpath_line_width: f64,

    /// Smallest fixation marker radius
    pub fixation_min_radius: f64,

    /// Largest fixation marker radius
    pub fixation_max_radius: f64,

    /// Marker radius growth per millisecond of fixation
    pub fixation_radius_per_ms: f64,

    /// Pixel scale of fixation ordinal labels
    pub label_scale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            viewport: ViewportConfig::default(),
            calibration: CalibrationConfig::default(),
            fixation: FixationConfig::default(),
            validation: ValidationConfig::default(),
            heatmap: HeatmapConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SESSION_DURATION_SECS,
            tick_interval_ms: DEFAULT_COUNTDOWN_TICK_MS,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_points: DEFAULT_MIN_CALIBRATION_POINTS,
            min_average_confidence: DEFAULT_MIN_AVERAGE_CONFIDENCE,
            poor_mean: DEFAULT_POOR_LIGHTING_MEAN,
            poor_std_dev: DEFAULT_POOR_LIGHTING_STD_DEV,
            fair_mean: DEFAULT_FAIR_LIGHTING_MEAN,
            fair_std_dev: DEFAULT_FAIR_LIGHTING_STD_DEV,
            dropout_drop: DEFAULT_DROPOUT_DROP,
            min_dropouts: DEFAULT_MIN_DROPOUTS,
            min_dropout_rate: DEFAULT_MIN_DROPOUT_RATE,
            dropout_concentration: DEFAULT_DROPOUT_CONCENTRATION,
            dropout_grid: DEFAULT_DROPOUT_GRID,
            min_coverage: DEFAULT_MIN_COVERAGE,
            max_centroid_offset: DEFAULT_MAX_CENTROID_OFFSET,
            confirmations_per_target: DEFAULT_CONFIRMATIONS_PER_TARGET,
        }
    }
}

impl Default for FixationConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_FIXATION_DISTANCE,
            min_duration_ms: DEFAULT_MIN_FIXATION_DURATION_MS,
            min_points: DEFAULT_MIN_FIXATION_POINTS,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_in_bounds_ratio: DEFAULT_MIN_IN_BOUNDS_RATIO,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            min_confident_ratio: DEFAULT_MIN_CONFIDENT_RATIO,
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_HEATMAP_GRID_SIZE,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heatmap_radius: DEFAULT_HEATMAP_RADIUS,
            heatmap_max_alpha: DEFAULT_HEATMAP_MAX_ALPHA,
            scanpath_line_width: DEFAULT_SCANPATH_LINE_WIDTH,
            fixation_min_radius: DEFAULT_FIXATION_MIN_RADIUS,
            fixation_max_radius: DEFAULT_FIXATION_MAX_RADIUS,
            fixation_radius_per_ms: DEFAULT_FIXATION_RADIUS_PER_MS,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }
}

impl SessionConfig {
    /// Session length as a `Duration`
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Countdown tick as a `Duration`
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl ViewportConfig {
    #[must_use]
    pub const fn to_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the text is not valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if self.session.duration_secs == 0 {
            return Err(Error::ConfigError("Session duration must be greater than 0".to_string()));
        }
        if self.session.tick_interval_ms == 0 {
            return Err(Error::ConfigError("Countdown tick interval must be greater than 0".to_string()));
        }

        self.viewport
            .to_viewport()
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let unit_ranges = [
            ("Minimum average confidence", self.calibration.min_average_confidence),
            ("Dropout drop", self.calibration.dropout_drop),
            ("Dropout rate", self.calibration.min_dropout_rate),
            ("Dropout concentration", self.calibration.dropout_concentration),
            ("Minimum coverage", self.calibration.min_coverage),
            ("Minimum in-bounds ratio", self.validation.min_in_bounds_ratio),
            ("Confidence floor", self.validation.confidence_floor),
            ("Minimum confident ratio", self.validation.min_confident_ratio),
            ("Heatmap alpha", self.render.heatmap_max_alpha),
        ];
        for (name, value) in unit_ranges {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0")));
            }
        }

        if self.calibration.min_points == 0 {
            return Err(Error::ConfigError("Minimum calibration points must be greater than 0".to_string()));
        }
        if self.calibration.dropout_grid == 0 {
            return Err(Error::ConfigError("Dropout grid must be greater than 0".to_string()));
        }
        if self.calibration.confirmations_per_target == 0 {
            return Err(Error::ConfigError(
                "Confirmations per target must be greater than 0".to_string(),
            ));
        }

        if !(self.fixation.max_distance > 0.0) {
            return Err(Error::ConfigError("Fixation distance must be greater than 0".to_string()));
        }
        if self.fixation.min_duration_ms < 0 {
            return Err(Error::ConfigError("Fixation duration must not be negative".to_string()));
        }
        if self.fixation.min_points < 2 {
            return Err(Error::ConfigError("A fixation needs at least 2 points".to_string()));
        }

        if self.heatmap.grid_size == 0 || self.heatmap.grid_size > MAX_HEATMAP_GRID_SIZE {
            return Err(Error::ConfigError(format!(
                "Heatmap grid size must be between 1 and {MAX_HEATMAP_GRID_SIZE}"
            )));
        }

        if !(self.render.heatmap_radius > 0.0) {
            return Err(Error::ConfigError("Heatmap radius must be greater than 0".to_string()));
        }
        if !(self.render.fixation_min_radius > 0.0) || self.render.fixation_max_radius < self.render.fixation_min_radius {
            return Err(Error::ConfigError(
                "Fixation radius range must be positive and ordered".to_string(),
            ));
        }
        if self.render.label_scale == 0 {
            return Err(Error::ConfigError("Label scale must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Tracking Configuration

# Session timing
session:
  duration_secs: 30
  tick_interval_ms: 1000

# Estimator output is rescaled into this viewport
viewport:
  width: 1920.0
  height: 1080.0

# Calibration acceptance and quality heuristics
calibration:
  min_points: 30
  min_average_confidence: 0.5
  poor_mean: 0.55
  poor_std_dev: 0.3
  fair_mean: 0.75
  fair_std_dev: 0.18
  dropout_drop: 0.35
  min_dropouts: 5
  min_dropout_rate: 0.05
  dropout_concentration: 0.5
  dropout_grid: 3
  min_coverage: 0.4
  max_centroid_offset: 0.35
  confirmations_per_target: 5

# Fixation clustering
fixation:
  max_distance: 50.0
  min_duration_ms: 100
  min_points: 3

# Gaze data validation
validation:
  min_in_bounds_ratio: 0.5
  confidence_floor: 0.3
  min_confident_ratio: 0.5

# Attention density grid
heatmap:
  grid_size: 20

# Overlay rendering
render:
  heatmap_radius: 30.0
  heatmap_max_alpha: 0.35
  scanpath_line_width: 2.0
  fixation_min_radius: 8.0
  fixation_max_radius: 40.0
  fixation_radius_per_ms: 0.05
  label_scale: 2
"#;
