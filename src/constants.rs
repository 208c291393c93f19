//! Constants used throughout the library

/// Default session length in seconds
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 30;

/// Countdown tick interval in milliseconds
pub const DEFAULT_COUNTDOWN_TICK_MS: u64 = 1000;

/// Default viewport size used when the consumer does not report one
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1920.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 1080.0;

/// Padding applied to a collapsed calibration domain axis (estimator units)
pub const DOMAIN_PADDING: f64 = 1.0;

/// Calibration acceptance thresholds
pub const DEFAULT_MIN_CALIBRATION_POINTS: usize = 30;
pub const DEFAULT_MIN_AVERAGE_CONFIDENCE: f64 = 0.5;

/// Lighting classification thresholds over the confidence distribution
pub const DEFAULT_POOR_LIGHTING_MEAN: f64 = 0.55;
pub const DEFAULT_POOR_LIGHTING_STD_DEV: f64 = 0.3;
pub const DEFAULT_FAIR_LIGHTING_MEAN: f64 = 0.75;
pub const DEFAULT_FAIR_LIGHTING_STD_DEV: f64 = 0.18;

/// Eyewear reflection heuristic
pub const DEFAULT_DROPOUT_DROP: f64 = 0.35;
pub const DEFAULT_MIN_DROPOUTS: usize = 5;
pub const DEFAULT_MIN_DROPOUT_RATE: f64 = 0.05;
pub const DEFAULT_DROPOUT_CONCENTRATION: f64 = 0.5;
pub const DEFAULT_DROPOUT_GRID: usize = 3;

/// Camera positioning heuristic
pub const DEFAULT_MIN_COVERAGE: f64 = 0.4;
pub const DEFAULT_MAX_CENTROID_OFFSET: f64 = 0.35;

/// Point-based calibration
pub const DEFAULT_CONFIRMATIONS_PER_TARGET: u32 = 5;
pub const CALIBRATION_GRID_RATIOS: [f64; 3] = [0.1, 0.5, 0.9];

/// Fixation clustering
pub const DEFAULT_MAX_FIXATION_DISTANCE: f64 = 50.0;
pub const DEFAULT_MIN_FIXATION_DURATION_MS: i64 = 100;
pub const DEFAULT_MIN_FIXATION_POINTS: usize = 3;

/// Gaze data validation
pub const DEFAULT_MIN_IN_BOUNDS_RATIO: f64 = 0.5;
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.3;
pub const DEFAULT_MIN_CONFIDENT_RATIO: f64 = 0.5;

/// Heatmap grid bins per axis
pub const DEFAULT_HEATMAP_GRID_SIZE: usize = 20;
pub const MAX_HEATMAP_GRID_SIZE: usize = 1024;

/// Overlay rendering
pub const DEFAULT_HEATMAP_RADIUS: f64 = 30.0;
pub const DEFAULT_HEATMAP_MAX_ALPHA: f64 = 0.35;
pub const DEFAULT_SCANPATH_LINE_WIDTH: f64 = 2.0;
pub const DEFAULT_FIXATION_MIN_RADIUS: f64 = 8.0;
pub const DEFAULT_FIXATION_MAX_RADIUS: f64 = 40.0;
pub const DEFAULT_FIXATION_RADIUS_PER_MS: f64 = 0.05;
pub const DEFAULT_LABEL_SCALE: u32 = 2;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
