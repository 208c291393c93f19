//! Gaze tracking library for stimulus-viewing experiments.
//!
//! This library turns the raw output of a webcam gaze estimator into
//! per-image attention data:
//! - A session state machine gating calibration and tracking
//! - Calibration acceptance plus lighting, eyewear and camera heuristics
//! - Two-stage mapping from estimator space into image pixels
//! - Fixation clustering, data validation and heatmap binning
//! - Heatmap, scan path and fixation overlays rendered to RGBA images
//!
//! The processing pipeline consists of:
//! 1. Calibration, validated before tracking may start
//! 2. Tracking, appending samples to a per-phase buffer
//! 3. On stop: mapping, validation, fixation detection, heatmap binning
//! 4. Hand-off of the aggregate result to a session store
//!
//! # Examples
//!
//! ## Running a Session
//!
//! ```no_run
//! use gaze_tracking::{
//!     config::Config,
//!     sample_source::ScriptedSampleSource,
//!     session::{EyeTrackingSession, StopOutcome},
//!     types::{GazePoint, ImageBounds},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ScriptedSampleSource::new("webcam");
//! let emitter = source.emitter();
//! let session = EyeTrackingSession::new(source, Config::default())?;
//!
//! session.initialize()?;
//! session.start_calibration()?;
//! // ... the estimator emits samples while targets are shown ...
//! let calibration = session.finish_calibration()?;
//! if !calibration.is_valid {
//!     println!("Recalibrate: {:?}", calibration.error_message);
//!     return Ok(());
//! }
//!
//! session.set_image_bounds(ImageBounds::new(100.0, 50.0, 800.0, 600.0, 4000.0, 3000.0))?;
//! session.start_tracking()?;
//! emitter.emit(GazePoint::new(512.0, 480.0, 0, 0.9));
//!
//! if let StopOutcome::Completed(report) = session.stop()? {
//!     println!("{} fixations", report.result.fixation_points.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Detecting Fixations
//!
//! ```
//! use gaze_tracking::{fixation::FixationDetector, types::GazePoint};
//!
//! let points: Vec<GazePoint> = (0..10)
//!     .map(|i| GazePoint::new(300.0, 200.0, i * 20, 1.0))
//!     .collect();
//!
//! let fixations = FixationDetector::default().detect(&points);
//! assert_eq!(fixations.len(), 1);
//! assert_eq!(fixations[0].duration, 180);
//! ```
//!
//! ## Rendering Overlays
//!
//! ```no_run
//! use gaze_tracking::{render::OverlayRenderer, types::{GazePoint, ImageBounds}};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bounds = ImageBounds::new(0.0, 0.0, 800.0, 600.0, 1600.0, 1200.0);
//! let points = vec![GazePoint::new(800.0, 600.0, 0, 0.8)];
//!
//! let mut renderer = OverlayRenderer::default();
//! renderer.draw_heatmap(&points, &bounds)?;
//! renderer.save_png("heatmap.png")?;
//! # Ok(())
//! # }
//! ```

/// Data model shared by every stage
pub mod types;

/// Session state machine
pub mod session;

/// Gaze sample source trait, scripted source and sample buffer
pub mod sample_source;

/// Calibration acceptance and quality heuristics
pub mod calibration;

/// Estimator space to image space coordinate mapping
pub mod mapping;

/// Fixation clustering
pub mod fixation;

/// Gaze data validation
pub mod validation;

/// Attention-density grid
pub mod heatmap;

/// Stop-time reduction and persistence hand-off
pub mod pipeline;

/// Overlay rendering
pub mod render;

/// Session countdown timer
pub mod countdown;

/// Time sources
pub mod clock;

/// Offline replay of recorded sessions
pub mod replay;

/// Statistics and safe numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
