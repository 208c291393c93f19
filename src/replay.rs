//! Offline replay of a recorded gaze session.
//!
//! A `Recording` holds the samples an estimator produced during calibration
//! and tracking plus the geometry of the stimulus image. `ReplayApp` pushes it
//! through a full session, stores the result and writes the overlays.

use crate::{
    clock::ManualClock,
    config::Config,
    pipeline::{persist, JsonFileStore, SessionId, SessionReport},
    render::{OverlayRenderer, RenderMode},
    sample_source::ScriptedSampleSource,
    session::{EyeTrackingSession, StopOutcome},
    types::{CalibrationDomain, GazePoint, ImageBounds, Viewport},
    Error, Result,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Samples and geometry captured from one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Estimator output while the user looked at calibration targets
    #[serde(default)]
    pub calibration_samples: Vec<GazePoint>,
    /// Estimator output while the stimulus was shown
    pub tracking_samples: Vec<GazePoint>,
    /// Screen size at recording time; the configured viewport is used if absent
    #[serde(default)]
    pub viewport: Option<Viewport>,
    pub image_bounds: ImageBounds,
    /// Estimator-space bounds reported by the sensor, if it exposes them
    #[serde(default)]
    pub domain: Option<CalibrationDomain>,
    /// Skip calibration and reuse the sensor's stored one
    #[serde(default)]
    pub use_stored_calibration: bool,
}

impl Recording {
    /// Load a recording from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the text is not a recording.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::InvalidInput(format!("Failed to parse recording: {e}")))
    }

    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize recording: {e}")))?;
        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;
        Ok(())
    }

    /// Time covered by the tracking samples in milliseconds
    #[must_use]
    pub fn tracking_span_ms(&self) -> i64 {
        span_ms(&self.tracking_samples)
    }

    /// Tracking samples a session of length `limit` would have collected
    ///
    /// The countdown ends the session `limit` after the first sample; later
    /// samples are cut off.
    #[must_use]
    pub fn tracking_window(&self, limit: Duration) -> &[GazePoint] {
        let Some(first) = self.tracking_samples.first() else {
            return &[];
        };
        let limit_ms = i64::try_from(limit.as_millis()).unwrap_or(i64::MAX);
        let end = self
            .tracking_samples
            .iter()
            .position(|p| p.timestamp.saturating_sub(first.timestamp) > limit_ms)
            .unwrap_or(self.tracking_samples.len());
        &self.tracking_samples[..end]
    }
}

fn span_ms(samples: &[GazePoint]) -> i64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).max(0),
        _ => 0,
    }
}

/// What a replay produced
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub session_id: SessionId,
    pub report: SessionReport,
    /// Overlay images written, in render order
    pub images: Vec<PathBuf>,
}

/// Drives a recording through calibration, tracking and reduction
pub struct ReplayApp {
    settings: Config,
    output_dir: PathBuf,
    overlays: Vec<RenderMode>,
}

impl ReplayApp {
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the settings are out of range.
    pub fn new(settings: Config, output_dir: impl Into<PathBuf>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            output_dir: output_dir.into(),
            overlays: vec![RenderMode::Heatmap, RenderMode::ScanPath, RenderMode::Fixations],
        })
    }

    /// Render only these overlays; an empty list keeps all three
    #[must_use]
    pub fn with_overlays(mut self, overlays: Vec<RenderMode>) -> Self {
        if !overlays.is_empty() {
            self.overlays = overlays;
        }
        self
    }

    /// Replay a recording end to end
    ///
    /// # Errors
    ///
    /// Fails if calibration is rejected, tracking yields no samples, or the
    /// result cannot be stored or rendered.
    pub fn run(&self, recording: &Recording) -> Result<ReplaySummary> {
        info!(
            "Replaying {} calibration and {} tracking samples",
            recording.calibration_samples.len(),
            recording.tracking_samples.len()
        );

        let mut source =
            ScriptedSampleSource::new("replay").with_existing_calibration(recording.use_stored_calibration);
        if let Some(domain) = recording.domain {
            source = source.with_domain(domain);
        }
        let emitter = source.emitter();

        let start = recording.tracking_samples.first().map_or(0, |p| p.timestamp);
        let clock = Arc::new(ManualClock::new(start));
        let session = EyeTrackingSession::with_clock(source, self.settings.clone(), clock.clone())?;
        session.on_transition(|t| info!("Session {} -> {}", t.from, t.to));

        if let Some(viewport) = recording.viewport {
            session.set_viewport(viewport)?;
        }
        session.set_image_bounds(recording.image_bounds)?;
        session.initialize()?;

        if recording.use_stored_calibration {
            session.restore_calibration()?;
        } else {
            session.start_calibration()?;
            emitter.emit_all(&recording.calibration_samples);
            let calibration = session.finish_calibration()?;
            info!(
                "Calibration: {} samples, confidence {:.2}, lighting {}, camera {}",
                calibration.points_collected,
                calibration.average_confidence,
                calibration.lighting_quality,
                calibration.camera_positioning
            );
            if calibration.eyeglasses_detected {
                warn!("Confidence dropouts suggest eyewear reflections");
            }
            if !calibration.is_valid {
                session.cancel();
                return Err(Error::InvalidInput(format!(
                    "Calibration rejected: {}",
                    calibration.error_message.unwrap_or_default()
                )));
            }
        }

        session.start_tracking()?;
        let window = recording.tracking_window(self.settings.session.duration());
        if window.len() < recording.tracking_samples.len() {
            warn!(
                "Session length of {}s reached; dropping {} later samples",
                self.settings.session.duration_secs,
                recording.tracking_samples.len() - window.len()
            );
        }
        let delivered = emitter.emit_all(window);
        clock.advance(Duration::from_millis(u64::try_from(span_ms(window)).unwrap_or(0)));
        let outcome = session.stop();
        session.cancel();

        let report = match outcome? {
            StopOutcome::Completed(report) => *report,
            StopOutcome::Empty | StopOutcome::AlreadyStopped => return Err(Error::EmptySession),
        };
        info!("Delivered {} tracking samples", delivered);

        let mut store = JsonFileStore::new(&self.output_dir)?;
        let session_id = persist(&mut store, &report)?;
        let images = self.render_overlays(&report, &recording.image_bounds)?;

        Ok(ReplaySummary {
            session_id,
            report,
            images,
        })
    }

    fn render_overlays(&self, report: &SessionReport, bounds: &ImageBounds) -> Result<Vec<PathBuf>> {
        let mut renderer = OverlayRenderer::new(self.settings.render.clone());
        let mut images = Vec::new();
        for &mode in &self.overlays {
            renderer.clear();
            renderer.render(mode, &report.result.scan_path, &report.result.fixation_points, bounds)?;
            let path = self.output_dir.join(format!("{}.png", mode.as_str()));
            renderer.save_png(&path)?;
            info!("Wrote {}", path.display());
            images.push(path);
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Recording {
        let calibration_samples = (0..40)
            .map(|i| GazePoint::new(f64::from(i % 8) * 140.0, f64::from(i / 8) * 250.0, i64::from(i) * 33, 0.9))
            .collect();
        let tracking_samples = (0..30)
            .map(|i| GazePoint::new(500.0 + f64::from(i % 2), 500.0, 10_000 + i64::from(i) * 20, 0.9))
            .collect();
        Recording {
            calibration_samples,
            tracking_samples,
            viewport: Some(Viewport::new(1920.0, 1080.0)),
            image_bounds: ImageBounds::new(0.0, 0.0, 1920.0, 1080.0, 1920.0, 1080.0),
            domain: Some(CalibrationDomain::new(0.0, 1000.0, 0.0, 1000.0).unwrap()),
            use_stored_calibration: false,
        }
    }

    #[test]
    fn test_recording_json_defaults() {
        let json = r#"{
            "trackingSamples": [{"x": 1.0, "y": 2.0, "timestamp": 5, "confidence": 0.8}],
            "imageBounds": {"x": 0, "y": 0, "width": 10, "height": 10, "naturalWidth": 10, "naturalHeight": 10}
        }"#;
        let recording = Recording::from_json(json).unwrap();
        assert!(recording.calibration_samples.is_empty());
        assert_eq!(recording.viewport, None);
        assert!(!recording.use_stored_calibration);
        assert_eq!(recording.tracking_span_ms(), 0);
    }

    #[test]
    fn test_replay_writes_result_and_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let app = ReplayApp::new(Config::default(), dir.path()).unwrap();
        let summary = app.run(&recording()).unwrap();

        assert_eq!(summary.report.parameters.raw_point_count, 30);
        assert_eq!(summary.report.result.session_duration, 580);
        assert_eq!(summary.report.result.fixation_points.len(), 1);
        assert_eq!(summary.images.len(), 3);
        assert!(summary.images.iter().all(|p| p.exists()));
        assert!(dir.path().join(format!("{}.json", summary.session_id)).exists());
    }

    #[test]
    fn test_replay_stops_at_configured_session_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recording();
        rec.tracking_samples = (0..100)
            .map(|i| GazePoint::new(500.0 + f64::from(i % 2), 500.0, 10_000 + i64::from(i) * 20, 0.9))
            .collect();
        assert_eq!(rec.tracking_window(Duration::from_secs(1)).len(), 51);

        let mut settings = Config::default();
        settings.session.duration_secs = 1;
        let app = ReplayApp::new(settings, dir.path()).unwrap();
        let summary = app.run(&rec).unwrap();

        assert_eq!(summary.report.parameters.raw_point_count, 51);
        assert_eq!(summary.report.result.session_duration, 1000);
    }

    #[test]
    fn test_selected_overlays_only() {
        let dir = tempfile::tempdir().unwrap();
        let app = ReplayApp::new(Config::default(), dir.path())
            .unwrap()
            .with_overlays(vec!["scanpath".parse().unwrap()]);
        let summary = app.run(&recording()).unwrap();
        assert_eq!(summary.images, vec![dir.path().join("scanpath.png")]);
        assert!(!dir.path().join("heatmap.png").exists());
    }

    #[test]
    fn test_oversized_heatmap_grid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Config::default();
        settings.heatmap.grid_size = 1 << 33;
        assert!(matches!(ReplayApp::new(settings, dir.path()), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_rejected_calibration_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recording();
        rec.calibration_samples.truncate(3);
        let app = ReplayApp::new(Config::default(), dir.path()).unwrap();
        assert!(matches!(app.run(&rec), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_stored_calibration_skips_calibration_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recording();
        rec.calibration_samples.clear();
        rec.use_stored_calibration = true;
        let app = ReplayApp::new(Config::default(), dir.path()).unwrap();
        assert!(app.run(&rec).is_ok());
    }
}
