//! Stop-time reduction of a raw tracking buffer and hand-off to storage.
//!
//! `reduce` runs the stages in a fixed order: map into image space, validate,
//! detect fixations on the validated subset, then bin the heatmap grid.
//! Persistence is a separate step (`persist`) so callers decide when and
//! where results are stored.

use crate::{
    config::Config,
    fixation::FixationDetector,
    heatmap::HeatmapGrid,
    mapping::CoordinateMapper,
    types::{CalibrationDomain, EyeTrackingSessionResult, GazePoint, ImageBounds, Viewport},
    validation::{GazeDataValidator, ValidationReport},
    Error, Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Bookkeeping stored alongside a session result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParameters {
    /// Tracking time in milliseconds
    pub session_duration: i64,
    pub raw_point_count: usize,
    pub valid_point_count: usize,
    pub validation_issues: Vec<String>,
}

/// Everything produced by reducing one tracking session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub result: EyeTrackingSessionResult,
    pub validation: ValidationReport,
    pub parameters: SessionParameters,
}

/// Reduce a raw estimator-space buffer into a session result
///
/// # Errors
///
/// Returns `Error::EmptySession` for an empty buffer, or `Error::InvalidInput`
/// if the domain, viewport, or bounds are degenerate.
pub fn reduce(
    raw: &[GazePoint],
    domain: Option<CalibrationDomain>,
    viewport: Viewport,
    bounds: &ImageBounds,
    session_duration: i64,
    config: &Config,
) -> Result<SessionReport> {
    if raw.is_empty() {
        return Err(Error::EmptySession);
    }

    let mapper = CoordinateMapper::new(domain, viewport)?;
    let mapped = mapper.map_points(raw, bounds)?;

    let validation = GazeDataValidator::new(config.validation.clone()).validate(&mapped, bounds);
    if !validation.issues.is_empty() {
        warn!("Session data issues: {}", validation.issues.join("; "));
    }

    let fixations = FixationDetector::from_config(&config.fixation).detect(&validation.valid_points);
    let grid = HeatmapGrid::from_points(&validation.valid_points, bounds, config.heatmap.grid_size)?;
    debug!(
        "Heatmap grid {}x{}: {} samples binned, busiest cell {}",
        grid.size(),
        grid.size(),
        grid.total(),
        grid.max_count()
    );

    let parameters = SessionParameters {
        session_duration,
        raw_point_count: raw.len(),
        valid_point_count: validation.valid_points.len(),
        validation_issues: validation.issues.clone(),
    };
    let result = EyeTrackingSessionResult {
        gaze_points: validation.valid_points.clone(),
        fixation_points: fixations,
        scan_path: validation.valid_points.clone(),
        session_duration,
        heatmap_data: Some(grid.to_rows()),
    };

    info!(
        "Reduced {} raw samples to {} valid points and {} fixations over {} ms",
        parameters.raw_point_count,
        parameters.valid_point_count,
        result.fixation_points.len(),
        session_duration
    );

    Ok(SessionReport {
        result,
        validation,
        parameters,
    })
}

/// Opaque identifier assigned by a session store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record written by the bundled stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub id: SessionId,
    pub result: EyeTrackingSessionResult,
    pub parameters: SessionParameters,
}

/// Persistence collaborator for finished sessions
pub trait SessionStore {
    /// Store a result and return the id it can be retrieved under
    ///
    /// # Errors
    ///
    /// Returns `Error::Persistence` if the store rejects the result.
    fn save(&mut self, result: &EyeTrackingSessionResult, parameters: &SessionParameters) -> Result<SessionId>;
}

/// Hand a reduced session to a store
///
/// # Errors
///
/// Propagates the store's error.
pub fn persist(store: &mut dyn SessionStore, report: &SessionReport) -> Result<SessionId> {
    let id = store.save(&report.result, &report.parameters)?;
    info!("Stored session {}", id);
    Ok(id)
}

/// Keeps sessions in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Vec<StoredSession>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sessions(&self) -> &[StoredSession] {
        &self.sessions
    }

    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<&StoredSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&mut self, result: &EyeTrackingSessionResult, parameters: &SessionParameters) -> Result<SessionId> {
        let id = SessionId::new(format!("memory-{}", self.sessions.len() + 1));
        self.sessions.push(StoredSession {
            id: id.clone(),
            result: result.clone(),
            parameters: parameters.clone(),
        });
        Ok(id)
    }
}

/// Writes each session as `<id>.json` into a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Read a stored session back
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a stored session.
    pub fn load(&self, id: &SessionId) -> Result<StoredSession> {
        let content = std::fs::read_to_string(self.path_for(id))?;
        serde_json::from_str(&content).map_err(|e| Error::Persistence(format!("Failed to parse session {id}: {e}")))
    }

    fn next_id(&self) -> SessionId {
        let mut n = 1usize;
        loop {
            let id = SessionId::new(format!("session-{n:04}"));
            if !self.path_for(&id).exists() {
                return id;
            }
            n += 1;
        }
    }
}

impl SessionStore for JsonFileStore {
    fn save(&mut self, result: &EyeTrackingSessionResult, parameters: &SessionParameters) -> Result<SessionId> {
        let id = self.next_id();
        let record = StoredSession {
            id: id.clone(),
            result: result.clone(),
            parameters: parameters.clone(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| Error::Persistence(format!("Failed to serialize session: {e}")))?;
        let path = self.path_for(&id);
        std::fs::write(&path, json)?;
        debug!("Wrote {}", path.display());
        Ok(id)
    }
}
