//! Gaze sample source abstraction and the session-owned sample buffer.
//!
//! The estimator itself is a black box: it is switched between calibration
//! and tracking and pushes `GazePoint`s to registered listeners. The session
//! only ever appends those points to a [`SampleBuffer`].

use crate::{
    calibration::CalibrationTarget,
    types::{CalibrationDomain, GazePoint},
    Error, Result,
};
use log::{debug, info};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Callback invoked for every sample the source produces
pub type GazeListener = Arc<dyn Fn(GazePoint) + Send + Sync>;

/// Handle returned by `add_gaze_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A webcam-driven gaze estimator
pub trait GazeSampleSource: Send {
    /// Bring up the camera and estimator
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor cannot be started.
    fn initialize(&mut self) -> Result<()>;

    /// Enter free-viewing calibration
    ///
    /// # Errors
    ///
    /// Returns an error if the source rejects the mode switch.
    fn start_calibration(&mut self) -> Result<()>;

    /// Enter calibration against explicit on-screen targets
    ///
    /// # Errors
    ///
    /// Returns an error if the source rejects the mode switch.
    fn start_point_calibration(&mut self, targets: &[CalibrationTarget]) -> Result<()>;

    /// Start emitting tracking samples
    ///
    /// # Errors
    ///
    /// Returns an error if the source rejects the mode switch.
    fn start_tracking(&mut self) -> Result<()>;

    /// Stop tracking; sources that buffer internally return their samples here
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails.
    fn stop_tracking(&mut self) -> Result<Vec<GazePoint>>;

    fn add_gaze_listener(&mut self, listener: GazeListener) -> ListenerId;

    fn remove_gaze_listener(&mut self, id: ListenerId);

    /// Whether a previously stored calibration can be reused
    ///
    /// # Errors
    ///
    /// Returns an error if the stored calibration cannot be queried.
    fn has_existing_calibration(&self) -> Result<bool>;

    /// Estimator-space bounds seen during calibration, if the source tracks them
    fn calibration_domain(&self) -> Option<CalibrationDomain>;

    /// Release the camera
    fn stop_webcam(&mut self);

    /// Forget any stored calibration
    ///
    /// # Errors
    ///
    /// Returns an error if the stored calibration cannot be removed.
    fn clear_calibration_data(&mut self) -> Result<()>;

    /// Get source name
    fn name(&self) -> &str;
}

#[derive(Debug, Default)]
struct BufferState {
    points: Vec<GazePoint>,
    generation: u64,
    accepting: bool,
}

/// Append-only sample buffer for one calibration or tracking phase
///
/// Pushes are tagged with the generation the listener was issued under;
/// anything from another generation, or arriving after `seal`, is dropped.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    inner: Arc<Mutex<BufferState>>,
}

impl SampleBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh phase, discarding anything left over
    pub fn begin(&self, generation: u64) {
        let mut state = self.inner.lock();
        state.points.clear();
        state.generation = generation;
        state.accepting = true;
    }

    /// Append a sample; returns whether it was accepted
    pub fn push(&self, generation: u64, point: GazePoint) -> bool {
        let mut state = self.inner.lock();
        if !state.accepting || state.generation != generation {
            return false;
        }
        state.points.push(point);
        true
    }

    /// Close the phase and move its samples out
    pub fn seal(&self) -> Vec<GazePoint> {
        let mut state = self.inner.lock();
        state.accepting = false;
        std::mem::take(&mut state.points)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// A listener that feeds this buffer under `generation`
    #[must_use]
    pub fn listener(&self, generation: u64) -> GazeListener {
        let buffer = self.clone();
        Arc::new(move |point| {
            buffer.push(generation, point);
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceMode {
    Off,
    Idle,
    Calibrating,
    Tracking,
}

type ListenerTable = Arc<Mutex<Vec<(ListenerId, GazeListener)>>>;

/// Teardown and lifecycle call counters of a `ScriptedSampleSource`
#[derive(Debug, Clone, Default)]
pub struct SourceStats {
    initialize: Arc<AtomicUsize>,
    stop_tracking: Arc<AtomicUsize>,
    stop_webcam: Arc<AtomicUsize>,
    clear_calibration: Arc<AtomicUsize>,
}

impl SourceStats {
    #[must_use]
    pub fn initialize_calls(&self) -> usize {
        self.initialize.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_tracking_calls(&self) -> usize {
        self.stop_tracking.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_webcam_calls(&self) -> usize {
        self.stop_webcam.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn clear_calibration_calls(&self) -> usize {
        self.clear_calibration.load(Ordering::SeqCst)
    }
}

/// Pushes samples into a `ScriptedSampleSource`'s listeners from any thread
#[derive(Clone)]
pub struct SampleEmitter {
    listeners: ListenerTable,
    mode: Arc<Mutex<SourceMode>>,
}

impl SampleEmitter {
    /// Deliver one sample; returns false while the source is not producing
    pub fn emit(&self, point: GazePoint) -> bool {
        if matches!(*self.mode.lock(), SourceMode::Off | SourceMode::Idle) {
            return false;
        }
        let listeners: Vec<GazeListener> = self.listeners.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in &listeners {
            listener(point);
        }
        true
    }

    /// Deliver samples in order; returns how many were delivered
    pub fn emit_all(&self, points: &[GazePoint]) -> usize {
        points.iter().filter(|p| self.emit(**p)).count()
    }

    /// Whether the source is currently in tracking mode
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        *self.mode.lock() == SourceMode::Tracking
    }
}

impl fmt::Debug for SampleEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleEmitter")
            .field("listeners", &self.listeners.lock().len())
            .field("mode", &*self.mode.lock())
            .finish()
    }
}

/// In-process source driven by an external script of samples
///
/// Used by the replay tool and tests. Samples are pushed through the
/// [`SampleEmitter`] handle; `internal_samples` emulates estimators that
/// buffer internally and only hand their samples over at `stop_tracking`.
pub struct ScriptedSampleSource {
    name: String,
    listeners: ListenerTable,
    mode: Arc<Mutex<SourceMode>>,
    next_listener: u64,
    stats: SourceStats,
    init_failure: Option<String>,
    existing_calibration: bool,
    domain: Option<CalibrationDomain>,
    internal_samples: Vec<GazePoint>,
}

impl ScriptedSampleSource {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            listeners: Arc::new(Mutex::new(Vec::new())),
            mode: Arc::new(Mutex::new(SourceMode::Off)),
            next_listener: 0,
            stats: SourceStats::default(),
            init_failure: None,
            existing_calibration: false,
            domain: None,
            internal_samples: Vec::new(),
        }
    }

    /// Make `initialize` fail with the given reason
    #[must_use]
    pub fn failing_init(mut self, reason: &str) -> Self {
        self.init_failure = Some(reason.to_string());
        self
    }

    /// Pretend a calibration from an earlier run is stored
    #[must_use]
    pub const fn with_existing_calibration(mut self, existing: bool) -> Self {
        self.existing_calibration = existing;
        self
    }

    /// Report a fixed estimator-space domain
    #[must_use]
    pub const fn with_domain(mut self, domain: CalibrationDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Samples handed back from `stop_tracking`
    #[must_use]
    pub fn with_internal_samples(mut self, samples: Vec<GazePoint>) -> Self {
        self.internal_samples = samples;
        self
    }

    #[must_use]
    pub fn emitter(&self) -> SampleEmitter {
        SampleEmitter {
            listeners: Arc::clone(&self.listeners),
            mode: Arc::clone(&self.mode),
        }
    }

    #[must_use]
    pub fn stats(&self) -> SourceStats {
        self.stats.clone()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn switch_mode(&self, required: &[SourceMode], to: SourceMode) -> Result<()> {
        let mut mode = self.mode.lock();
        if !required.contains(&*mode) {
            return Err(Error::SampleSource(format!(
                "{}: cannot switch from {:?} to {:?}",
                self.name, *mode, to
            )));
        }
        debug!("{}: {:?} -> {:?}", self.name, *mode, to);
        *mode = to;
        Ok(())
    }
}

impl GazeSampleSource for ScriptedSampleSource {
    fn initialize(&mut self) -> Result<()> {
        self.stats.initialize.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.init_failure {
            return Err(Error::Initialization(reason.clone()));
        }
        *self.mode.lock() = SourceMode::Idle;
        info!("{}: sensor ready", self.name);
        Ok(())
    }

    fn start_calibration(&mut self) -> Result<()> {
        self.switch_mode(&[SourceMode::Idle, SourceMode::Calibrating], SourceMode::Calibrating)
    }

    fn start_point_calibration(&mut self, targets: &[CalibrationTarget]) -> Result<()> {
        debug!("{}: point calibration over {} targets", self.name, targets.len());
        self.switch_mode(&[SourceMode::Idle, SourceMode::Calibrating], SourceMode::Calibrating)
    }

    fn start_tracking(&mut self) -> Result<()> {
        self.switch_mode(&[SourceMode::Idle, SourceMode::Calibrating], SourceMode::Tracking)
    }

    fn stop_tracking(&mut self) -> Result<Vec<GazePoint>> {
        self.stats.stop_tracking.fetch_add(1, Ordering::SeqCst);
        self.switch_mode(&[SourceMode::Tracking], SourceMode::Idle)?;
        Ok(std::mem::take(&mut self.internal_samples))
    }

    fn add_gaze_listener(&mut self, listener: GazeListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_gaze_listener(&mut self, id: ListenerId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }

    fn has_existing_calibration(&self) -> Result<bool> {
        Ok(self.existing_calibration)
    }

    fn calibration_domain(&self) -> Option<CalibrationDomain> {
        self.domain
    }

    fn stop_webcam(&mut self) {
        self.stats.stop_webcam.fetch_add(1, Ordering::SeqCst);
        *self.mode.lock() = SourceMode::Off;
        self.listeners.lock().clear();
    }

    fn clear_calibration_data(&mut self) -> Result<()> {
        self.stats.clear_calibration.fetch_add(1, Ordering::SeqCst);
        self.existing_calibration = false;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: i64) -> GazePoint {
        GazePoint::new(1.0, 2.0, t, 0.9)
    }

    #[test]
    fn test_buffer_rejects_stale_generation() {
        let buffer = SampleBuffer::new();
        buffer.begin(2);
        assert!(buffer.push(2, point(0)));
        assert!(!buffer.push(1, point(1)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_seal_moves_samples_out_and_closes() {
        let buffer = SampleBuffer::new();
        buffer.begin(1);
        buffer.push(1, point(0));
        buffer.push(1, point(1));

        let sealed = buffer.seal();
        assert_eq!(sealed.len(), 2);
        assert!(buffer.is_empty());
        assert!(!buffer.push(1, point(2)));
    }

    #[test]
    fn test_begin_discards_previous_phase() {
        let buffer = SampleBuffer::new();
        buffer.begin(1);
        buffer.push(1, point(0));
        buffer.begin(2);
        assert!(buffer.is_empty());
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn test_emitter_reaches_listeners_only_while_active() {
        let mut source = ScriptedSampleSource::new("scripted");
        let emitter = source.emitter();
        let buffer = SampleBuffer::new();
        buffer.begin(1);
        let id = source.add_gaze_listener(buffer.listener(1));

        assert!(!emitter.emit(point(0)));
        source.initialize().unwrap();
        source.start_tracking().unwrap();
        assert!(emitter.is_tracking());
        assert_eq!(emitter.emit_all(&[point(1), point(2)]), 2);
        assert_eq!(buffer.len(), 2);

        source.remove_gaze_listener(id);
        emitter.emit(point(3));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_stop_tracking_counts_and_returns_internal_samples() {
        let mut source = ScriptedSampleSource::new("scripted").with_internal_samples(vec![point(5)]);
        let stats = source.stats();
        source.initialize().unwrap();
        source.start_tracking().unwrap();

        assert_eq!(source.stop_tracking().unwrap().len(), 1);
        assert!(source.stop_tracking().is_err());
        assert_eq!(stats.stop_tracking_calls(), 2);
    }

    #[test]
    fn test_init_failure() {
        let mut source = ScriptedSampleSource::new("scripted").failing_init("camera permission denied");
        assert!(matches!(source.initialize(), Err(Error::Initialization(_))));
        assert_eq!(source.stats().initialize_calls(), 1);
    }

    #[test]
    fn test_stop_webcam_drops_listeners() {
        let mut source = ScriptedSampleSource::new("scripted");
        source.add_gaze_listener(Arc::new(|_| {}));
        source.stop_webcam();
        assert_eq!(source.listener_count(), 0);
        assert_eq!(source.stats().stop_webcam_calls(), 1);
    }
}
