//! Eye-tracking session state machine.
//!
//! `EyeTrackingSession` owns the sample source and drives it through
//!
//! ```text
//! Uninitialized -> Initializing -> Initialized -> Calibrating -> Calibrated
//!                                        ^              |            |
//!                                        +--------------+            v
//!                                          (rejected)     Tracking -> Stopping -> Calibrated
//! ```
//!
//! Every calibration or tracking phase is issued a new generation number.
//! Gaze listeners and countdown callbacks carry the generation they were
//! created under, so anything left over from an earlier phase is ignored.
//!
//! Stopping is guarded by an atomic flag on the session rather than by the
//! state value: the first of any number of concurrent `stop` requests (manual
//! or countdown expiry) tears the source down and reduces the buffer, the
//! rest return [`StopOutcome::AlreadyStopped`].
//!
//! Methods take `&self`; share the session with `Arc` to stop it from another
//! thread or to run a countdown.

use crate::{
    calibration::{CalibrationProgress, CalibrationTarget, CalibrationValidator},
    clock::{Clock, SystemClock},
    config::Config,
    countdown::CountdownTimer,
    pipeline::{self, SessionReport},
    sample_source::{GazeSampleSource, ListenerId, SampleBuffer},
    types::{CalibrationDomain, CalibrationResult, GazePoint, ImageBounds, Viewport},
    Error, Result,
};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Initialized,
    Calibrating,
    Calibrated,
    Tracking,
    Stopping,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Calibrating => "calibrating",
            Self::Calibrated => "calibrated",
            Self::Tracking => "tracking",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change, as announced to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    /// Generation current when the transition happened
    pub generation: u64,
}

/// Subscriber callback for state changes
pub type TransitionListener = Arc<dyn Fn(&Transition) + Send + Sync>;

/// How the current calibration was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStatus {
    /// Collected in this session and accepted by the validator
    Validated(CalibrationResult),
    /// Reused from a calibration the source had stored
    Restored,
}

/// Result of a stop request
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The session was reduced
    Completed(Box<SessionReport>),
    /// Tracking ended without a single sample
    Empty,
    /// Another stop request already finalized this session
    AlreadyStopped,
}

impl StopOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&SessionReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<SessionReport> {
        match self {
            Self::Completed(report) => Some(*report),
            _ => None,
        }
    }
}

/// Raw samples kept after a stop whose reduction could not run
struct PendingReduction {
    raw: Vec<GazePoint>,
    session_duration: i64,
}

struct Inner {
    state: SessionState,
    calibration: Option<CalibrationStatus>,
    domain: Option<CalibrationDomain>,
    viewport: Viewport,
    image_bounds: Option<ImageBounds>,
    listener: Option<ListenerId>,
    progress: Option<CalibrationProgress>,
    tracking_started_at: Option<i64>,
    pending: Option<PendingReduction>,
    expired_report: Option<SessionReport>,
}

/// Gaze acquisition session around one sample source
pub struct EyeTrackingSession<S: GazeSampleSource> {
    config: Config,
    validator: CalibrationValidator,
    source: Mutex<S>,
    inner: Mutex<Inner>,
    buffer: SampleBuffer,
    generation: AtomicU64,
    stopping: AtomicBool,
    disposed: AtomicBool,
    countdown: Mutex<Option<CountdownTimer>>,
    subscribers: Mutex<Vec<TransitionListener>>,
    clock: Arc<dyn Clock>,
}

impl<S: GazeSampleSource> EyeTrackingSession<S> {
    /// Create a session timed by the system clock
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is out of range.
    pub fn new(source: S, config: Config) -> Result<Self> {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    /// Create a session with an explicit time source
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is out of range.
    pub fn with_clock(source: S, config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let viewport = config.viewport.to_viewport();
        Ok(Self {
            validator: CalibrationValidator::new(config.calibration.clone()),
            config,
            source: Mutex::new(source),
            inner: Mutex::new(Inner {
                state: SessionState::Uninitialized,
                calibration: None,
                domain: None,
                viewport,
                image_bounds: None,
                listener: None,
                progress: None,
                tracking_started_at: None,
                pending: None,
                expired_report: None,
            }),
            buffer: SampleBuffer::new(),
            generation: AtomicU64::new(0),
            stopping: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            countdown: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            clock,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Generation of the current (or most recent) phase
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn calibration(&self) -> Option<CalibrationStatus> {
        self.inner.lock().calibration.clone()
    }

    #[must_use]
    pub fn calibration_domain(&self) -> Option<CalibrationDomain> {
        self.inner.lock().domain
    }

    #[must_use]
    pub fn calibration_progress(&self) -> Option<CalibrationProgress> {
        self.inner.lock().progress.clone()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.inner.lock().viewport
    }

    #[must_use]
    pub fn image_bounds(&self) -> Option<ImageBounds> {
        self.inner.lock().image_bounds
    }

    /// Samples collected so far in the current phase
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Whether a stop left raw samples waiting for `retry_reduction`
    #[must_use]
    pub fn has_pending_reduction(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    /// Time left on the running countdown
    #[must_use]
    pub fn countdown_remaining(&self) -> Option<Duration> {
        self.countdown.lock().as_ref().map(CountdownTimer::remaining)
    }

    /// Report produced when the countdown ended the session
    pub fn take_expired_report(&self) -> Option<SessionReport> {
        self.inner.lock().expired_report.take()
    }

    /// Run a closure against the sample source
    pub fn with_source<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.source.lock())
    }

    /// Subscribe to state changes
    ///
    /// Subscribers run synchronously on the thread that caused the
    /// transition, after the session's internal locks are released.
    pub fn on_transition<F>(&self, listener: F)
    where
        F: Fn(&Transition) + Send + Sync + 'static,
    {
        self.subscribers.lock().push(Arc::new(listener));
    }

    /// Rendered image geometry, reported by the consumer on layout changes
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for degenerate bounds.
    pub fn set_image_bounds(&self, bounds: ImageBounds) -> Result<()> {
        bounds.validate()?;
        self.inner.lock().image_bounds = Some(bounds);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty viewport.
    pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        viewport.validate()?;
        self.inner.lock().viewport = viewport;
        Ok(())
    }

    /// Bring up the sample source
    ///
    /// # Errors
    ///
    /// Returns `Error::Initialization` if the source fails (the session drops
    /// back to `Uninitialized`), or `Error::InvalidTransition` if already
    /// initialized.
    pub fn initialize(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            if inner.state != SessionState::Uninitialized {
                return Err(invalid(inner.state, "initialize"));
            }
            let t = self.transition(&mut inner, SessionState::Initializing);
            drop(inner);
            self.announce(&[t]);
        }
        self.disposed.store(false, Ordering::SeqCst);

        let outcome = self.source.lock().initialize();

        let mut inner = self.inner.lock();
        let (t, result) = match outcome {
            Ok(()) => {
                info!("Gaze sample source ready");
                (self.transition(&mut inner, SessionState::Initialized), Ok(()))
            }
            Err(e) => {
                warn!("Gaze sample source failed to initialize: {}", e);
                let e = match e {
                    Error::Initialization(_) => e,
                    other => Error::Initialization(other.to_string()),
                };
                (self.transition(&mut inner, SessionState::Uninitialized), Err(e))
            }
        };
        drop(inner);
        self.announce(&[t]);
        result
    }

    /// Start free-viewing calibration; returns the phase generation
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless `Initialized`, or the
    /// source's error if it rejects the mode switch.
    pub fn start_calibration(&self) -> Result<u64> {
        self.begin_calibration(None)
    }

    /// Start calibration against explicit targets; returns the phase generation
    ///
    /// Each target must be confirmed `confirmations_per_target` times before
    /// `finish_calibration` will evaluate the samples.
    ///
    /// # Errors
    ///
    /// As `start_calibration`, plus `Error::InvalidInput` for an empty target list.
    pub fn start_point_calibration(&self, targets: &[CalibrationTarget]) -> Result<u64> {
        if targets.is_empty() {
            return Err(Error::InvalidInput("Point calibration needs at least one target".to_string()));
        }
        self.begin_calibration(Some(targets.to_vec()))
    }

    fn begin_calibration(&self, targets: Option<Vec<CalibrationTarget>>) -> Result<u64> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Initialized {
            return Err(invalid(inner.state, "start calibration"));
        }

        let generation = self.next_generation();
        self.buffer.begin(generation);
        {
            let mut source = self.source.lock();
            let id = source.add_gaze_listener(self.buffer.listener(generation));
            let started = match &targets {
                Some(targets) => source.start_point_calibration(targets),
                None => source.start_calibration(),
            };
            if let Err(e) = started {
                source.remove_gaze_listener(id);
                self.buffer.seal();
                return Err(e);
            }
            inner.listener = Some(id);
        }

        inner.progress = targets.map(|t| CalibrationProgress::new(t, self.config.calibration.confirmations_per_target));
        let t = self.transition(&mut inner, SessionState::Calibrating);
        drop(inner);
        self.announce(&[t]);
        info!("Calibration started (generation {})", generation);
        Ok(generation)
    }

    /// Confirm one point-calibration target; returns whether it is complete
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` outside calibration and
    /// `Error::InvalidInput` for free-viewing calibration or an unknown target.
    pub fn confirm_calibration_target(&self, index: usize) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Calibrating {
            return Err(invalid(inner.state, "confirm a calibration target"));
        }
        let progress = inner
            .progress
            .as_mut()
            .ok_or_else(|| Error::InvalidInput("Calibration is not target-based".to_string()))?;
        let done = progress.confirm(index)?;
        debug!("Calibration target {} confirmed, {} confirmations outstanding", index, progress.remaining());
        Ok(done)
    }

    /// Evaluate the calibration window
    ///
    /// An accepted calibration moves to `Calibrated`; a rejected one returns
    /// to `Initialized` with `is_valid == false` so calibration can be retried.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` outside calibration, or
    /// `Error::CalibrationIncomplete` while point targets are unconfirmed.
    pub fn finish_calibration(&self) -> Result<CalibrationResult> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Calibrating {
            return Err(invalid(inner.state, "finish calibration"));
        }
        if let Some(progress) = &inner.progress {
            if !progress.is_complete() {
                return Err(Error::CalibrationIncomplete {
                    remaining: progress.remaining(),
                });
            }
        }

        let mut source = self.source.lock();
        if let Some(id) = inner.listener.take() {
            source.remove_gaze_listener(id);
        }
        let samples = self.buffer.seal();
        let reported = source.calibration_domain();
        let result = self
            .validator
            .validate_in_domain(&samples, reported.as_ref(), &inner.viewport);
        inner.progress = None;

        let t = if result.is_valid {
            inner.domain = reported.or_else(|| CalibrationDomain::from_points(&samples));
            drop(source);
            inner.calibration = Some(CalibrationStatus::Validated(result.clone()));
            self.transition(&mut inner, SessionState::Calibrated)
        } else {
            drop(source);
            inner.calibration = None;
            inner.domain = None;
            self.transition(&mut inner, SessionState::Initialized)
        };
        drop(inner);
        self.announce(&[t]);
        Ok(result)
    }

    /// Reuse a calibration the source has stored from an earlier run
    ///
    /// # Errors
    ///
    /// Returns `Error::NotCalibrated` if the source has none, or
    /// `Error::InvalidTransition` unless `Initialized`.
    pub fn restore_calibration(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Initialized {
            return Err(invalid(inner.state, "restore calibration"));
        }
        {
            let source = self.source.lock();
            if !source.has_existing_calibration()? {
                return Err(Error::NotCalibrated);
            }
            inner.domain = source.calibration_domain();
        }
        if inner.domain.is_none() {
            warn!("Restored calibration has no estimator domain; mapping will be approximate");
        }
        inner.calibration = Some(CalibrationStatus::Restored);
        let t = self.transition(&mut inner, SessionState::Calibrated);
        drop(inner);
        self.announce(&[t]);
        info!("Reusing stored calibration");
        Ok(())
    }

    /// Discard the current calibration so it can be redone
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless `Calibrated`, or the
    /// source's error if its stored calibration cannot be cleared.
    pub fn recalibrate(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Calibrated {
            return Err(invalid(inner.state, "recalibrate"));
        }
        self.source.lock().clear_calibration_data()?;
        inner.calibration = None;
        inner.domain = None;
        let t = self.transition(&mut inner, SessionState::Initialized);
        drop(inner);
        self.announce(&[t]);
        Ok(())
    }

    /// Start a tracking phase; returns its generation
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionConflict` if tracking is already running,
    /// `Error::NotCalibrated` without a valid calibration, or
    /// `Error::InvalidTransition` from any other state.
    pub fn start_tracking(&self) -> Result<u64> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Calibrated if inner.calibration.is_some() => {}
            SessionState::Calibrated | SessionState::Initialized => return Err(Error::NotCalibrated),
            SessionState::Tracking => {
                return Err(Error::SessionConflict("A tracking session is already running".to_string()))
            }
            other => return Err(invalid(other, "start tracking")),
        }

        let generation = self.next_generation();
        self.buffer.begin(generation);
        {
            let mut source = self.source.lock();
            let id = source.add_gaze_listener(self.buffer.listener(generation));
            if let Err(e) = source.start_tracking() {
                source.remove_gaze_listener(id);
                self.buffer.seal();
                return Err(e);
            }
            inner.listener = Some(id);
        }

        inner.tracking_started_at = Some(self.clock.now_millis());
        if let Some(discarded) = inner.pending.take() {
            warn!(
                "Discarding {} raw samples from a stop that was never reduced",
                discarded.raw.len()
            );
        }
        inner.expired_report = None;
        self.stopping.store(false, Ordering::SeqCst);
        let t = self.transition(&mut inner, SessionState::Tracking);
        drop(inner);
        self.announce(&[t]);
        info!("Tracking started (generation {})", generation);
        Ok(generation)
    }

    /// Stop tracking and reduce the collected samples
    ///
    /// Safe to call repeatedly and from several threads at once: exactly one
    /// call tears the source down and produces the outcome, the others get
    /// `StopOutcome::AlreadyStopped`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingGeometry` if no image bounds are known (the raw
    /// samples are kept for `retry_reduction`), `Error::InvalidTransition` if
    /// the session was never tracking, or a reduction error.
    pub fn stop(&self) -> Result<StopOutcome> {
        self.cancel_countdown();
        self.finish_tracking()
    }

    /// Reduce the samples kept by a stop that had no usable geometry
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingGeometry` if bounds are still unknown, or
    /// `Error::InvalidInput` if nothing is pending.
    pub fn retry_reduction(&self) -> Result<SessionReport> {
        let mut inner = self.inner.lock();
        let pending = inner
            .pending
            .take()
            .ok_or_else(|| Error::InvalidInput("No stopped session is waiting for reduction".to_string()))?;
        self.reduce_locked(&mut inner, pending.raw, pending.session_duration)
    }

    /// Abandon the session: release the camera without reducing anything
    ///
    /// Returns to `Uninitialized` from any state.
    pub fn cancel(&self) {
        self.cancel_countdown();

        let mut inner = self.inner.lock();
        {
            let mut source = self.source.lock();
            if let Some(id) = inner.listener.take() {
                source.remove_gaze_listener(id);
            }
            if inner.state == SessionState::Tracking && !self.stopping.swap(true, Ordering::SeqCst) {
                if let Err(e) = source.stop_tracking() {
                    warn!("{} failed to stop tracking: {}", source.name(), e);
                }
            }
            source.stop_webcam();
        }
        self.buffer.seal();

        inner.calibration = None;
        inner.domain = None;
        inner.progress = None;
        inner.tracking_started_at = None;
        inner.pending = None;
        inner.expired_report = None;
        let t = (inner.state != SessionState::Uninitialized)
            .then(|| self.transition(&mut inner, SessionState::Uninitialized));
        self.disposed.store(true, Ordering::SeqCst);
        drop(inner);

        if let Some(t) = t {
            self.announce(&[t]);
        }
        info!("Session cancelled, camera released");
    }

    /// Countdown expiry; ignored unless `generation` is still current
    fn expire(&self, generation: u64) -> Result<StopOutcome> {
        if generation != self.generation() {
            debug!("Ignoring countdown from superseded generation {}", generation);
            return Ok(StopOutcome::AlreadyStopped);
        }
        self.cancel_countdown();
        self.finish_tracking()
    }

    fn finish_tracking(&self) -> Result<StopOutcome> {
        if self.stopping.swap(true, Ordering::SeqCst) {
            debug!("Stop already handled");
            return Ok(StopOutcome::AlreadyStopped);
        }

        let mut inner = self.inner.lock();
        if inner.state != SessionState::Tracking {
            let from = inner.state;
            drop(inner);
            self.stopping.store(false, Ordering::SeqCst);
            return Err(invalid(from, "stop tracking"));
        }
        let t = self.transition(&mut inner, SessionState::Stopping);
        let listener = inner.listener.take();
        let started_at = inner.tracking_started_at.take();
        drop(inner);
        self.announce(&[t]);

        let fallback = {
            let mut source = self.source.lock();
            if let Some(id) = listener {
                source.remove_gaze_listener(id);
            }
            source.stop_tracking().unwrap_or_else(|e| {
                warn!("{} failed to stop tracking: {}", source.name(), e);
                Vec::new()
            })
        };

        let mut raw = self.buffer.seal();
        if raw.is_empty() && !fallback.is_empty() {
            debug!("No listener samples; using {} samples returned by the source", fallback.len());
            raw = fallback;
        }
        let session_duration = started_at.map_or(0, |start| (self.clock.now_millis() - start).max(0));

        let mut inner = self.inner.lock();
        if inner.state != SessionState::Stopping {
            // Cancelled while the source was being torn down
            return Ok(StopOutcome::AlreadyStopped);
        }
        let t = self.transition(&mut inner, SessionState::Calibrated);
        let outcome = if raw.is_empty() {
            warn!("Tracking stopped without collecting any gaze samples");
            Ok(StopOutcome::Empty)
        } else {
            debug!("Reducing {} samples from {} ms of tracking", raw.len(), session_duration);
            self.reduce_locked(&mut inner, raw, session_duration)
                .map(|report| StopOutcome::Completed(Box::new(report)))
        };
        drop(inner);
        self.announce(&[t]);
        outcome
    }

    fn reduce_locked(&self, inner: &mut Inner, raw: Vec<GazePoint>, session_duration: i64) -> Result<SessionReport> {
        let Some(bounds) = inner.image_bounds else {
            warn!("Image bounds unknown; keeping {} raw samples for a retry", raw.len());
            inner.pending = Some(PendingReduction { raw, session_duration });
            return Err(Error::MissingGeometry);
        };
        match pipeline::reduce(&raw, inner.domain, inner.viewport, &bounds, session_duration, &self.config) {
            Ok(report) => Ok(report),
            Err(e) => {
                inner.pending = Some(PendingReduction { raw, session_duration });
                Err(e)
            }
        }
    }

    fn cancel_countdown(&self) {
        if let Some(mut timer) = self.countdown.lock().take() {
            timer.cancel();
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn transition(&self, inner: &mut Inner, to: SessionState) -> Transition {
        let t = Transition {
            from: inner.state,
            to,
            generation: self.generation(),
        };
        debug!("Session {} -> {}", t.from, t.to);
        inner.state = to;
        t
    }

    fn announce(&self, transitions: &[Transition]) {
        let subscribers: Vec<TransitionListener> = self.subscribers.lock().clone();
        for t in transitions {
            for subscriber in &subscribers {
                subscriber(t);
            }
        }
    }
}

impl<S: GazeSampleSource + 'static> EyeTrackingSession<S> {
    /// Run a countdown that stops the current tracking phase at zero
    ///
    /// Expiry goes through the same guarded stop path as `stop`; a completed
    /// report is available from `take_expired_report`. Starting a new
    /// countdown replaces the previous one.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless tracking.
    pub fn start_countdown(self: &Arc<Self>, duration: Duration) -> Result<()> {
        let generation = {
            let inner = self.inner.lock();
            if inner.state != SessionState::Tracking {
                return Err(invalid(inner.state, "start a countdown"));
            }
            self.generation()
        };

        let session: Weak<Self> = Arc::downgrade(self);
        let timer = CountdownTimer::spawn(
            duration,
            self.config.session.tick_interval(),
            |remaining| debug!("{}s of tracking left", remaining.as_secs()),
            move || {
                let Some(session) = session.upgrade() else {
                    return;
                };
                match session.expire(generation) {
                    Ok(StopOutcome::Completed(report)) => {
                        info!("Countdown finished the session");
                        session.inner.lock().expired_report = Some(*report);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Countdown stop failed: {}", e),
                }
            },
        );

        if let Some(mut previous) = self.countdown.lock().replace(timer) {
            previous.cancel();
        }
        info!("Countdown of {}s started", duration.as_secs());
        Ok(())
    }

    /// Run the countdown for the configured session length
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless tracking.
    pub fn start_session_countdown(self: &Arc<Self>) -> Result<()> {
        self.start_countdown(self.config.session.duration())
    }
}

impl<S: GazeSampleSource> Drop for EyeTrackingSession<S> {
    fn drop(&mut self) {
        if !self.disposed.load(Ordering::SeqCst) && self.inner.get_mut().state != SessionState::Uninitialized {
            self.cancel();
        }
    }
}

const fn invalid(from: SessionState, action: &'static str) -> Error {
    Error::InvalidTransition { from, action }
}
