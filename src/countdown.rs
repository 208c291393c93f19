//! Session countdown.
//!
//! `Countdown` is the pure bookkeeping; `CountdownTimer` runs it on a
//! background thread and fires a callback on expiry unless cancelled first.

use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Result of advancing a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(Duration),
    Expired,
}

/// Remaining-time bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total: Duration,
    remaining: Duration,
}

impl Countdown {
    #[must_use]
    pub const fn new(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Consume `elapsed` time
    pub fn tick(&mut self, elapsed: Duration) -> Tick {
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }
}

/// A countdown running on its own thread
///
/// Dropping the timer cancels it without waiting for the thread.
#[derive(Debug)]
pub struct CountdownTimer {
    cancelled: Arc<AtomicBool>,
    remaining_ms: Arc<AtomicU64>,
    wake: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Start counting down `total`, calling `on_tick` every `tick` and
    /// `on_expire` once at zero
    pub fn spawn<T, E>(total: Duration, tick: Duration, on_tick: T, on_expire: E) -> Self
    where
        T: Fn(Duration) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let remaining_ms = Arc::new(AtomicU64::new(duration_millis(total)));
        let (wake, rx) = mpsc::channel::<()>();
        let tick = if tick.is_zero() { total.max(Duration::from_millis(1)) } else { tick };

        let thread_cancelled = Arc::clone(&cancelled);
        let thread_remaining = Arc::clone(&remaining_ms);
        let handle = thread::spawn(move || {
            let mut countdown = Countdown::new(total);
            let mut last = Instant::now();
            while !countdown.is_expired() {
                match rx.recv_timeout(tick.min(countdown.remaining())) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // Any message or a dropped sender means cancel
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
                if thread_cancelled.load(Ordering::SeqCst) {
                    return;
                }
                let now = Instant::now();
                let state = countdown.tick(now - last);
                last = now;
                thread_remaining.store(duration_millis(countdown.remaining()), Ordering::SeqCst);
                if let Tick::Running(remaining) = state {
                    on_tick(remaining);
                }
            }
            if !thread_cancelled.load(Ordering::SeqCst) {
                debug!("Countdown of {:?} expired", total);
                on_expire();
            }
        });

        Self {
            cancelled,
            remaining_ms,
            wake: Some(wake),
            handle: Some(handle),
        }
    }

    /// Stop the countdown; `on_expire` will not run afterwards
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.take();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms.load(Ordering::SeqCst))
    }

    /// Wait for the countdown thread to finish
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Countdown thread panicked");
            }
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_countdown_ticks_to_expiry() {
        let mut countdown = Countdown::new(Duration::from_secs(3));
        assert_eq!(countdown.tick(Duration::from_secs(1)), Tick::Running(Duration::from_secs(2)));
        assert_eq!(countdown.tick(Duration::from_secs(1)), Tick::Running(Duration::from_secs(1)));
        assert_eq!(countdown.tick(Duration::from_secs(5)), Tick::Expired);
        assert!(countdown.is_expired());
        assert_eq!(countdown.total(), Duration::from_secs(3));
    }

    #[test]
    fn test_timer_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let timer = CountdownTimer::spawn(
            Duration::from_millis(30),
            Duration::from_millis(10),
            |_| {},
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        timer.join();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let mut timer = CountdownTimer::spawn(
            Duration::from_secs(10),
            Duration::from_secs(1),
            |_| {},
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        timer.cancel();
        assert!(timer.is_cancelled());
        timer.join();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remaining_reports_progress() {
        let timer = CountdownTimer::spawn(Duration::from_millis(40), Duration::from_millis(10), |_| {}, || {});
        assert!(timer.remaining() <= Duration::from_millis(40));
        timer.join();
    }
}
