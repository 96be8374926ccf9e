//! Animation engine
//!
//! One animation slot driven by a background thread. The slot moves
//! Idle -> Running -> Stopping -> Idle; starting while Running stops and joins
//! the old loop before the new one is prepared, so two loops never write at
//! the same time. Every write goes through [`KeyboardState`].
//!
//! A failing tick is logged and counted, the loop keeps going. A failure while
//! starting (bad parameters, unsupported target) is returned to the caller and
//! the slot stays Idle.

mod pulse;
mod random;
mod wave;

pub use pulse::PulseParams;
pub use random::RandomParams;
pub use wave::WaveParams;

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use sysrgb_keyboard::{KeyboardError, KeyboardState};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Random,
    Wave,
    Pulse,
}

impl AnimationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Random => "random",
            AnimationKind::Wave => "wave",
            AnimationKind::Pulse => "pulse",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An animation with its parameters
#[derive(Debug, Clone)]
pub enum Animation {
    Random(RandomParams),
    Wave(WaveParams),
    Pulse(PulseParams),
}

impl Animation {
    pub fn kind(&self) -> AnimationKind {
        match self {
            Animation::Random(_) => AnimationKind::Random,
            Animation::Wave(_) => AnimationKind::Wave,
            Animation::Pulse(_) => AnimationKind::Pulse,
        }
    }

    /// Validate parameters and apply one-off setup, returning the loop body
    fn prepare(self, keyboard: &KeyboardState) -> Result<Box<dyn Animator>, AnimationError> {
        match self {
            Animation::Random(p) => Ok(Box::new(p.prepare(keyboard)?)),
            Animation::Wave(p) => Ok(Box::new(p.prepare(keyboard)?)),
            Animation::Pulse(p) => Ok(Box::new(p.prepare(keyboard)?)),
        }
    }
}

/// Errors raised when starting an animation
#[derive(Error, Debug)]
pub enum AnimationError {
    #[error(transparent)]
    Keyboard(#[from] KeyboardError),

    #[error("invalid {kind} parameters: {reason}")]
    InvalidParams { kind: AnimationKind, reason: String },

    #[error("failed to spawn animation thread")]
    Spawn(#[source] io::Error),
}

impl AnimationError {
    pub(crate) fn invalid(kind: AnimationKind, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            kind,
            reason: reason.into(),
        }
    }
}

fn check_interval(kind: AnimationKind, interval: Duration) -> Result<(), AnimationError> {
    if interval.is_zero() {
        return Err(AnimationError::invalid(kind, "interval must be non-zero"));
    }
    Ok(())
}

/// Loop body of a prepared animation
pub(crate) trait Animator: Send {
    /// Compute and write one frame
    fn tick(&mut self, keyboard: &KeyboardState) -> Result<(), KeyboardError>;

    /// Sleep between ticks
    fn interval(&self) -> Duration;
}

/// Cooperative cancellation signal shared with a loop thread
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake any sleeper
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `duration` or until cancelled. Returns true if cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = lock.lock();
        while !*cancelled {
            if cvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Tick and error counters of one run
#[derive(Debug, Default)]
pub struct RunStats {
    ticks: AtomicU64,
    errors: AtomicU64,
}

impl RunStats {
    /// Ticks executed so far, failed ones included
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Ticks whose writes failed
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }
}

/// Visible state of the animation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Idle,
    Running(AnimationKind),
    Stopping(AnimationKind),
}

/// Called with every failed tick, on the animation thread
pub type ErrorHook = Arc<dyn Fn(AnimationKind, &KeyboardError) + Send + Sync>;
/// Called after every tick, e.g. to refresh a view of the keyboard
pub type TickHook = Arc<dyn Fn(AnimationKind) + Send + Sync>;

struct Run {
    kind: AnimationKind,
    cancel: CancelToken,
    handle: JoinHandle<()>,
    stats: Arc<RunStats>,
}

/// Owner of the single animation slot
pub struct AnimationEngine {
    keyboard: Arc<KeyboardState>,
    // Serializes start/stop; held across the join
    slot: Mutex<Option<Run>>,
    status: Mutex<AnimationStatus>,
    on_error: Option<ErrorHook>,
    on_tick: Option<TickHook>,
}

impl AnimationEngine {
    pub fn new(keyboard: Arc<KeyboardState>) -> Self {
        Self {
            keyboard,
            slot: Mutex::new(None),
            status: Mutex::new(AnimationStatus::Idle),
            on_error: None,
            on_tick: None,
        }
    }

    /// Report failed ticks to `hook` in addition to the log.
    ///
    /// Hooks run on the animation thread. A hook must not call back into the
    /// engine: `stop` or `start` from there would wait on its own thread.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Call `hook` after every tick. Same restriction as
    /// [`with_error_hook`](Self::with_error_hook): never call into the engine.
    pub fn with_tick_hook(mut self, hook: TickHook) -> Self {
        self.on_tick = Some(hook);
        self
    }

    pub fn status(&self) -> AnimationStatus {
        *self.status.lock()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), AnimationStatus::Running(_))
    }

    /// Stop whatever is running, then start `animation`.
    ///
    /// Setup (parameter checks, the pulse base color) runs on the calling
    /// thread; its errors are returned and leave the slot Idle.
    pub fn start(&self, animation: Animation) -> Result<Arc<RunStats>, AnimationError> {
        let mut slot = self.slot.lock();
        self.stop_run(&mut slot);

        let kind = animation.kind();
        let animator = animation.prepare(&self.keyboard)?;

        let cancel = CancelToken::new();
        let stats = Arc::new(RunStats::default());
        let worker = Worker {
            kind,
            animator,
            keyboard: Arc::clone(&self.keyboard),
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
            on_error: self.on_error.clone(),
            on_tick: self.on_tick.clone(),
        };
        let handle = thread::Builder::new()
            .name(format!("animation-{kind}"))
            .spawn(move || worker.run())
            .map_err(AnimationError::Spawn)?;

        *self.status.lock() = AnimationStatus::Running(kind);
        *slot = Some(Run {
            kind,
            cancel,
            handle,
            stats: Arc::clone(&stats),
        });
        info!("Started {} animation", kind);
        Ok(stats)
    }

    /// Stop the running animation and wait for its thread to exit. No write
    /// from the old loop happens after this returns. Returns the run's
    /// counters, or `None` if nothing was running.
    pub fn stop(&self) -> Option<Arc<RunStats>> {
        let mut slot = self.slot.lock();
        self.stop_run(&mut slot)
    }

    fn stop_run(&self, slot: &mut Option<Run>) -> Option<Arc<RunStats>> {
        let run = slot.take()?;
        *self.status.lock() = AnimationStatus::Stopping(run.kind);
        run.cancel.cancel();
        if run.handle.join().is_err() {
            warn!("{} animation thread panicked", run.kind);
        }
        *self.status.lock() = AnimationStatus::Idle;
        info!(
            "Stopped {} animation after {} ticks ({} failed)",
            run.kind,
            run.stats.ticks(),
            run.stats.errors()
        );
        Some(run.stats)
    }
}

impl Drop for AnimationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    kind: AnimationKind,
    animator: Box<dyn Animator>,
    keyboard: Arc<KeyboardState>,
    cancel: CancelToken,
    stats: Arc<RunStats>,
    on_error: Option<ErrorHook>,
    on_tick: Option<TickHook>,
}

impl Worker {
    fn run(mut self) {
        debug!("{} animation loop running", self.kind);
        let interval = self.animator.interval();
        while !self.cancel.is_cancelled() {
            if let Err(e) = self.animator.tick(&self.keyboard) {
                self.stats.errors.fetch_add(1, Ordering::SeqCst);
                warn!("{} animation tick failed: {}", self.kind, e);
                if let Some(hook) = &self.on_error {
                    hook(self.kind, &e);
                }
            }
            self.stats.ticks.fetch_add(1, Ordering::SeqCst);
            if let Some(hook) = &self.on_tick {
                hook(self.kind);
            }
            if self.cancel.sleep(interval) {
                break;
            }
        }
        debug!("{} animation loop exited", self.kind);
    }
}
