//! Progress reporting with pace-blended time estimates.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use storyboard_core::{GenerationPhase, GenerationProgress};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

const PACE_WEIGHT: f64 = 0.7;
const BASELINE_WEIGHT: f64 = 0.3;
const TICK: Duration = Duration::from_secs(1);

/// Blended remaining-time estimate in seconds, never negative.
///
/// Weighs pace extrapolation (`elapsed / fraction`) at 70% and the static
/// baseline at 30%. With no progress yet, the baseline alone is used.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::estimate_remaining;
///
/// // Halfway after 50s against a 100s baseline: 0.7*100 + 0.3*100 - 50
/// assert_eq!(estimate_remaining(50.0, 0.5, 100.0), 50);
/// assert_eq!(estimate_remaining(10.0, 0.0, 100.0), 90);
/// ```
pub fn estimate_remaining(elapsed_secs: f64, fraction: f64, baseline_secs: f64) -> u64 {
    let remaining = if fraction <= 0.0 {
        baseline_secs - elapsed_secs
    } else {
        let projected = PACE_WEIGHT * (elapsed_secs / fraction) + BASELINE_WEIGHT * baseline_secs;
        projected - elapsed_secs
    };
    if remaining.is_finite() && remaining > 0.0 {
        remaining.round() as u64
    } else {
        0
    }
}

#[derive(Debug)]
struct ReporterState {
    last: Option<GenerationProgress>,
    finished: bool,
}

/// Emits [`GenerationProgress`] events for one run.
///
/// Progress values never decrease. Every event is stamped with elapsed time
/// and a blended ETA before it is sent.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: Option<UnboundedSender<GenerationProgress>>,
    started: Instant,
    baseline_secs: f64,
    state: Arc<Mutex<ReporterState>>,
}

impl ProgressReporter {
    /// Creates a reporter; the clock starts now.
    pub fn new(sender: Option<UnboundedSender<GenerationProgress>>, baseline_secs: u64) -> Self {
        Self {
            sender,
            started: Instant::now(),
            baseline_secs: baseline_secs as f64,
            state: Arc::new(Mutex::new(ReporterState {
                last: None,
                finished: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stamp(&self, event: &mut GenerationProgress) {
        let elapsed = self.started.elapsed().as_secs_f64();
        event.elapsed_time = elapsed.floor() as u64;
        event.estimated_time_remaining = if event.phase == GenerationPhase::Complete {
            0
        } else {
            estimate_remaining(elapsed, f64::from(event.progress) / 100.0, self.baseline_secs)
        };
    }

    fn send(&self, event: GenerationProgress) {
        if let Some(sender) = &self.sender {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }

    /// Stamps and sends an event, clamping progress to the last value sent.
    pub fn report(&self, event: GenerationProgress) {
        self.publish(event, false);
    }

    // Sends under the lock so a concurrent tick cannot deliver an older event late.
    fn publish(&self, mut event: GenerationProgress, finish: bool) {
        let mut state = self.lock();
        if state.finished {
            trace!(message = %event.message, "Ignoring progress after finish");
            return;
        }
        if let Some(last) = &state.last {
            event.progress = event.progress.max(last.progress);
        }
        self.stamp(&mut event);
        debug!(
            phase = %event.phase,
            progress = event.progress,
            eta_secs = event.estimated_time_remaining,
            message = %event.message,
            "Progress"
        );
        state.last = Some(event.clone());
        state.finished = finish;
        self.send(event);
    }

    /// Sends the final `complete` event at 100%.
    pub fn complete(&self, message: impl Into<String>) {
        self.publish(
            GenerationProgress::new(GenerationPhase::Complete, 100, message),
            true,
        );
    }

    /// Stops all further events, including ticks.
    pub fn fail(&self) {
        self.lock().finished = true;
    }

    /// The last event sent.
    pub fn last(&self) -> Option<GenerationProgress> {
        self.lock().last.clone()
    }

    fn tick(&self) -> bool {
        let mut state = self.lock();
        if state.finished {
            return false;
        }
        let Some(mut event) = state.last.clone() else {
            return true;
        };
        self.stamp(&mut event);
        state.last = Some(event.clone());
        self.send(event);
        true
    }

    /// Re-sends the last event about once a second with fresh timing.
    ///
    /// Ticking stops when the run finishes or the guard is dropped.
    pub fn start_ticker(&self) -> TickerGuard {
        let reporter = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                if !reporter.tick() {
                    break;
                }
            }
        });
        TickerGuard { handle }
    }
}

/// Aborts the progress ticker when dropped.
#[derive(Debug)]
pub struct TickerGuard {
    handle: JoinHandle<()>,
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
