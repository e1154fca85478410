//! Countdown to kickoff
//!
//! Provides the pure remaining-time computation and a `CountdownEngine` that
//! recomputes it once per second on a Tokio task. Ticks are only forwarded
//! when the displayed value changes, and the finish transition is reported
//! exactly once per countdown.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// How often the countdown is recomputed
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Remaining time until a target instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownState {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    /// The target instant has passed
    pub is_finished: bool,
}

impl CountdownState {
    /// State reported once the target has passed
    pub const FINISHED: CountdownState = CountdownState {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        is_finished: true,
    };

    /// Remaining time in whole seconds
    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    /// Kickoff is less than a day away
    pub fn is_urgent(&self) -> bool {
        self.days == 0 && !self.is_finished
    }

    /// The four numeric fields, used to decide whether a tick is worth delivering
    fn fields(&self) -> [u64; 4] {
        [self.days, self.hours, self.minutes, self.seconds]
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Computes the time left between `now` and `target`
///
/// Sub-second remainders are truncated. Once `now` is past `target` the
/// result is [`CountdownState::FINISHED`].
pub fn compute_countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> CountdownState {
    let difference = target - now;
    if difference < chrono::Duration::zero() {
        return CountdownState::FINISHED;
    }

    let total = difference.num_seconds() as u64;
    CountdownState {
        days: total / SECONDS_PER_DAY,
        hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        seconds: total % SECONDS_PER_MINUTE,
        is_finished: false,
    }
}

/// What to do with one computed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickOutcome {
    /// Forward the state to `on_tick`
    deliver: bool,
    /// Fire `on_finished`
    finished: bool,
}

/// Remembers what was last delivered so repeats can be dropped
#[derive(Debug, Default)]
struct TickFilter {
    last_delivered: Option<[u64; 4]>,
    finish_signalled: bool,
}

impl TickFilter {
    fn observe(&mut self, state: &CountdownState) -> TickOutcome {
        let fields = state.fields();
        let deliver = self.last_delivered != Some(fields);
        if deliver {
            self.last_delivered = Some(fields);
        }

        let finished = state.is_finished && !self.finish_signalled;
        if finished {
            self.finish_signalled = true;
        }

        TickOutcome { deliver, finished }
    }
}

/// Stops a running countdown
///
/// Clones control the same countdown. Cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Stops the countdown; later calls do nothing
    pub fn cancel(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Runs at most one countdown at a time
///
/// Dropping the engine cancels its countdown.
pub struct CountdownEngine {
    clock: Arc<dyn Clock>,
    active: Option<CancelHandle>,
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownEngine {
    /// Creates an idle engine using the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            active: None,
        }
    }

    /// Creates an idle engine reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            active: None,
        }
    }

    /// Starts counting down to `target`, replacing any running countdown
    ///
    /// Must be called from within a Tokio runtime. The first tick is computed
    /// immediately, then once per second.
    ///
    /// # Arguments
    /// * `target` - Instant to count down to
    /// * `on_tick` - Receives each state whose days/hours/minutes/seconds differ
    ///   from the previous delivery
    /// * `on_finished` - Called once, on the first tick at or after which the
    ///   target has passed
    ///
    /// # Returns
    /// A handle that stops this countdown
    pub fn start<T, D>(&mut self, target: DateTime<Utc>, on_tick: T, on_finished: D) -> CancelHandle
    where
        T: FnMut(CountdownState) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        self.cancel();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = CancelHandle {
            shutdown: Arc::new(shutdown_tx),
        };

        debug!(%target, "starting countdown");
        tokio::spawn(run_countdown(
            target,
            Arc::clone(&self.clock),
            shutdown_rx,
            on_tick,
            on_finished,
        ));

        self.active = Some(handle.clone());
        handle
    }

    /// Stops the running countdown, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
    }

    /// Whether a countdown is running and has not been cancelled
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|handle| !handle.is_cancelled())
            .unwrap_or(false)
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Tick loop of one countdown
async fn run_countdown<T, D>(
    target: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    mut shutdown_rx: watch::Receiver<bool>,
    mut on_tick: T,
    on_finished: D,
) where
    T: FnMut(CountdownState) + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut filter = TickFilter::default();
    let mut on_finished = Some(on_finished);

    loop {
        tokio::select! {
            biased;
            // Err means every handle is gone, which also ends the countdown
            _ = shutdown_rx.changed() => break,
            _ = interval.tick() => {
                let state = compute_countdown(target, clock.now());
                let outcome = filter.observe(&state);

                if outcome.deliver {
                    on_tick(state);
                }
                if outcome.finished {
                    if let Some(on_finished) = on_finished.take() {
                        info!(%target, "countdown finished");
                        on_finished();
                    }
                }
            }
        }
    }

    debug!(%target, "countdown stopped");
}
