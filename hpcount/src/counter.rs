//! Occupancy counter
//!
//! Accumulates in/out totals from uploaded events. Devices resend events
//! they believe were lost, so each event is keyed by its timestamp and a
//! repeat of a recently seen key is dropped. Keys expire after the
//! retention window; [`OccupancyCounter::spawn_sweeper`] removes them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use hpcount_core::{Event, WireTime};

/// Sensor mounting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Device "in" counts people entering
    #[default]
    Forward,

    /// Device is mounted facing the other way; in and out are swapped
    Reversed,
}

/// Counter configuration
#[derive(Debug, Clone)]
pub struct CounterConfig {
    /// How often the sweeper runs
    pub sweep_interval: Duration,

    /// How long a seen timestamp blocks duplicates
    pub retention: Duration,

    pub orientation: Orientation,
}

impl CounterConfig {
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            retention: Duration::from_secs(10 * 60),
            orientation: Orientation::Forward,
        }
    }
}

/// Accumulated totals
///
/// Signed so a recalibration can start below zero. Arithmetic saturates at
/// the `i64` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub count_in: i64,
    pub count_out: i64,
}

impl Tally {
    /// People currently inside (`in - out`)
    pub fn occupancy(&self) -> i64 {
        self.count_in.saturating_sub(self.count_out)
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in={} out={} occupancy={}", self.count_in, self.count_out, self.occupancy())
    }
}

#[derive(Debug, Default)]
struct State {
    tally: Tally,
    seen: HashMap<WireTime, Instant>,
}

/// Deduplicating in/out counter shared between request handlers
///
/// # Examples
///
/// ```
/// use hpcount::{CounterConfig, OccupancyCounter};
/// use hpcount_core::{Event, WireTime};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let counter = OccupancyCounter::new(CounterConfig::default());
/// let time = WireTime { year: 26, month: 10, day: 15, hour: 9, minute: 0, second: 0 };
/// let event = Event::new(time, 0, 3, 1).unwrap();
///
/// assert!(counter.record(event).is_some());
/// assert!(counter.record(event).is_none());
/// assert_eq!(counter.occupancy(), 2);
/// # }
/// ```
#[derive(Debug)]
pub struct OccupancyCounter {
    config: CounterConfig,
    state: Mutex<State>,
}

impl OccupancyCounter {
    pub fn new(config: CounterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Record an event
    ///
    /// Returns the event when it was counted and `None` when an event with
    /// the same timestamp is still retained.
    pub fn record(&self, event: Event) -> Option<Event> {
        self.record_at(event, Instant::now())
    }

    /// [`record`](Self::record) with an explicit clock reading
    pub fn record_at(&self, event: Event, now: Instant) -> Option<Event> {
        let (count_in, count_out) = match self.config.orientation {
            Orientation::Forward => (event.count_in, event.count_out),
            Orientation::Reversed => (event.count_out, event.count_in),
        };

        let mut state = self.state.lock();

        if state.seen.contains_key(&event.time) {
            debug!(time = %event.time, "Dropping duplicate event");
            return None;
        }

        state.seen.insert(event.time, now);
        state.tally.count_in = state.tally.count_in.saturating_add(i64::from(count_in));
        state.tally.count_out = state.tally.count_out.saturating_add(i64::from(count_out));

        trace!(time = %event.time, tally = %state.tally, "Recorded event");

        Some(event)
    }

    /// Current totals
    pub fn tally(&self) -> Tally {
        self.state.lock().tally
    }

    /// People currently inside
    pub fn occupancy(&self) -> i64 {
        self.tally().occupancy()
    }

    /// Override the totals: in becomes `value`, out becomes zero
    ///
    /// `value` may be negative. Retained timestamps are kept, so events
    /// already counted stay deduplicated.
    pub fn set(&self, value: i64) {
        let mut state = self.state.lock();
        state.tally = Tally {
            count_in: value,
            count_out: 0,
        };
        info!(value, "Counter reset");
    }

    /// Number of timestamps currently blocking duplicates
    pub fn retained(&self) -> usize {
        self.state.lock().seen.len()
    }

    /// Drop timestamps older than the retention window
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`sweep`](Self::sweep) with an explicit clock reading
    ///
    /// An entry is removed once strictly more than `retention` has passed
    /// since it was recorded. Returns the number of entries removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let retention = self.config.retention;
        let mut state = self.state.lock();

        let before = state.seen.len();
        state
            .seen
            .retain(|_, recorded| now.saturating_duration_since(*recorded) <= retention);
        let removed = before - state.seen.len();

        if removed > 0 {
            info!(removed, retained = state.seen.len(), "Swept expired timestamps");
        }

        removed
    }

    /// Start the periodic sweep
    ///
    /// Runs until the returned handle is aborted or the runtime shuts down.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let interval = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}

impl Default for OccupancyCounter {
    fn default() -> Self {
        Self::new(CounterConfig::default())
    }
}
