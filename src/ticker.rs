use std::time::{Duration, Instant};

/// Default event-poll interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Countdown cadence: one session tick per second
pub const SESSION_TICK: Duration = Duration::from_secs(1);

/// Get the event-poll duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Fixed-cadence tick source with an explicit cancel handle
///
/// While armed, [`Ticker::poll`] reports how many whole periods elapsed since
/// the last report. Once cancelled, no tick is ever reported until the ticker
/// is armed again, and re-arming starts a fresh period rather than catching up.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(SESSION_TICK)
    }
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start the cadence at `now`; no-op if already armed
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    /// Drop the pending tick
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Number of periods that elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}
