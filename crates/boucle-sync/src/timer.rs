use std::time::Duration;

/// Shortest period a timer accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Most periods reported by one `advance`. Anything beyond is dropped.
pub const MAX_CATCH_UP: u32 = 16;

/// Periodic timer advanced by the caller.
///
/// The timer never reads a clock: callers feed it elapsed time and get back
/// the number of whole periods that passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTimer {
    period: Duration,
    elapsed: Duration,
    active: bool,
}

impl PeriodicTimer {
    /// Create a stopped timer.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start counting from zero. No-op when already running.
    pub fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.elapsed = Duration::ZERO;
        }
    }

    /// Stop and drop any partial period.
    pub fn stop(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    /// Feed elapsed time and return how many periods completed, at most
    /// [`MAX_CATCH_UP`]. The remainder below one period carries over.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.active {
            return 0;
        }
        let total = self.elapsed.saturating_add(elapsed).as_nanos();
        let period = self.period.as_nanos();
        self.elapsed = Duration::from_nanos((total % period) as u64);
        (total / period).min(u128::from(MAX_CATCH_UP)) as u32
    }
}
