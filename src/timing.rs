//! Warm-up and read-interval gates.
//!
//! Both gates are advisory: the driver never blocks or rejects a read issued too early,
//! callers consult them before reading.

/// Monotonic millisecond time source.
///
/// The origin is arbitrary (typically power-on); only differences are used.
pub trait Clock {
    /// Milliseconds elapsed since the clock origin.
    fn now_ms(&self) -> u64;
}

/// Warm-up progress of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmUpState {
    /// No warm-up check made since the handle was created.
    ColdStart,
    /// Pre-heating time not yet elapsed.
    WarmingUp,
    /// Readings are valid. Once reached, the state never goes back.
    Ready,
}

/// Timestamps and observations driving the timing gates of one sensor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingState {
    started_at: u64,
    last_read_at: Option<u64>,
    last_co2: Option<u16>,
    warm_up: WarmUpState,
}

impl TimingState {
    /// Starts tracking from `now`, the power-on time of the sensor.
    pub fn new(now: u64) -> Self {
        Self {
            started_at: now,
            last_read_at: None,
            last_co2: None,
            warm_up: WarmUpState::ColdStart,
        }
    }

    /// Warm-up state as of the last update.
    pub fn warm_up_state(&self) -> WarmUpState {
        self.warm_up
    }

    /// Time the handle was created.
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Start time of the last CO2 read attempt, `None` if the gate was never armed or was cleared.
    pub fn last_read_at(&self) -> Option<u64> {
        self.last_read_at
    }

    /// Records the start of a CO2 read attempt, whatever its outcome.
    pub fn mark_read_attempt(&mut self, now: u64) {
        self.last_read_at = Some(now);
    }

    /// Whether `interval_ms` has elapsed since the last CO2 read attempt.
    pub fn is_ready(&self, now: u64, interval_ms: u64) -> bool {
        match self.last_read_at {
            Some(at) => now.saturating_sub(at) >= interval_ms,
            None => true,
        }
    }

    /// Applies the time-based warm-up transition and returns the resulting state.
    pub fn update_warm_up(&mut self, now: u64, warm_up_ms: u64) -> WarmUpState {
        if self.warm_up != WarmUpState::Ready {
            self.warm_up = if now.saturating_sub(self.started_at) < warm_up_ms {
                WarmUpState::WarmingUp
            } else {
                WarmUpState::Ready
            };
        }
        self.warm_up
    }

    /// Feeds a CO2 value read during warm-up.
    ///
    /// A value differing from the previous one means the sensor was already powered and
    /// stable: warm-up ends and the read-interval gate is cleared. Returns `true` in that
    /// case.
    pub fn observe_co2(&mut self, ppm: u16) -> bool {
        match self.last_co2.replace(ppm) {
            Some(previous) if previous != ppm => {
                self.warm_up = WarmUpState::Ready;
                self.last_read_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cold_and_ready_to_read() {
        let state = TimingState::new(1_000);
        assert_eq!(state.warm_up_state(), WarmUpState::ColdStart);
        assert_eq!(state.started_at(), 1_000);
        assert!(state.is_ready(1_000, 5_000));
    }

    #[test]
    fn warm_up_ends_after_duration() {
        let mut state = TimingState::new(500);
        assert_eq!(state.update_warm_up(500, 180_000), WarmUpState::WarmingUp);
        assert_eq!(state.update_warm_up(180_499, 180_000), WarmUpState::WarmingUp);
        assert_eq!(state.update_warm_up(180_500, 180_000), WarmUpState::Ready);
    }

    #[test]
    fn ready_is_sticky() {
        let mut state = TimingState::new(0);
        state.update_warm_up(200_000, 180_000);
        assert_eq!(state.update_warm_up(10, 180_000), WarmUpState::Ready);
    }

    #[test]
    fn read_interval_counts_from_attempt() {
        let mut state = TimingState::new(0);
        state.mark_read_attempt(10_000);
        assert!(!state.is_ready(10_000, 5_000));
        assert!(!state.is_ready(14_999, 5_000));
        assert!(state.is_ready(15_000, 5_000));
    }

    #[test]
    fn changing_co2_ends_warm_up() {
        let mut state = TimingState::new(0);
        state.update_warm_up(0, 180_000);
        state.mark_read_attempt(0);
        assert!(!state.observe_co2(600));
        assert!(!state.observe_co2(600));
        assert_eq!(state.warm_up_state(), WarmUpState::WarmingUp);
        assert!(state.observe_co2(612));
        assert_eq!(state.warm_up_state(), WarmUpState::Ready);
        assert_eq!(state.last_read_at(), None);
    }
}
