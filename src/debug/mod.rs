pub mod timer;

pub use self::timer::{SystemTimers, TickPhase};

/// Number of tick durations averaged for the reported tick rate.
const TICK_HISTORY_LEN: usize = 8;

/// Rolling window of whole-tick durations, kept in a fixed array.
pub struct TickHistory {
    /// Seconds per tick. Slot `next` is overwritten first once full.
    samples: [f64; TICK_HISTORY_LEN],
    next: usize,
    filled: usize,
    pub tick_count: u64,
}

impl TickHistory {
    pub fn new() -> Self {
        Self {
            samples: [0.0; TICK_HISTORY_LEN],
            next: 0,
            filled: 0,
            tick_count: 0,
        }
    }

    pub fn record(&mut self, seconds: f64) {
        self.samples[self.next] = seconds;
        self.next = (self.next + 1) % TICK_HISTORY_LEN;
        self.filled = (self.filled + 1).min(TICK_HISTORY_LEN);
        self.tick_count += 1;
    }

    /// Mean tick duration over the window (seconds). 0 before the first tick.
    pub fn mean_seconds(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        self.samples().sum::<f64>() / self.filled as f64
    }

    /// Ticks per second implied by the mean duration.
    pub fn ticks_per_second(&self) -> f64 {
        let mean = self.mean_seconds();
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    /// Recorded durations, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.filled < TICK_HISTORY_LEN { 0 } else { self.next };
        (0..self.filled).map(move |i| self.samples[(start + i) % TICK_HISTORY_LEN])
    }

    /// Slowest tick in the window.
    pub fn worst_seconds(&self) -> f64 {
        self.samples().fold(0.0, f64::max)
    }
}

impl Default for TickHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_covers_last_eight_ticks() {
        let mut history = TickHistory::new();
        assert_eq!(history.ticks_per_second(), 0.0);
        for _ in 0..4 {
            history.record(1.0);
        }
        for _ in 0..8 {
            history.record(0.5);
        }
        assert_eq!(history.tick_count, 12);
        assert!((history.mean_seconds() - 0.5).abs() < 1e-12);
        assert!((history.ticks_per_second() - 2.0).abs() < 1e-12);
        assert_eq!(history.samples().count(), 8);
    }

    #[test]
    fn samples_run_oldest_first_after_wrapping() {
        let mut history = TickHistory::new();
        history.record(0.25);
        history.record(0.75);
        assert_eq!(history.samples().collect::<Vec<_>>(), vec![0.25, 0.75]);
        assert!((history.mean_seconds() - 0.5).abs() < 1e-12);

        for i in 1..=10 {
            history.record(i as f64);
        }
        let window: Vec<f64> = history.samples().collect();
        assert_eq!(window, (3..=10).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(history.worst_seconds(), 10.0);
    }
}
