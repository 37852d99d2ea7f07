use instant::Instant;

/// Which phase of the simulation tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TickPhase {
    GridClear = 0,
    GridInsert = 1,
    Forces = 2,
    Kinematics = 3,
}

impl TickPhase {
    pub const ALL: [TickPhase; 4] = [
        Self::GridClear,
        Self::GridInsert,
        Self::Forces,
        Self::Kinematics,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GridClear => "Grid clear",
            Self::GridInsert => "Grid insert",
            Self::Forces => "Forces",
            Self::Kinematics => "Kinematics",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 4],
    /// Timestamp when `begin()` was called.
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 4],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: TickPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: TickPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn phase_us(&self, phase: TickPhase) -> f64 {
        self.durations_us[phase as usize]
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_moves_toward_samples() {
        let mut timers = SystemTimers::new();
        timers.record(TickPhase::Forces, 100.0);
        assert!((timers.phase_us(TickPhase::Forces) - 10.0).abs() < 1e-9);
        timers.record(TickPhase::Forces, 100.0);
        assert!((timers.phase_us(TickPhase::Forces) - 19.0).abs() < 1e-9);
        assert_eq!(timers.phase_us(TickPhase::GridClear), 0.0);
        assert!((timers.total_us() - 19.0).abs() < 1e-9);
    }

    #[test]
    fn begin_end_records_nonnegative_time() {
        let mut timers = SystemTimers::new();
        for phase in TickPhase::ALL {
            timers.begin();
            timers.end(phase);
            assert!(timers.phase_us(phase) >= 0.0);
        }
    }
}
