use instant::Instant;

/// Which phase of a stage frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    /// Projection, crossing resolution and swap application at run start.
    Choreography = 0,
    /// Advancing every actor run by one frame.
    Step = 1,
    /// Proximity read and write passes.
    Proximity = 2,
}

const PHASE_COUNT: usize = 3;

impl SystemPhase {
    pub const ALL: [SystemPhase; PHASE_COUNT] = [Self::Choreography, Self::Step, Self::Proximity];

    pub fn label(self) -> &'static str {
        match self {
            Self::Choreography => "Choreography",
            Self::Step => "Step",
            Self::Proximity => "Proximity",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
#[derive(Debug, Clone)]
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
    /// Timestamp when `begin()` was called.
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    /// Fold one sample (microseconds) into the moving average for `phase`.
    pub fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] = self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn get(&self, phase: SystemPhase) -> f64 {
        self.durations_us[phase as usize]
    }

    /// One-line summary for periodic logging.
    pub fn summary(&self) -> String {
        SystemPhase::ALL
            .iter()
            .map(|&p| format!("{}: {:.0}us", p.label(), self.get(p)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
