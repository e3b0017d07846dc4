//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Restart timing from now, discarding time elapsed so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed-step accumulator
///
/// Converts variable frame deltas into a whole number of fixed simulation
/// steps. Leftover time carries into the next frame. When a frame stalls,
/// at most `max_steps` steps are produced and the backlog is dropped so the
/// simulation never spirals.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    max_steps: u32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Step length for `hz` steps per second
    ///
    /// Returns `None` when the rate is not positive or the step would be
    /// zero or too long to represent.
    pub fn step_for_hz(hz: f64) -> Option<Duration> {
        if !(hz.is_finite() && hz > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / hz)
            .ok()
            .filter(|step| !step.is_zero())
    }

    /// Create an accumulator ticking at `hz` steps per second
    ///
    /// Returns `None` for rates rejected by [`FixedTimestep::step_for_hz`].
    /// `max_steps` is raised to at least 1.
    pub fn from_hz(hz: f64, max_steps: u32) -> Option<Self> {
        Self::step_for_hz(hz).map(|step| Self::new(step, max_steps))
    }

    /// Create an accumulator with an explicit step length
    ///
    /// A zero step is raised to one nanosecond.
    pub fn new(step: Duration, max_steps: u32) -> Self {
        Self {
            step: step.max(Duration::from_nanos(1)),
            accumulator: Duration::ZERO,
            max_steps: max_steps.max(1),
            total_steps: 0,
        }
    }

    /// Feed elapsed frame time; returns how many fixed steps are due
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == self.max_steps && self.accumulator >= self.step {
            // Drop whole steps only; the sub-step remainder carries over.
            let remainder = self.accumulator.as_nanos() % self.step.as_nanos();
            let remainder = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
            log::warn!(
                "Fixed timestep fell behind, dropping {:.3}s of simulation time",
                (self.accumulator - remainder).as_secs_f64()
            );
            self.accumulator = remainder;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Length of one step
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Length of one step in seconds
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Time carried over to the next frame
    pub fn remainder(&self) -> Duration {
        self.accumulator
    }

    /// Steps produced since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}
