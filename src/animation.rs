use std::time::Duration;

use instant::Instant;

use crate::geometry::{Bounds, Pose};

/// Time a Move/Goto takes to play out.
pub const MOVE_DURATION: Duration = Duration::from_millis(500);
/// Time a Turn takes to play out.
pub const TURN_DURATION: Duration = Duration::from_millis(300);

/// Whether a suspended effect has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Done,
}

/// Linear pose interpolation driven by wall-clock time.
///
/// The start instant is taken from the first tick, so a tween created now and
/// first stepped three frames later still plays for its full duration. Frame
/// cadence does not matter: progress is `elapsed / duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Pose,
    to: Pose,
    duration: Duration,
    started: Option<Instant>,
}

impl Tween {
    pub fn new(from: Pose, to: Pose, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            started: None,
        }
    }

    /// Fraction of the tween covered at `now`, in `[0, 1]`.
    fn progress(&mut self, now: Instant) -> f32 {
        let started = *self.started.get_or_insert(now);
        if self.duration.is_zero() || self.from == self.to {
            return 1.0;
        }
        let elapsed = now.duration_since(started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Advance to `now`, publish the interpolated pose through `on_tick`, and
    /// report whether the tween reached its target.
    ///
    /// Every published position is clamped to `bounds`, which may differ from
    /// the bounds the tween was planned against if the stage was resized.
    pub fn step(&mut self, now: Instant, bounds: Bounds, mut on_tick: impl FnMut(Pose)) -> Progress {
        let t = self.progress(now);
        let mut pose = if t >= 1.0 {
            self.to
        } else {
            Pose {
                position: self.from.position.lerp(self.to.position, t),
                // Weighted sum stays finite for any pair of finite rotations.
                rotation: self.from.rotation * (1.0 - t) + self.to.rotation * t,
            }
        };
        pose.position = bounds.clamp(pose.position);
        on_tick(pose);

        if t >= 1.0 {
            Progress::Done
        } else {
            Progress::Pending
        }
    }
}

/// Fixed-length pause, used while a speech bubble is up.
#[derive(Debug, Clone, PartialEq)]
pub struct Wait {
    duration: Duration,
    started: Option<Instant>,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    pub fn from_seconds(seconds: f32) -> Self {
        let duration = Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::MAX);
        Self::new(duration)
    }

    pub fn step(&mut self, now: Instant) -> Progress {
        let started = *self.started.get_or_insert(now);
        if now.duration_since(started) >= self.duration {
            Progress::Done
        } else {
            Progress::Pending
        }
    }
}
