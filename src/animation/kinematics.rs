//! Wave-front kinematics shared by every effect.
//!
//! All functions are total: degenerate inputs (negative speeds, zero reverse speed, fronts that
//! never arrive) map to "not started" or `None`, never to a panic or a NaN.

/// Reverse fronts never retreat slower than this.
pub const MIN_REVERSE_SPEED: f32 = 1e-4;

/// Time elapsed since the wave started moving. Zero while still inside the delay.
pub fn active_time(elapsed: f32, delay: f32) -> f32 {
    (elapsed - delay.max(0.0)).max(0.0)
}

/// `speed·t + ½·accel·t²` for `t ≥ 0`. Negative speed or acceleration are treated as zero so the
/// result is monotone non-decreasing in `t`.
pub fn front_position(t: f32, speed: f32, accel: f32) -> f32 {
    let t = t.max(0.0);
    speed.max(0.0) * t + 0.5 * accel.max(0.0) * t * t
}

/// Time for a front starting at rest position 0 to travel `distance`.
///
/// Uses `2d / (v + sqrt(v² + 2ad))`, which reduces to `d / v` as `accel → 0` without a branch.
/// Returns `None` when the front never gets there.
pub fn time_to_reach(distance: f32, speed: f32, accel: f32) -> Option<f32> {
    if distance <= 0.0 {
        return Some(0.0);
    }
    let disc = speed * speed + 2.0 * accel * distance;
    if disc < 0.0 {
        return None;
    }
    let denom = speed + disc.sqrt();
    if denom <= f32::EPSILON {
        return None;
    }
    let t = 2.0 * distance / denom;
    t.is_finite().then_some(t)
}

/// Kinematic inputs of one effect instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveKinematics {
    pub speed: f32,
    pub acceleration: f32,
    pub delay: f32,
    pub reveal_start_radius: f32,
    pub end_radius: f32,
    pub reverse_speed: f32,
}

impl WaveKinematics {
    /// Distance of the raw forward front from the center.
    pub fn forward_front(&self, elapsed: f32) -> f32 {
        front_position(
            active_time(elapsed, self.delay),
            self.speed,
            self.acceleration,
        )
    }

    /// Visible edge of a forward wave: the front capped at `end_radius`, measured from the reveal
    /// start radius.
    pub fn dot_wave_position(&self, elapsed: f32) -> f32 {
        (self.forward_front(elapsed).min(self.end_radius) - self.reveal_start_radius).max(0.0)
    }

    /// Visible edge of a reverse wave, on the same origin as [`Self::dot_wave_position`]. A hide
    /// whose `end_radius` is the forward front at handoff starts exactly on the forward edge and
    /// reaches 0 at [`Self::reverse_completion_time`].
    pub fn reverse_dot_wave_position(&self, elapsed: f32) -> f32 {
        (self.reverse_front(elapsed) - self.reveal_start_radius).max(0.0)
    }

    /// Front retreating from `end_radius`, floored at `reveal_start_radius`.
    pub fn reverse_front(&self, elapsed: f32) -> f32 {
        let t = active_time(elapsed, self.delay);
        let retreat = self.reverse_speed.max(MIN_REVERSE_SPEED) * t;
        (self.end_radius - retreat).max(self.reveal_start_radius)
    }

    /// Elapsed time at which the forward front reaches `end_radius`, delay included.
    pub fn completion_time(&self) -> Option<f32> {
        time_to_reach(self.end_radius, self.speed, self.acceleration).map(|t| t + self.delay.max(0.0))
    }

    /// Elapsed time at which the reverse front settles on `reveal_start_radius`.
    pub fn reverse_completion_time(&self) -> f32 {
        let span = (self.end_radius - self.reveal_start_radius).max(0.0);
        self.delay.max(0.0) + span / self.reverse_speed.max(MIN_REVERSE_SPEED)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/kinematics.rs"]
mod tests;
