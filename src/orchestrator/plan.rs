use crate::animation::kinematics::MIN_REVERSE_SPEED;

/// Hard bounds on how long a hide animation may take, whatever the configuration says.
pub const REVERSE_DURATION_FLOOR: f32 = 0.1;
pub const REVERSE_DURATION_CEILING: f32 = 10.0;

/// Inputs of [`plan_transition`] that come from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionTiming {
    pub reverse_speed: f32,
    pub overlap: f32,
    pub min_duration: f32,
    pub max_duration: f32,
}

/// Timing of one hide/reveal handoff, relative to the moment it starts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TransitionPlan {
    /// Length of the hide on the outgoing dataset; the incoming one is promoted after it.
    pub reverse_duration: f32,
    /// Delay before the incoming reveal starts moving.
    pub reveal_delay: f32,
}

/// Plan a transition away from a dataset whose front currently sits at `current_front`.
pub fn plan_transition(
    current_front: f32,
    reveal_start_radius: f32,
    timing: &TransitionTiming,
) -> TransitionPlan {
    let distance = (current_front - reveal_start_radius).max(0.0);
    let speed = timing.reverse_speed.max(MIN_REVERSE_SPEED);
    let raw = distance / speed;
    let raw = if raw.is_nan() { 0.0 } else { raw };
    let reverse_duration = raw
        .max(timing.min_duration)
        .min(timing.max_duration)
        .clamp(REVERSE_DURATION_FLOOR, REVERSE_DURATION_CEILING);
    let overlap = if timing.overlap.is_finite() {
        timing.overlap.clamp(0.0, 1.0)
    } else {
        0.0
    };
    TransitionPlan {
        reverse_duration,
        reveal_delay: reverse_duration * overlap,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrator/plan.rs"]
mod tests;
