use crate::animation::kinematics::time_to_reach;
use crate::effects::params::EffectParams;
use crate::foundation::math::smoothstep;

const MIN_INTERVAL: f32 = 1e-4;
const MIN_OCEAN_SPEED: f32 = 1e-4;
const FADE_IN: f32 = 0.4;
const THICKNESS_GROWTH: f32 = 2.0;
const MIN_SIGMA: f32 = 0.003;
/// Pulses summed per point. Only the most recent ones are close enough to matter.
pub(crate) const MAX_PULSES: u32 = 20;

/// Timing of the repeating pulses that follow a completed radial reveal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OceanSchedule {
    /// `None` when pulses never start.
    start: Option<f32>,
    interval: f32,
    speed: f32,
    thickness: f32,
    origin: f32,
}

impl OceanSchedule {
    pub(crate) fn new(p: &EffectParams) -> Self {
        let reveal_distance = p.reveal_start_radius + p.end_radius;
        let start = if p.ocean_wave_interval <= MIN_INTERVAL || p.reverse_mode {
            None
        } else {
            time_to_reach(reveal_distance, p.speed, p.acceleration).map(|t| t + p.delay)
        };
        Self {
            start,
            interval: p.ocean_wave_interval,
            speed: (p.speed * p.ocean_wave_speed_multiplier.max(0.01)).max(MIN_OCEAN_SPEED),
            thickness: p.ocean_wave_thickness,
            origin: p.reveal_start_radius,
        }
    }

    /// Summed pulse intensity in `[0, 1]` at distance `dist` from the center.
    pub(crate) fn intensity(&self, dist: f32, time: f32) -> f32 {
        let Some(start) = self.start else {
            return 0.0;
        };
        let elapsed = time - start;
        if elapsed <= 0.0 {
            return 0.0;
        }
        let global_fade = smoothstep(0.0, FADE_IN, elapsed);

        let newest = (elapsed / self.interval).floor().max(0.0) as u32;
        let oldest = newest.saturating_sub(MAX_PULSES - 1);
        let mut total = 0.0;
        for k in oldest..=newest {
            let wave_elapsed = elapsed - k as f32 * self.interval;
            if wave_elapsed <= 0.0 {
                continue;
            }
            let fade = smoothstep(0.0, FADE_IN, wave_elapsed);
            let growth = smoothstep(0.0, THICKNESS_GROWTH, wave_elapsed);
            let pos = self.origin + self.speed * wave_elapsed;
            let sigma = (self.thickness * growth).max(MIN_SIGMA);
            let d = dist - pos;
            total += (-(d * d) / (2.0 * sigma * sigma)).exp() * fade * global_fade;
        }
        total.min(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/ocean.rs"]
mod tests;
