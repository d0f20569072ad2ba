//! One simulation tick: trigger decisions and flash decay.

use super::point::Point;

/// Time for a flash to fade from full brightness to zero (milliseconds)
pub const FLASH_DECAY_MS: f64 = 1000.0;

/// What happened to one point during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub triggered: bool,
    pub flash_intensity: f32,
}

/// Index of the oscillation cycle containing `time_ms`
pub fn cycle_bucket(point: &Point, time_ms: f64) -> f64 {
    ((time_ms - point.phase_offset_ms()) / point.cycle_period_ms()).floor()
}

/// Linear decay from 1 at the trigger time to 0 after [`FLASH_DECAY_MS`]
pub fn flash_intensity(now_ms: f64, last_trigger_ms: Option<f64>) -> f32 {
    match last_trigger_ms {
        None => 0.0,
        Some(trigger) => (1.0 - (now_ms - trigger) / FLASH_DECAY_MS).clamp(0.0, 1.0) as f32,
    }
}

/// Advance every point to `now_ms`
///
/// A point triggers when its cycle bucket changed since its previous tick,
/// but only if it has a previous tick, the simulation is running and a clip
/// is available. Several boundaries crossed in one gap still count once.
/// The trigger is stamped with the previous tick time, not `now_ms`.
pub fn advance(
    points: &mut [Point],
    now_ms: f64,
    running: bool,
    clip_available: bool,
) -> Vec<TickOutcome> {
    let armed = running && clip_available;
    points
        .iter_mut()
        .map(|point| tick(point, now_ms, armed))
        .collect()
}

fn tick(point: &mut Point, now_ms: f64, armed: bool) -> TickOutcome {
    let mut triggered = false;

    if let (true, Some(prev)) = (armed, point.last_tick_ms) {
        if cycle_bucket(point, prev) != cycle_bucket(point, now_ms) {
            point.last_trigger_ms = Some(prev);
            triggered = true;
        }
    }

    // Decay and bookkeeping continue even while triggers are gated
    point.flash_intensity = flash_intensity(now_ms, point.last_trigger_ms);
    point.last_tick_ms = Some(now_ms);

    TickOutcome {
        triggered,
        flash_intensity: point.flash_intensity,
    }
}
