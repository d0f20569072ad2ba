//! Per-point oscillation schedule and flash bookkeeping.

use glam::Vec3;
use rand::Rng;

use crate::error::ConfigError;
use crate::params::SimulationParams;

/// A pulsing point on the grid
///
/// Plain state only; [`super::step::advance`] owns every state transition.
#[derive(Clone, Debug)]
pub struct Point {
    cycle_period_ms: f64,
    phase_offset_ms: f64,

    /// Timestamp of the last tick this point saw
    pub(crate) last_tick_ms: Option<f64>,

    /// Timestamp recorded by the most recent trigger
    pub(crate) last_trigger_ms: Option<f64>,

    /// Flash intensity for the current frame, in [0, 1]
    pub(crate) flash_intensity: f32,

    position: Vec3,
}

impl Point {
    /// Point with a fixed schedule; the period must be finite and above zero
    pub fn new(
        position: Vec3,
        cycle_period_ms: f64,
        phase_offset_ms: f64,
    ) -> Result<Self, ConfigError> {
        if !cycle_period_ms.is_finite() || cycle_period_ms <= 0.0 {
            return Err(ConfigError::CyclePeriod(cycle_period_ms));
        }
        if !phase_offset_ms.is_finite() {
            return Err(ConfigError::PhaseOffset(phase_offset_ms));
        }

        Ok(Self {
            cycle_period_ms,
            phase_offset_ms,
            last_tick_ms: None,
            last_trigger_ms: None,
            flash_intensity: 0.0,
            position,
        })
    }

    /// Point with a schedule drawn from the ranges in `params`
    pub fn random<R: Rng>(
        position: Vec3,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let cycle_period_ms = rng.random_range(params.cycle_period_ms.clone());
        let phase_offset_ms = rng.random_range(params.phase_offset_ms.clone());
        Self::new(position, cycle_period_ms, phase_offset_ms)
    }

    /// Length of one oscillation cycle (milliseconds)
    pub fn cycle_period_ms(&self) -> f64 {
        self.cycle_period_ms
    }

    /// Shift of the cycle grid along the time axis (milliseconds)
    pub fn phase_offset_ms(&self) -> f64 {
        self.phase_offset_ms
    }

    pub fn last_tick_ms(&self) -> Option<f64> {
        self.last_tick_ms
    }

    pub fn last_trigger_ms(&self) -> Option<f64> {
        self.last_trigger_ms
    }

    pub fn flash_intensity(&self) -> f32 {
        self.flash_intensity
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
