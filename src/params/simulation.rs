//! Per-point oscillation schedule ranges.

use std::ops::Range;

use crate::error::ConfigError;

/// Ranges the per-point schedule is drawn from at startup
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Cycle period range (milliseconds, half-open, start must be > 0)
    pub cycle_period_ms: Range<f64>,

    /// Phase offset range (milliseconds, half-open)
    pub phase_offset_ms: Range<f64>,

    /// RNG seed for the schedule; `None` draws a fresh one per run
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            cycle_period_ms: 2000.0..12000.0,
            phase_offset_ms: 0.0..10000.0,
            seed: None,
        }
    }
}

impl SimulationParams {
    /// Both ranges must be non-empty and cycle periods strictly positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cycle = &self.cycle_period_ms;
        if !(cycle.start > 0.0 && cycle.start < cycle.end && cycle.end.is_finite()) {
            return Err(ConfigError::CycleRange(cycle.clone()));
        }
        let phase = &self.phase_offset_ms;
        if !(phase.start < phase.end && phase.start.is_finite() && phase.end.is_finite()) {
            return Err(ConfigError::PhaseRange(phase.clone()));
        }
        Ok(())
    }
}
