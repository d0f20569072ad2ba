//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::params::{GridParams, SimulationParams};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Pulsefield")]
#[command(about = "Grid of points pulsing spatialized sound around a movable listener", long_about = None)]
pub struct Args {
    /// WAV clip played by every pulse
    #[arg(long, value_name = "PATH", default_value = "assets/pulse.wav")]
    pub clip: PathBuf,

    /// Seed for the per-point cycle schedule (random when omitted)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Grid steps per side; the grid holds (N + 1)^2 points
    #[arg(long, value_name = "N", default_value = "4")]
    pub divisions: usize,

    /// Grid side length (meters)
    #[arg(long, value_name = "METERS", default_value = "1.0")]
    pub extent: f32,
}

impl Args {
    /// Grid parameters with command line overrides applied
    pub fn grid_params(&self) -> Result<GridParams, ConfigError> {
        let params = GridParams {
            divisions: self.divisions,
            extent_m: self.extent,
            ..GridParams::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            seed: self.seed,
            ..SimulationParams::default()
        }
    }
}
