//! Grid layout of the pulsing points and the ground helper.

use crate::error::ConfigError;

/// Grid layout parameters
#[derive(Debug, Clone)]
pub struct GridParams {
    /// Side length of the square point grid (meters, centered on origin)
    pub extent_m: f32,

    /// Steps per side; the grid holds (divisions + 1)^2 points
    pub divisions: usize,

    /// Ground helper line divisions per side (same extent as the points)
    pub helper_divisions: usize,

    /// Edge length of a point cube (meters)
    pub point_size_m: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            extent_m: 1.0,
            divisions: 4, // 5 x 5 points, 0.25m apart
            helper_divisions: 10,
            point_size_m: 0.01,
        }
    }
}

impl GridParams {
    /// Reject layouts that would produce no points or a degenerate grid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.divisions == 0 {
            return Err(ConfigError::Divisions(self.divisions));
        }
        if self.helper_divisions == 0 {
            return Err(ConfigError::Divisions(self.helper_divisions));
        }
        if !(self.extent_m.is_finite() && self.extent_m > 0.0) {
            return Err(ConfigError::Extent(self.extent_m));
        }
        Ok(())
    }
}
