//! Spatial audio mixing parameters.

/// Distance attenuation, limiter and polyphony settings
#[derive(Debug, Clone)]
pub struct SpatialParams {
    /// Distance below which no attenuation applies (meters)
    /// The grid is only 1m wide, so this is small enough to hear falloff.
    pub ref_distance_m: f32,

    /// Inverse-distance rolloff factor (dimensionless, >= 0)
    pub rolloff: f32,

    /// Hard clip level for the mixed output (linear amplitude)
    pub master_limit: f32,

    /// Maximum concurrent voices; the oldest is dropped beyond this
    pub max_voices: usize,
}

impl Default for SpatialParams {
    fn default() -> Self {
        Self {
            ref_distance_m: 0.25,
            rolloff: 1.0,
            master_limit: 0.5, // Headroom for many overlapping pulses near the listener
            max_voices: 64,
        }
    }
}
