//! Camera placement and projection.

/// Fixed perspective camera looking down at the grid
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Camera position (meters)
    pub position: [f32; 3],

    /// Look-at target (meters)
    pub target: [f32; 3],

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            position: [1.0, 2.0, 1.0], // Above one corner, looking at the middle
            target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
            near_plane_m: 0.1,
            far_plane_m: 2000.0,
        }
    }
}
