//! Window and scene appearance configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Brightness of a point that is not flashing (0..1)
    /// Keeps idle points visible against the black background.
    pub idle_brightness: f32,

    /// Edge length of the listener marker cube (meters)
    pub marker_size_m: f32,

    /// Listener marker color (linear RGB)
    pub marker_color: [f32; 3],

    /// Ground helper color for the two center lines (linear RGB)
    pub helper_center_color: [f32; 3],

    /// Ground helper color for the remaining lines (linear RGB)
    pub helper_line_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            idle_brightness: 0.15,
            marker_size_m: 0.03,
            marker_color: [1.0, 0.2, 0.2],
            helper_center_color: [0.27, 0.27, 0.27],
            helper_line_color: [0.53, 0.53, 0.53],
        }
    }
}
