//! Parameter definitions with physical units and documented semantics.
//!
//! Scene units are meters, time is milliseconds for the simulation and
//! degrees for camera angles. Every tunable lives here with its default.

mod audio;
mod camera;
mod grid;
mod render;
mod simulation;

// Re-export all types
pub use audio::SpatialParams;
pub use camera::CameraParams;
pub use grid::GridParams;
pub use render::RenderConfig;
pub use simulation::SimulationParams;
