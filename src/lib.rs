//! Pulsefield library - grid of points pulsing spatialized sound

pub mod audio;
pub mod camera;
pub mod cli;
pub mod error;
pub mod grid;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod simulation;
pub mod stats;
