//! Spatialized pulse playback.
//!
//! The clip is decoded off the frame loop, each trigger becomes a voice in
//! the mixer, and the cpal callback renders voices relative to the current
//! listening point.

pub mod clip;
pub mod mixer;
pub mod spatial;
mod system;

pub use clip::{spawn_load, AudioClip, ClipReadiness};
pub use mixer::VoiceMixer;
pub use system::AudioSystem;
