//! Capability interfaces between the simulation and its collaborators.
//!
//! The simulation only talks to audio and rendering through these traits,
//! which keeps it free of any GPU or device dependency.

use glam::Vec3;

use crate::audio::AudioClip;

/// Spatialized clip playback
pub trait AudioPlayer {
    /// Start a new playback instance of `clip` at `position`, fire-and-forget
    fn play_at(&mut self, clip: &AudioClip, position: Vec3);

    /// Move the listener used for spatialization
    fn set_listener_position(&mut self, position: Vec3);
}

/// A mutable visual object in the scene
pub trait SceneNode {
    fn set_position(&mut self, position: Vec3);

    /// Flash intensity in [0, 1] for this frame
    fn set_flash(&mut self, intensity: f32);
}

/// Player used when no output device could be opened
#[derive(Debug, Default)]
pub struct NullAudioPlayer;

impl AudioPlayer for NullAudioPlayer {
    fn play_at(&mut self, _clip: &AudioClip, position: Vec3) {
        log::trace!("No audio output, skipping pulse at {}", position);
    }

    fn set_listener_position(&mut self, _position: Vec3) {}
}
