//! Audio output stream playing spatialized pulse voices.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use glam::Vec3;
use std::sync::{Arc, Mutex};

use super::clip::AudioClip;
use super::mixer::VoiceMixer;
use crate::error::AudioError;
use crate::params::SpatialParams;
use crate::scene::AudioPlayer;

/// Audio system owning the output stream and the shared voice mixer
pub struct AudioSystem {
    /// Voice mixer shared with the output callback
    mixer: Arc<Mutex<VoiceMixer>>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start streaming silence
    pub fn new(params: SpatialParams) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::SampleFormat(supported.sample_format()));
        }

        let channels = supported.channels() as usize;
        let sample_rate = supported.sample_rate().0;

        log::info!(
            "Audio: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let mixer = Arc::new(Mutex::new(VoiceMixer::new(sample_rate, params)));
        let mixer_callback = Arc::clone(&mixer);

        let stream = device.build_output_stream(
            &supported.config(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match mixer_callback.lock() {
                Ok(mut mixer) => mixer.render(data, channels),
                Err(_) => data.fill(0.0),
            },
            |err| log::warn!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            mixer,
            _stream: stream,
        })
    }
}

impl AudioPlayer for AudioSystem {
    fn play_at(&mut self, clip: &AudioClip, position: Vec3) {
        match self.mixer.lock() {
            Ok(mut mixer) => mixer.play(clip.clone(), position),
            Err(_) => log::warn!("Audio mixer poisoned, dropping voice"),
        }
    }

    fn set_listener_position(&mut self, position: Vec3) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.set_listener(position);
        }
    }
}
