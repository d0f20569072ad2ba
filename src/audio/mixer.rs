//! Voice mixer rendering spatialized one-shot clips into the output buffer.

use glam::Vec3;
use std::collections::VecDeque;

use super::clip::AudioClip;
use super::spatial::{spatialize, StereoGains};
use crate::params::SpatialParams;

/// One sounding instance of a clip at a fixed source position
struct Voice {
    clip: AudioClip,
    source: Vec3,
    /// Read position in clip frames (fractional when resampling)
    cursor: f64,
}

impl Voice {
    /// Linearly interpolated sample at the cursor, `None` once past the end
    fn sample(&self) -> Option<f32> {
        let samples = self.clip.samples();
        let index = self.cursor as usize;
        let current = *samples.get(index)?;
        let next = samples.get(index + 1).copied().unwrap_or(0.0);
        let frac = (self.cursor - index as f64) as f32;
        Some(current + (next - current) * frac)
    }

    fn is_finished(&self) -> bool {
        self.cursor as usize >= self.clip.samples().len()
    }
}

/// Mixes all active voices relative to the current listener position
pub struct VoiceMixer {
    voices: VecDeque<Voice>,
    listener: Vec3,
    output_rate: u32,
    params: SpatialParams,
}

impl VoiceMixer {
    pub fn new(output_rate: u32, params: SpatialParams) -> Self {
        Self {
            voices: VecDeque::new(),
            listener: Vec3::ZERO,
            output_rate: output_rate.max(1),
            params,
        }
    }

    /// Start a new voice; drops the oldest when the voice cap is reached
    pub fn play(&mut self, clip: AudioClip, source: Vec3) {
        self.voices.push_back(Voice {
            clip,
            source,
            cursor: 0.0,
        });
        while self.voices.len() > self.params.max_voices.max(1) {
            self.voices.pop_front();
        }
    }

    pub fn set_listener(&mut self, position: Vec3) {
        self.listener = position;
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Fill an interleaved buffer with `channels` channels
    ///
    /// Mono output gets the average of the stereo mix; channels past the
    /// second stay silent.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        out.fill(0.0);
        let channels = channels.max(1);
        let frames = out.len() / channels;

        for voice in self.voices.iter_mut() {
            let gains = spatialize(self.listener, voice.source, &self.params);
            let step = voice.clip.sample_rate() as f64 / self.output_rate as f64;

            for frame in 0..frames {
                let Some(sample) = voice.sample() else {
                    break;
                };
                voice.cursor += step;
                mix_frame(out, frame, channels, sample, gains);
            }
        }

        self.voices.retain(|voice| !voice.is_finished());

        // Safety limiter: hard clip the sum
        let limit = self.params.master_limit.abs();
        for sample in out.iter_mut() {
            *sample = sample.clamp(-limit, limit);
        }
    }
}

fn mix_frame(out: &mut [f32], frame: usize, channels: usize, sample: f32, gains: StereoGains) {
    let base = frame * channels;
    if channels == 1 {
        out[base] += sample * (gains.left + gains.right) * 0.5;
    } else {
        out[base] += sample * gains.left;
        out[base + 1] += sample * gains.right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SpatialParams {
        SpatialParams {
            master_limit: 1.0,
            ..SpatialParams::default()
        }
    }

    fn ones(len: usize, rate: u32) -> AudioClip {
        AudioClip::from_mono(vec![1.0; len], rate).unwrap()
    }

    #[test]
    fn test_silence_without_voices() {
        let mut mixer = VoiceMixer::new(44100, params());
        let mut out = vec![0.3; 16];
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_centered_voice_and_retirement() {
        let mut mixer = VoiceMixer::new(1000, params());
        // Straight ahead, inside the reference distance: pan only
        mixer.play(ones(3, 1000), Vec3::new(0.0, 0.0, -0.1));

        let mut out = vec![0.0; 8]; // 4 stereo frames
        mixer.render(&mut out, 2);

        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((out[0] - expected).abs() < 1e-5);
        assert!((out[1] - expected).abs() < 1e-5);
        assert!((out[4] - expected).abs() < 1e-5);
        // Clip is 3 frames long, the 4th frame is silent
        assert_eq!(out[6], 0.0);
        assert_eq!(out[7], 0.0);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_voice_spans_multiple_blocks() {
        let mut mixer = VoiceMixer::new(1000, params());
        mixer.play(ones(6, 1000), Vec3::ZERO);

        let mut out = vec![0.0; 8];
        mixer.render(&mut out, 2);
        assert_eq!(mixer.active_voices(), 1);

        mixer.render(&mut out, 2);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_resampling_consumes_faster_clip() {
        let mut mixer = VoiceMixer::new(1000, params());
        mixer.play(ones(4, 2000), Vec3::ZERO);

        let mut out = vec![0.0; 3]; // mono
        mixer.render(&mut out, 1);

        assert!(out[0] > 0.0);
        assert!(out[1] > 0.0);
        assert_eq!(out[2], 0.0);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_listener_moves_pan() {
        let mut mixer = VoiceMixer::new(1000, params());
        mixer.set_listener(Vec3::new(-1.0, 0.0, 0.0));
        mixer.play(ones(1, 1000), Vec3::ZERO);

        let mut out = vec![0.0; 2];
        mixer.render(&mut out, 2);
        assert!(out[1] > out[0], "source to the right should favor right channel");
    }

    #[test]
    fn test_limiter_and_voice_cap() {
        let mut mixer = VoiceMixer::new(
            1000,
            SpatialParams {
                master_limit: 0.5,
                max_voices: 3,
                ..SpatialParams::default()
            },
        );
        for _ in 0..5 {
            mixer.play(ones(100, 1000), Vec3::ZERO);
        }
        assert_eq!(mixer.active_voices(), 3);

        let mut out = vec![0.0; 4];
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|&s| s <= 0.5));
        assert_eq!(out[0], 0.5);
    }

    #[test]
    fn test_extra_channels_stay_silent() {
        let mut mixer = VoiceMixer::new(1000, params());
        mixer.play(ones(2, 1000), Vec3::ZERO);

        let mut out = vec![0.0; 8]; // 2 frames of 4 channels
        mixer.render(&mut out, 4);
        assert!(out[0] > 0.0);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 0.0);
    }
}
