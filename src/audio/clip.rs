//! Pulse clip decoding and background loading.
//!
//! The clip is decoded once into mono `f32` samples and shared by every
//! voice through an `Arc`. Loading runs on its own thread and reports a
//! single result through [`ClipReadiness`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::error::ClipError;

/// Decoded mono audio clip
#[derive(Clone, Debug)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioClip {
    /// Wrap already decoded mono samples
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, ClipError> {
        if samples.is_empty() || sample_rate == 0 {
            return Err(ClipError::Empty);
        }
        Ok(Self {
            samples: samples.into(),
            sample_rate,
        })
    }

    /// Decode a WAV stream, downmixing all channels to mono
    pub fn from_wav<R: Read>(reader: R) -> Result<Self, ClipError> {
        let mut wav = hound::WavReader::new(reader)?;
        let spec = wav.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => wav.samples::<f32>().collect::<Result<_, _>>()?,
            (hound::SampleFormat::Int, bits @ 8..=32) => {
                let scale = 1.0 / (1u64 << (bits - 1)) as f32;
                wav.samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
            (format, bits) => {
                return Err(ClipError::UnsupportedFormat {
                    bits,
                    format: match format {
                        hound::SampleFormat::Float => "float",
                        hound::SampleFormat::Int => "int",
                    },
                })
            }
        };

        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Self::from_mono(mono, spec.sample_rate)
    }

    /// Read and decode a WAV file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClipError> {
        let file = File::open(path)?;
        Self::from_wav(BufReader::new(file))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// One-shot result of a background clip load
///
/// Resolves exactly once to `Ok(clip)` or `Err(error)`; afterwards
/// [`poll`](Self::poll) keeps returning `None`.
pub struct ClipReadiness {
    rx: Option<Receiver<Result<AudioClip, ClipError>>>,
}

impl ClipReadiness {
    /// Non-blocking check, meant to be called once per frame
    pub fn poll(&mut self) -> Option<Result<AudioClip, ClipError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ClipError::LoaderGone),
        };
        self.rx = None;
        Some(result)
    }

    /// Block until the load resolves
    pub fn wait(mut self) -> Result<AudioClip, ClipError> {
        match self.rx.take() {
            Some(rx) => rx.recv().unwrap_or(Err(ClipError::LoaderGone)),
            None => Err(ClipError::LoaderGone),
        }
    }

    /// Whether the result has already been handed out
    pub fn is_resolved(&self) -> bool {
        self.rx.is_none()
    }
}

/// Start loading the clip at `path` on a background thread
pub fn spawn_load(path: impl Into<PathBuf>) -> ClipReadiness {
    let path = path.into();
    let (tx, rx) = mpsc::channel();
    let worker_tx = tx.clone();

    let spawned = thread::Builder::new()
        .name("clip-loader".to_string())
        .spawn(move || {
            let result = AudioClip::load(&path);
            match &result {
                Ok(clip) => log::info!(
                    "Clip: {} ({:.2}s @ {}Hz)",
                    path.display(),
                    clip.duration_secs(),
                    clip.sample_rate()
                ),
                Err(e) => log::error!("Clip load failed for {}: {}", path.display(), e),
            }
            // Receiver may already be gone if the app is shutting down
            let _ = worker_tx.send(result);
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn clip loader: {}", e);
        let _ = tx.send(Err(ClipError::Io(e)));
    }

    ClipReadiness { rx: Some(rx) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes<F>(spec: hound::WavSpec, write: F) -> Vec<u8>
    where
        F: FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>),
    {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_int16_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            w.write_sample(0i16).unwrap();
            w.write_sample(16384i16).unwrap();
            w.write_sample(-32768i16).unwrap();
        });

        let clip = AudioClip::from_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.samples().len(), 3);
        assert!((clip.samples()[1] - 0.5).abs() < 1e-6);
        assert!((clip.samples()[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_float_stereo_downmixes() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for (l, r) in [(1.0f32, 0.0f32), (0.5, 0.5), (-1.0, 0.0)] {
                w.write_sample(l).unwrap();
                w.write_sample(r).unwrap();
            }
        });

        let clip = AudioClip::from_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(clip.samples(), &[0.5, 0.5, -0.5]);
        assert!((clip.duration_secs() - 3.0 / 44100.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_clip_is_rejected() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |_| {});
        assert!(matches!(
            AudioClip::from_wav(Cursor::new(bytes)),
            Err(ClipError::Empty)
        ));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result = AudioClip::from_wav(Cursor::new(b"definitely not a wav".to_vec()));
        assert!(matches!(result, Err(ClipError::Decode(_))));
    }

    #[test]
    fn test_missing_file_resolves_to_error_once() {
        let mut readiness = spawn_load("/nonexistent/pulsefield/clip.wav");

        let result = loop {
            if let Some(result) = readiness.poll() {
                break result;
            }
            thread::sleep(std::time::Duration::from_millis(1));
        };

        assert!(matches!(result, Err(ClipError::Io(_))));
        assert!(readiness.is_resolved());
        assert!(readiness.poll().is_none());
    }

    #[test]
    fn test_wait_returns_loaded_clip() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = std::env::temp_dir().join(format!("pulsefield-test-{}.wav", std::process::id()));
        std::fs::write(&path, wav_bytes(spec, |w| w.write_sample(1000i16).unwrap())).unwrap();

        let clip = spawn_load(&path).wait().unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.samples().len(), 1);

        let _ = std::fs::remove_file(&path);
    }
}
