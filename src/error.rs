//! Error types.
//!
//! Only [`ClipError`] can occur while the scene is running; the others are
//! startup failures of the adapters around the simulation.

/// Failure to load or decode the pulse clip.
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    /// The clip file could not be opened or read.
    #[error("failed to read clip: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a decodable WAV stream.
    #[error("failed to decode clip: {0}")]
    Decode(#[from] hound::Error),

    /// The WAV uses a sample layout we do not convert.
    #[error("unsupported clip format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },

    /// The clip decoded to zero frames.
    #[error("clip contains no audio frames")]
    Empty,

    /// The loader thread ended without reporting a result.
    #[error("clip loader stopped before reporting")]
    LoaderGone,
}

/// Failure to open the audio output.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to get audio config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format {0:?} (need f32)")]
    SampleFormat(cpal::SampleFormat),

    #[error("failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Failure to bring up the GPU renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Invalid command line or parameter combination.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid divisions must be at least 1, got {0}")]
    Divisions(usize),

    #[error("grid extent must be a positive finite length, got {0}")]
    Extent(f32),

    #[error("cycle period range must be non-empty and above zero, got {0:?}")]
    CycleRange(std::ops::Range<f64>),

    #[error("phase offset range must be non-empty, got {0:?}")]
    PhaseRange(std::ops::Range<f64>),

    #[error("cycle period must be a positive finite duration, got {0}")]
    CyclePeriod(f64),

    #[error("phase offset must be finite, got {0}")]
    PhaseOffset(f64),
}
