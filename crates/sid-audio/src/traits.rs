//! Audio output trait and error types.

use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
}

/// Trait for audio output backends.
pub trait AudioOutput {
    /// Device sample rate the synthesizer must render at.
    fn sample_rate(&self) -> u32;

    /// Queue mono samples, dropping any that do not fit.
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
