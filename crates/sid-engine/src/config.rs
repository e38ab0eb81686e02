//! Synthesizer configuration.

use serde::{Deserialize, Serialize};
use sid_ir::{ChipModel, ClockRate, Tempo, Tuning};
use thiserror::Error;

/// Lowest sample rate the chip emulation is set up for.
pub const MIN_SAMPLE_RATE: u32 = 4000;

/// Settings fixed at setup time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub chip_model: ChipModel,
    pub tuning: Tuning,
    pub clock: ClockRate,
    pub sample_rate: u32,
    pub tempo: Tempo,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            chip_model: ChipModel::Mos6581,
            tuning: Tuning::EqualTemperament,
            clock: ClockRate::Pal,
            sample_rate: 44100,
            tempo: Tempo::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample rate {0} Hz is below {MIN_SAMPLE_RATE} Hz")]
    SampleRate(u32),
    #[error("sample rate {rate} Hz is above the chip clock of {clock} Hz")]
    SampleRateAboveClock { rate: u32, clock: u32 },
    #[error("tempo fields must be non-zero (got {bpm} bpm, {tpb} ticks/beat, {stpb} subticks/tick)")]
    Tempo { bpm: u16, tpb: u16, stpb: u16 },
    #[error("tempo yields buffers shorter than one sample per segment")]
    BufferTooShort,
}

impl SynthConfig {
    /// Check that the configuration can drive the synthesizer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate < MIN_SAMPLE_RATE {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        let clock = self.clock.hz();
        if self.sample_rate > clock {
            return Err(ConfigError::SampleRateAboveClock {
                rate: self.sample_rate,
                clock,
            });
        }
        let tempo = self.tempo;
        if !tempo.is_valid() {
            return Err(ConfigError::Tempo {
                bpm: tempo.beats_per_minute,
                tpb: tempo.ticks_per_beat,
                stpb: tempo.subticks_per_beat,
            });
        }
        if tempo.generate_samples_per_buffer(self.sample_rate) < sid_ir::SUBTICK_SEGMENTS as usize {
            return Err(ConfigError::BufferTooShort);
        }
        Ok(())
    }
}
