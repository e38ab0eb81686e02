//! Tempo and the subtick clock.
//!
//! One rendered buffer covers exactly one subtick. A tick (one pattern row)
//! is `subticks_per_beat` buffers long.

use serde::{Deserialize, Serialize};

/// Number of segments a buffer is split into while a timed effect runs.
///
/// Must stay a multiple of the arpeggio cycle length (3).
pub const SUBTICK_SEGMENTS: u32 = 6;

/// Playback tempo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Tempo {
    pub beats_per_minute: u16,
    /// Pattern rows per beat
    pub ticks_per_beat: u16,
    /// Buffers rendered per tick
    pub subticks_per_beat: u16,
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            beats_per_minute: 125,
            ticks_per_beat: 4,
            subticks_per_beat: 1,
        }
    }
}

impl Tempo {
    pub const fn new(beats_per_minute: u16, ticks_per_beat: u16, subticks_per_beat: u16) -> Self {
        Self {
            beats_per_minute,
            ticks_per_beat,
            subticks_per_beat,
        }
    }

    /// True when no field is zero.
    pub const fn is_valid(&self) -> bool {
        self.beats_per_minute > 0 && self.ticks_per_beat > 0 && self.subticks_per_beat > 0
    }

    /// Exact (fractional) number of samples in one subtick buffer.
    pub fn samples_per_buffer(&self, sample_rate: u32) -> f64 {
        let ticks_per_minute = self.beats_per_minute as f64 * self.ticks_per_beat as f64;
        let div = 60.0 / self.subticks_per_beat as f64;
        (sample_rate as f64 * div) / ticks_per_minute
    }

    /// Rounded buffer size.
    pub fn generate_samples_per_buffer(&self, sample_rate: u32) -> usize {
        libm::round(self.samples_per_buffer(sample_rate)) as usize
    }

    /// Subticks a timed effect stays armed for.
    pub const fn effect_subticks(&self) -> u32 {
        SUBTICK_SEGMENTS * self.subticks_per_beat as u32
    }
}

/// Running subtick position inside a tick, cycling `1..=subticks_per_beat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubtickCounter {
    count: u16,
    subticks_per_beat: u16,
}

impl SubtickCounter {
    pub fn new(subticks_per_beat: u16) -> Self {
        Self {
            count: 1,
            subticks_per_beat: subticks_per_beat.max(1),
        }
    }

    /// Current subtick, 1-based.
    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Move to the next subtick. Returns true when a new tick begins.
    pub fn advance(&mut self) -> bool {
        if self.count >= self.subticks_per_beat {
            self.count = 1;
            true
        } else {
            self.count += 1;
            false
        }
    }

    /// Restart at the first subtick with a new resolution.
    pub fn reset(&mut self, subticks_per_beat: u16) {
        *self = Self::new(subticks_per_beat);
    }
}

/// Hands out integer buffer sizes whose running sum tracks the exact
/// fractional sample position.
#[derive(Clone, Copy, Debug)]
pub struct BufferClock {
    samples_per_buffer: f64,
    buffers: u64,
    samples: u64,
}

impl BufferClock {
    pub fn new(tempo: &Tempo, sample_rate: u32) -> Self {
        Self {
            samples_per_buffer: tempo.samples_per_buffer(sample_rate),
            buffers: 0,
            samples: 0,
        }
    }

    /// Size of the next buffer.
    pub fn next_len(&mut self) -> usize {
        self.buffers += 1;
        let end = libm::round(self.buffers as f64 * self.samples_per_buffer) as u64;
        let len = end.saturating_sub(self.samples);
        self.samples = end;
        len as usize
    }

    /// Total samples handed out so far.
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Largest size `next_len` can return.
    pub fn max_len(&self) -> usize {
        libm::ceil(self.samples_per_buffer) as usize + 1
    }
}
