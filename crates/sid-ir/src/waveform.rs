//! Oscillator waveform selection.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Oscillator waveform bits as laid out in the upper nibble of a voice
    /// control register.
    ///
    /// Triangle, saw and pulse combine; noise is meant to be used alone.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Waveform: u8 {
        const TRIANGLE = 0x01;
        const SAW = 0x02;
        const PULSE = 0x04;
        const NOISE = 0x08;
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::TRIANGLE
    }
}

impl Waveform {
    /// False when noise is mixed with another waveform.
    pub fn is_valid(self) -> bool {
        !self.contains(Waveform::NOISE) || self == Waveform::NOISE
    }

    /// Display name of the combination, `None` for invalid mixes.
    pub fn name(self) -> Option<&'static str> {
        const NAMES: [&str; 8] = [
            "Silent",
            "Triangle",
            "Saw",
            "Saw+Triangle",
            "Pulse",
            "Pulse+Triangle",
            "Pulse+Saw",
            "Pulse+Saw+Triangle",
        ];
        if self == Waveform::NOISE {
            Some("Noise")
        } else if self.is_valid() {
            Some(NAMES[self.bits() as usize])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations() {
        let wave = Waveform::PULSE | Waveform::SAW;
        assert!(wave.is_valid());
        assert_eq!(wave.bits(), 0x06);
        assert_eq!(wave.name(), Some("Pulse+Saw"));
    }

    #[test]
    fn noise_is_exclusive() {
        assert!(Waveform::NOISE.is_valid());
        assert!(!(Waveform::NOISE | Waveform::TRIANGLE).is_valid());
        assert_eq!((Waveform::NOISE | Waveform::PULSE).name(), None);
    }

    #[test]
    fn default_is_triangle() {
        assert_eq!(Waveform::default(), Waveform::TRIANGLE);
    }
}
