//! Note-to-frequency translation for the supported tuning schemes.
//!
//! Every scheme anchors A at octave 0 to 55 Hz and derives the other
//! semitones from a ratio relative to A, so `a-3` is exactly 440 Hz in
//! each of them.

use serde::{Deserialize, Serialize};

use crate::note::Note;

/// Frequency of A in octave 0.
pub const BASE_FREQUENCY: f64 = 55.0;

/// Frequency returned for note-off.
pub const FREQUENCY_OFF: f64 = -1.0;

const JUST_INTONATION: [f64; 12] = [
    1.0,
    16.0 / 15.0,
    9.0 / 8.0,
    6.0 / 5.0,
    5.0 / 4.0,
    4.0 / 3.0,
    7.0 / 5.0,
    3.0 / 2.0,
    8.0 / 5.0,
    5.0 / 3.0,
    16.0 / 9.0,
    15.0 / 8.0,
];

const PYTHAGOREAN: [f64; 12] = [
    1.0,
    256.0 / 234.0,
    9.0 / 8.0,
    32.0 / 27.0,
    81.0 / 64.0,
    4.0 / 3.0,
    729.0 / 512.0,
    3.0 / 2.0,
    128.0 / 81.0,
    27.0 / 16.0,
    16.0 / 9.0,
    243.0 / 128.0,
];

/// Tuning scheme used to map semitones to frequencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tuning {
    #[default]
    EqualTemperament,
    JustIntonation,
    Pythagorean,
}

impl Tuning {
    /// All schemes, in selector order.
    pub const ALL: [Tuning; 3] = [
        Tuning::EqualTemperament,
        Tuning::JustIntonation,
        Tuning::Pythagorean,
    ];

    /// Ratio of `semitone` (0-11) to A within the same octave.
    pub fn ratio(self, semitone: u8) -> f64 {
        let semitone = semitone as usize;
        match self {
            Tuning::EqualTemperament => libm::pow(2.0, (semitone as f64 - 9.0) / 12.0),
            Tuning::JustIntonation => JUST_INTONATION[semitone] / JUST_INTONATION[9],
            Tuning::Pythagorean => PYTHAGOREAN[semitone] / PYTHAGOREAN[9],
        }
    }

    /// Frequency in Hz for a well-formed octave (0-9) and semitone (0-11).
    pub fn frequency(self, octave: u8, semitone: u8) -> f64 {
        BASE_FREQUENCY * (1u32 << octave) as f64 * self.ratio(semitone)
    }

    /// Translate a note to a frequency in Hz.
    ///
    /// Note-off yields [`FREQUENCY_OFF`]; no-note and malformed encodings
    /// yield 0.0.
    pub fn translate(self, note: Note) -> f64 {
        match note {
            Note::Off => FREQUENCY_OFF,
            note => match note.pitch() {
                Some((octave, semitone)) => self.frequency(octave, semitone),
                None => 0.0,
            },
        }
    }

    /// Short name used on the command line and in descriptions.
    pub const fn name(self) -> &'static str {
        match self {
            Tuning::EqualTemperament => "equal",
            Tuning::JustIntonation => "just",
            Tuning::Pythagorean => "pythagorean",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn a3_is_440_in_every_tuning() {
        let a3 = Note::from_octave_semitone(3, 9);
        for tuning in Tuning::ALL {
            assert_eq!(tuning.translate(a3), 440.0);
        }
    }

    #[test]
    fn equal_temperament_semitone_steps() {
        let c4 = Tuning::EqualTemperament.translate(Note::from_octave_semitone(4, 0));
        let cs4 = Tuning::EqualTemperament.translate(Note::from_octave_semitone(4, 1));
        assert_relative_eq!(cs4 / c4, libm::pow(2.0, 1.0 / 12.0), epsilon = 1e-12);
        assert_relative_eq!(c4, 523.251_130_601_197_2, epsilon = 1e-9);
    }

    #[test]
    fn frequencies_strictly_increase() {
        for tuning in Tuning::ALL {
            let mut previous = 0.0;
            for octave in 0..=9 {
                for semitone in 0..12 {
                    let freq = tuning.translate(Note::from_octave_semitone(octave, semitone));
                    assert!(
                        freq > previous,
                        "{:?} {}:{} = {} not above {}",
                        tuning, octave, semitone, freq, previous
                    );
                    previous = freq;
                }
            }
        }
    }

    #[test]
    fn off_and_malformed() {
        let tuning = Tuning::EqualTemperament;
        assert_eq!(tuning.translate(Note::Off), -1.0);
        assert_eq!(tuning.translate(Note::None), 0.0);
        assert_eq!(tuning.translate(Note::On(1 + (4 << 4) + 13)), 0.0);
    }

    #[test]
    fn just_intonation_fifth() {
        let d3 = Tuning::JustIntonation.translate(Note::from_octave_semitone(3, 2));
        let a3 = Tuning::JustIntonation.translate(Note::from_octave_semitone(3, 9));
        assert_relative_eq!(d3, 440.0 * (9.0 / 8.0) / (5.0 / 3.0), epsilon = 1e-9);
        assert!(a3 > d3);
    }
}
