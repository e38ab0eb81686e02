//! Symbolic notes and their packed number encoding.
//!
//! A note number packs octave and semitone as `1 + (octave << 4) + semitone`,
//! leaving four unused codes per octave. `0` means "no note" and `255`
//! releases the voice.

use core::fmt;
use core::str::FromStr;

use alloc::string::String;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Packed value for "no note".
pub const NOTE_NONE: u8 = 0;
/// Packed value for note-off.
pub const NOTE_OFF: u8 = 255;
/// Highest octave a note can address.
pub const MAX_OCTAVE: u8 = 9;

const KEYS: [&str; 12] = [
    "c-", "c#", "d-", "d#", "e-", "f-", "f#", "g-", "g#", "a-", "a#", "b-",
];

/// A note value as it arrives from a pattern or the parameter surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Note {
    /// No note
    #[default]
    None,
    /// Note on, holding the packed note number
    On(u8),
    /// Note off / key release
    Off,
}

impl Note {
    /// Create a note from octave (0-9) and semitone (0-11).
    pub const fn from_octave_semitone(octave: u8, semitone: u8) -> Self {
        Note::On(1 + (octave << 4) + semitone)
    }

    /// Decode a packed note number.
    pub const fn from_number(number: u8) -> Self {
        match number {
            NOTE_NONE => Note::None,
            NOTE_OFF => Note::Off,
            n => Note::On(n),
        }
    }

    /// Packed note number.
    pub const fn number(self) -> u8 {
        match self {
            Note::None => NOTE_NONE,
            Note::On(n) => n,
            Note::Off => NOTE_OFF,
        }
    }

    /// Get the octave if this is a note on.
    pub const fn octave(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n.wrapping_sub(1) >> 4),
            _ => None,
        }
    }

    /// Get the semitone if this is a note on.
    pub const fn semitone(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n.wrapping_sub(1) & 0x0F),
            _ => None,
        }
    }

    /// Octave and semitone of a well-formed note on.
    pub fn pitch(self) -> Option<(u8, u8)> {
        let octave = self.octave()?;
        let semitone = self.semitone()?;
        (octave <= MAX_OCTAVE && semitone < 12).then_some((octave, semitone))
    }

    /// Transpose upwards by `semitones`, carrying into the octave.
    ///
    /// The octave saturates at 9. Note-off and no-note come back unchanged.
    /// A malformed number is normalized the same way, so a semitone field
    /// above 11 carries into the next octave.
    pub fn offset(self, semitones: u8) -> Self {
        let Note::On(n) = self else {
            return self;
        };
        let octave = n.wrapping_sub(1) >> 4;
        let tone = (n.wrapping_sub(1) & 0x0F) as u16 + semitones as u16;
        let octave = (octave as u16 + tone / 12).min(MAX_OCTAVE as u16) as u8;
        Note::from_octave_semitone(octave, (tone % 12) as u8)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Note::None => f.write_str("---"),
            Note::Off => f.write_str("off"),
            note => match note.pitch() {
                Some((octave, semitone)) => {
                    write!(f, "{}{}", KEYS[semitone as usize], octave)
                }
                None => write!(f, "?{:02x}", note.number()),
            },
        }
    }
}

/// Error returned when note text cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NoteParseError {
    #[error("note text must be three characters, got {0}")]
    Length(usize),
    #[error("unknown note letter '{0}'")]
    Letter(char),
    #[error("expected '-' or '#', got '{0}'")]
    Accidental(char),
    #[error("'{0}' has no sharp")]
    NoSharp(char),
    #[error("octave must be a digit, got '{0}'")]
    Octave(char),
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            return Ok(Note::Off);
        }
        if s == "---" {
            return Ok(Note::None);
        }
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return Err(NoteParseError::Length(s.chars().count()));
        }
        let letter = bytes[0].to_ascii_lowercase() as char;
        let sharp = match bytes[1] {
            b'-' => false,
            b'#' => true,
            other => return Err(NoteParseError::Accidental(other as char)),
        };
        let natural = match letter {
            'c' => 0,
            'd' => 2,
            'e' => 4,
            'f' => 5,
            'g' => 7,
            'a' => 9,
            'b' | 'h' => 11,
            other => return Err(NoteParseError::Letter(other)),
        };
        if sharp && matches!(letter, 'e' | 'b' | 'h') {
            return Err(NoteParseError::NoSharp(letter));
        }
        let octave = match bytes[2] {
            d @ b'0'..=b'9' => d - b'0',
            other => return Err(NoteParseError::Octave(other as char)),
        };
        Ok(Note::from_octave_semitone(octave, natural + sharp as u8))
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
