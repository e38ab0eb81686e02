//! Core IR types for the sidsyn SID synthesizer.
//!
//! This crate defines the vocabulary shared by the engine, the controller
//! and song files: notes and tunings, effect commands, chip settings,
//! tempo, events and patterns.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod chip;
mod effects;
mod event;
mod note;
mod pattern;
mod song;
mod tempo;
mod timestamp;
mod tuning;
mod waveform;

pub use chip::{ChipModel, ClockRate};
pub use effects::{EffectCommand, EffectType, VibratoWaveform};
pub use event::{Event, EventPayload, EventTarget};
pub use note::{Note, NoteParseError, MAX_OCTAVE, NOTE_NONE, NOTE_OFF};
pub use pattern::{Adsr, Cell, GlobalCell, Pattern, PatternError, NUM_VOICES};
pub use song::{Song, SongPosition};
pub use tempo::{BufferClock, SubtickCounter, Tempo, SUBTICK_SEGMENTS};
pub use timestamp::Timestamp;
pub use tuning::{Tuning, BASE_FREQUENCY, FREQUENCY_OFF};
pub use waveform::Waveform;
