//! Voice effects engine and playback for the sidsyn SID synthesizer.
//!
//! Turns notes and effect commands into SID register writes and drives a
//! chip emulation one subtick buffer at a time.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod config;
pub mod effects;
mod emulation;
mod engine;
mod event_queue;
pub mod machine;
pub mod machines;
pub mod registers;
pub mod scheduler;
mod voice;

pub use config::{ConfigError, SynthConfig, MIN_SAMPLE_RATE};
pub use emulation::{NullEmulation, SidEmulation};
#[cfg(feature = "resid")]
pub use emulation::ResidEmulation;
pub use engine::{Engine, DEFAULT_TAIL_BEATS};
pub use event_queue::EventQueue;
pub use machine::{Machine, MachineInfo, ParamInfo};
pub use machines::sid_synth::{param, segment_lengths, track_param, SidSynth};
pub use registers::{ChipState, RegisterEncoder, RegisterWrite};
pub use scheduler::schedule_song;
pub use voice::{VoiceState, DEFAULT_PULSE_WIDTH};
