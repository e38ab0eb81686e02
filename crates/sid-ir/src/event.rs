//! Event types for the event-driven playback engine.

use crate::effects::EffectCommand;
use crate::note::Note;
use crate::tempo::Tempo;
use crate::timestamp::Timestamp;

/// A scheduled event in the song.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    /// When the event should fire
    pub time: Timestamp,
    /// Where the event is routed
    pub target: EventTarget,
    /// What the event does
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event.
    pub fn new(time: Timestamp, target: EventTarget, payload: EventPayload) -> Self {
        Self {
            time,
            target,
            payload,
        }
    }
}

/// Where an event is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    /// One of the three chip voices
    Voice(u8),
    /// Filter, volume and transport
    Global,
}

/// What an event does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventPayload {
    /// Trigger or release a note
    Note(Note),
    /// Start an effect command
    Effect(EffectCommand),
    /// Instantly set a machine parameter
    ParamChange { param: u16, value: i32 },
    /// Change tempo
    SetTempo(Tempo),
}
