//! Pattern-to-event scheduling.
//!
//! Walks a song's order list and patterns, producing the tick-stamped
//! events the engine consumes during playback.

use alloc::vec::Vec;
use sid_ir::{Cell, Event, EventPayload, EventTarget, GlobalCell, Note, Song, Timestamp};

use crate::machines::sid_synth::{param, track_param};

/// Schedule all events for a song. One pattern row is one tick.
pub fn schedule_song(song: &Song) -> Vec<Event> {
    let mut events = Vec::new();
    let mut tick: u64 = 0;

    for pattern in song.ordered_patterns() {
        for row in 0..pattern.rows() {
            let time = Timestamp::from_ticks(tick + row as u64);
            schedule_global(pattern.global(row), time, &mut events);
            for (voice, cell) in pattern.row(row).iter().enumerate() {
                schedule_cell(cell, time, voice as u8, &mut events);
            }
        }
        tick += pattern.rows() as u64;
    }

    events
}

fn schedule_global(cell: &GlobalCell, time: Timestamp, events: &mut Vec<Event>) {
    let mut push = |id: u16, value: i32| {
        events.push(Event::new(
            time,
            EventTarget::Global,
            EventPayload::ParamChange { param: id, value },
        ));
    };
    if let Some(cutoff) = cell.cutoff {
        push(param::CUTOFF, cutoff as i32);
    }
    if let Some(resonance) = cell.resonance {
        push(param::RESONANCE, resonance as i32);
    }
    if let Some(volume) = cell.volume {
        push(param::VOLUME, volume as i32);
    }
}

/// Convert a single cell into events. Oscillator settings come first so
/// they are in place when the note starts.
fn schedule_cell(cell: &Cell, time: Timestamp, voice: u8, events: &mut Vec<Event>) {
    let target = EventTarget::Voice(voice);
    let mut push = |payload: EventPayload| events.push(Event::new(time, target, payload));
    let param = |id: u16, value: i32| EventPayload::ParamChange { param: id, value };

    if let Some(waveform) = cell.waveform {
        push(param(track_param::WAVEFORM, waveform.bits() as i32));
    }
    if let Some(width) = cell.pulse_width {
        push(param(track_param::PULSE_WIDTH, width as i32));
    }
    if let Some(env) = cell.envelope {
        push(param(track_param::ATTACK, env.attack as i32));
        push(param(track_param::DECAY, env.decay as i32));
        push(param(track_param::SUSTAIN, env.sustain as i32));
        push(param(track_param::RELEASE, env.release as i32));
    }
    if let Some(effect) = cell.effect {
        push(EventPayload::Effect(effect));
    }
    if cell.note != Note::None {
        push(EventPayload::Note(cell.note));
    }
}
