//! Time-ordered queue of scheduled events.

use alloc::vec::Vec;
use sid_ir::{Event, Timestamp};

/// Events sorted by timestamp.
///
/// Playback consumes events through a cursor that only moves forward, so
/// the render path never allocates or shifts elements.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    /// Next event index to process
    cursor: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor: 0,
        }
    }

    /// Build a queue from events in any order. Events with equal timestamps
    /// keep their relative order.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.time);
        Self { events, cursor: 0 }
    }

    /// Insert an event after any others with the same timestamp.
    pub fn push(&mut self, event: Event) {
        let pos = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(pos, event);
    }

    /// Index range of events at or before `time`.
    ///
    /// Advances the cursor past the returned events; index them with
    /// [`EventQueue::get`].
    pub fn drain_until(&mut self, time: Timestamp) -> core::ops::Range<usize> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].time <= time {
            self.cursor += 1;
        }
        start..self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use sid_ir::{EventPayload, EventTarget, Note};

    fn note_at(tick: u64, voice: u8) -> Event {
        Event::new(
            Timestamp::from_ticks(tick),
            EventTarget::Voice(voice),
            EventPayload::Note(Note::from_octave_semitone(4, 0)),
        )
    }

    #[test]
    fn push_keeps_order() {
        let mut queue = EventQueue::new();
        queue.push(note_at(10, 0));
        queue.push(note_at(5, 0));
        queue.push(note_at(15, 0));
        queue.push(note_at(5, 1));

        let ticks: Vec<u64> = (0..queue.len()).map(|i| queue.get(i).unwrap().time.tick).collect();
        assert_eq!(ticks, vec![5, 5, 10, 15]);
        // equal timestamps keep insertion order
        assert_eq!(queue.get(1).unwrap().target, EventTarget::Voice(1));
    }

    #[test]
    fn from_events_is_stable() {
        let queue = EventQueue::from_events(vec![note_at(3, 2), note_at(1, 0), note_at(3, 1)]);
        assert_eq!(queue.get(0).unwrap().time.tick, 1);
        assert_eq!(queue.get(1).unwrap().target, EventTarget::Voice(2));
        assert_eq!(queue.get(2).unwrap().target, EventTarget::Voice(1));
    }

    #[test]
    fn drain_until_advances_cursor() {
        let mut queue = EventQueue::from_events(vec![note_at(5, 0), note_at(10, 0), note_at(15, 0)]);

        assert_eq!(queue.drain_until(Timestamp::from_ticks(4)), 0..0);
        assert_eq!(queue.drain_until(Timestamp::from_ticks(12)), 0..2);
        assert_eq!(queue.drain_until(Timestamp::from_ticks(12)), 2..2);
        assert_eq!(queue.drain_until(Timestamp::new(15, 1)), 2..3);
        assert_eq!(queue.drain_until(Timestamp::from_ticks(99)), 3..3);
    }
}
