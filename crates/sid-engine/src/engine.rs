//! Song player.
//!
//! Drives a [`SidSynth`] from a scheduled song: events are dispatched at the
//! first subtick of each tick and every render call produces one subtick
//! buffer.

use sid_ir::{BufferClock, Event, EventPayload, EventTarget, Song, Tempo, Timestamp};
use tracing::{debug, info, warn};

use crate::config::SynthConfig;
use crate::emulation::SidEmulation;
use crate::event_queue::EventQueue;
use crate::machine::Machine;
use crate::machines::sid_synth::SidSynth;
use crate::scheduler::schedule_song;

/// Beats rendered after the last row so released notes can fade.
pub const DEFAULT_TAIL_BEATS: u64 = 2;

/// The main playback engine.
pub struct Engine<E> {
    synth: SidSynth<E>,
    queue: EventQueue,
    clock: BufferClock,
    tempo: Tempo,
    /// Largest buffer across the current tempo and every queued tempo change
    max_len: usize,
    /// Position of the next buffer
    position: Timestamp,
    /// Length of the song in ticks
    song_ticks: u64,
    tail_ticks: u64,
    released: bool,
    playing: bool,
}

impl<E: SidEmulation> Engine<E> {
    /// Create an engine for `song`. The song's tempo replaces the one in
    /// `config`.
    pub fn new(song: &Song, config: &SynthConfig, emulation: E) -> Self {
        let tempo = if song.tempo.is_valid() {
            song.tempo
        } else {
            warn!(tempo = ?song.tempo, "song tempo invalid, using config tempo");
            config.tempo
        };
        let config = SynthConfig { tempo, ..*config };
        let events = schedule_song(song);
        let clock = BufferClock::new(&tempo, config.sample_rate);
        let max_len = events
            .iter()
            .map(|event| tempo_buffer_len(event, config.sample_rate))
            .fold(clock.max_len(), usize::max);
        let queue = EventQueue::from_events(events);
        info!(
            title = %song.title,
            events = queue.len(),
            ticks = song.total_ticks(),
            "song scheduled"
        );
        Self {
            synth: SidSynth::new(&config, emulation),
            queue,
            clock,
            tempo,
            max_len,
            position: Timestamp::default(),
            song_ticks: song.total_ticks(),
            tail_ticks: DEFAULT_TAIL_BEATS * tempo.ticks_per_beat as u64,
            released: false,
            playing: true,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pause playback and release all voices.
    pub fn stop(&mut self) {
        self.playing = false;
        self.synth.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of ticks rendered after the song ends.
    pub fn set_tail_ticks(&mut self, ticks: u64) {
        self.tail_ticks = ticks;
    }

    /// Position of the next buffer.
    pub fn position(&self) -> Timestamp {
        self.position
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn synth(&self) -> &SidSynth<E> {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut SidSynth<E> {
        &mut self.synth
    }

    /// Largest buffer a render call can produce, including after any tempo
    /// change already queued.
    pub fn max_buffer_len(&self) -> usize {
        self.max_len
    }

    /// True once the song and its tail have been rendered.
    pub fn is_finished(&self) -> bool {
        self.position.tick >= self.song_ticks + self.tail_ticks
    }

    /// Queue an extra event. A slower tempo raises
    /// [`Engine::max_buffer_len`].
    pub fn schedule(&mut self, event: Event) {
        self.max_len = self
            .max_len
            .max(tempo_buffer_len(&event, self.synth.sample_rate()));
        self.queue.push(event);
    }

    /// Render the next subtick into the front of `out` and return the
    /// number of samples written. `out` should hold
    /// [`Engine::max_buffer_len`] samples; a shorter buffer renders nothing
    /// and leaves the subtick for the next call.
    pub fn render_subtick(&mut self, out: &mut [i16]) -> usize {
        if !self.playing {
            return 0;
        }
        if self.position.subtick == 0 {
            self.process_tick();
        }

        let mut clock = self.clock;
        let len = clock.next_len();
        if len > out.len() {
            warn!(len, capacity = out.len(), "output buffer too short");
            return 0;
        }
        self.clock = clock;
        let out = &mut out[..len];
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.synth.work(out));
        #[cfg(not(feature = "alloc_check"))]
        self.synth.work(out);
        self.advance();
        len
    }

    fn process_tick(&mut self) {
        for i in self.queue.drain_until(self.position) {
            if let Some(event) = self.queue.get(i).copied() {
                self.dispatch_event(&event);
            }
        }
        if !self.released && self.position.tick >= self.song_ticks {
            debug!(tick = self.position.tick, "song end, releasing voices");
            self.synth.stop();
            self.released = true;
        }
    }

    fn advance(&mut self) {
        self.position.subtick += 1;
        if self.position.subtick >= self.tempo.subticks_per_beat {
            self.position.subtick = 0;
            self.position.tick += 1;
        }
    }

    fn dispatch_event(&mut self, event: &Event) {
        match (event.target, event.payload) {
            (EventTarget::Voice(v), EventPayload::Note(note)) => {
                if let Some(voice) = self.synth.voice_mut(v as usize) {
                    voice.set_note(note);
                }
            }
            (EventTarget::Voice(v), EventPayload::Effect(cmd)) => {
                if let Some(voice) = self.synth.voice_mut(v as usize) {
                    voice.set_effect(cmd);
                }
            }
            (EventTarget::Voice(v), EventPayload::ParamChange { param, value }) => {
                self.synth.set_track_param(v, param, value);
            }
            (EventTarget::Global, EventPayload::ParamChange { param, value }) => {
                self.synth.set_param(param, value);
            }
            (_, EventPayload::SetTempo(tempo)) => self.set_tempo(tempo),
            (target, payload) => {
                warn!(?target, ?payload, "event not routable");
            }
        }
    }

    fn set_tempo(&mut self, tempo: Tempo) {
        if !tempo.is_valid() {
            warn!(?tempo, "ignoring invalid tempo");
            return;
        }
        debug!(?tempo, "tempo change");
        self.synth.set_tempo(&tempo);
        self.clock = BufferClock::new(&tempo, self.synth.sample_rate());
        self.max_len = self.max_len.max(self.clock.max_len());
        self.tempo = tempo;
    }
}

/// Buffer size a tempo event asks for, 0 for other events.
fn tempo_buffer_len(event: &Event, sample_rate: u32) -> usize {
    match event.payload {
        EventPayload::SetTempo(tempo) if tempo.is_valid() => {
            BufferClock::new(&tempo, sample_rate).max_len()
        }
        _ => 0,
    }
}
