//! SidSynth: three-voice SID synthesizer machine.
//!
//! Each `work` call renders one subtick. While any voice runs a timed
//! effect the buffer is split into [`SUBTICK_SEGMENTS`] segments so
//! effects advance several times per buffer; otherwise the registers are
//! updated once and the whole buffer is clocked in one go.

use alloc::format;
use alloc::string::{String, ToString};

use sid_ir::{
    ChipModel, ClockRate, EffectType, Note, SubtickCounter, Tempo, Tuning, Waveform, NUM_VOICES,
    SUBTICK_SEGMENTS,
};
use tracing::{debug, info, trace, warn};

use crate::config::SynthConfig;
use crate::effects::{update_voice, EffectContext};
use crate::emulation::SidEmulation;
use crate::machine::{Machine, MachineInfo, ParamInfo};
use crate::machines::describe;
use crate::registers::{encode, ChipState, RegisterEncoder};
use crate::voice::VoiceState;

/// Global parameter ids.
pub mod param {
    pub const CUTOFF: u16 = 0;
    pub const RESONANCE: u16 = 1;
    pub const VOLUME: u16 = 2;
    pub const LOW_PASS: u16 = 3;
    pub const BAND_PASS: u16 = 4;
    pub const HIGH_PASS: u16 = 5;
    pub const VOICE3_OFF: u16 = 6;
}

/// Per-voice parameter ids.
pub mod track_param {
    pub const NOTE: u16 = 0;
    pub const SYNC: u16 = 1;
    pub const RING_MOD: u16 = 2;
    pub const TEST: u16 = 3;
    pub const WAVEFORM: u16 = 4;
    pub const PULSE_WIDTH: u16 = 5;
    pub const FILTER: u16 = 6;
    pub const ATTACK: u16 = 7;
    pub const DECAY: u16 = 8;
    pub const SUSTAIN: u16 = 9;
    pub const RELEASE: u16 = 10;
    pub const EFFECT_TYPE: u16 = 11;
    pub const EFFECT_VALUE: u16 = 12;
}

const fn flag(id: u16, name: &'static str) -> ParamInfo {
    ParamInfo {
        id,
        name,
        min: 0,
        max: 1,
        default: 0,
        no_value: -1,
    }
}

const fn nibble(id: u16, name: &'static str, default: i32) -> ParamInfo {
    ParamInfo {
        id,
        name,
        min: 0,
        max: 15,
        default,
        no_value: -1,
    }
}

static PARAMS: &[ParamInfo] = &[
    ParamInfo {
        id: param::CUTOFF,
        name: "Cutoff",
        min: 0,
        max: 2047,
        default: 1024,
        no_value: -1,
    },
    nibble(param::RESONANCE, "Resonance", 2),
    nibble(param::VOLUME, "Volume", 15),
    flag(param::LOW_PASS, "Low-pass"),
    flag(param::BAND_PASS, "Band-pass"),
    flag(param::HIGH_PASS, "High-pass"),
    flag(param::VOICE3_OFF, "Voice 3 off"),
];

static TRACK_PARAMS: &[ParamInfo] = &[
    ParamInfo {
        id: track_param::NOTE,
        name: "Note",
        min: 0,
        max: 255,
        default: 0,
        no_value: 0,
    },
    flag(track_param::SYNC, "Sync"),
    flag(track_param::RING_MOD, "Ring mod"),
    flag(track_param::TEST, "Test"),
    ParamInfo {
        id: track_param::WAVEFORM,
        name: "Waveform",
        min: 0,
        max: 15,
        default: 1,
        no_value: -1,
    },
    ParamInfo {
        id: track_param::PULSE_WIDTH,
        name: "Pulse width",
        min: 0,
        max: 4095,
        default: 2048,
        no_value: -1,
    },
    flag(track_param::FILTER, "Filter"),
    nibble(track_param::ATTACK, "Attack", 2),
    nibble(track_param::DECAY, "Decay", 2),
    nibble(track_param::SUSTAIN, "Sustain", 10),
    nibble(track_param::RELEASE, "Release", 5),
    ParamInfo {
        id: track_param::EFFECT_TYPE,
        name: "Effect type",
        min: 0,
        max: 255,
        default: 0xFF,
        no_value: 0xFF,
    },
    ParamInfo {
        id: track_param::EFFECT_VALUE,
        name: "Effect value",
        min: 0,
        max: 255,
        default: 0,
        no_value: -1,
    },
];

static INFO: MachineInfo = MachineInfo {
    name: "SID Synth",
    short_name: "SidSyn",
    author: "sidsyn",
    params: PARAMS,
    track_params: TRACK_PARAMS,
    tracks: NUM_VOICES as u8,
};

/// Sample counts of the segments a buffer of `len` samples is split into.
///
/// The first segment absorbs the remainder.
pub fn segment_lengths(len: usize) -> [usize; SUBTICK_SEGMENTS as usize] {
    let segments = SUBTICK_SEGMENTS as usize;
    let n = len / segments;
    let mut lengths = [n; SUBTICK_SEGMENTS as usize];
    lengths[0] = len - (segments - 1) * n;
    lengths
}

/// Resolve a raw parameter value: `None` for "no value", clamped otherwise.
fn resolve(info: &ParamInfo, value: i32) -> Option<i32> {
    if value == info.no_value {
        return None;
    }
    let clamped = info.clamp(value);
    if clamped != value {
        warn!(param = info.name, value, clamped, "parameter out of range");
    }
    Some(clamped)
}

/// Three-voice SID synthesizer driving a chip emulation.
pub struct SidSynth<E> {
    voices: [VoiceState; NUM_VOICES],
    chip: ChipState,
    encoder: RegisterEncoder,
    emulation: E,
    chip_model: ChipModel,
    tuning: Tuning,
    clock: ClockRate,
    sample_rate: u32,
    tempo: Tempo,
    counter: SubtickCounter,
    /// Effect type last set through the parameter surface, for value hints
    last_effect: EffectType,
}

impl<E: SidEmulation> SidSynth<E> {
    /// Create a synth and run the emulation setup sequence.
    pub fn new(config: &SynthConfig, emulation: E) -> Self {
        let mut synth = Self {
            voices: [VoiceState::new(), VoiceState::new(), VoiceState::new()],
            chip: ChipState::default(),
            encoder: RegisterEncoder::new(),
            emulation,
            chip_model: config.chip_model,
            tuning: config.tuning,
            clock: config.clock,
            sample_rate: config.sample_rate,
            tempo: config.tempo,
            counter: SubtickCounter::new(config.tempo.subticks_per_beat),
            last_effect: EffectType::None,
        };
        synth.setup();
        synth
    }

    /// Reset the emulation, silence all voices and force a full register
    /// write on the next update.
    pub fn setup(&mut self) {
        self.emulation.reset();
        self.emulation.set_chip_model(self.chip_model);
        self.emulation
            .set_sampling_parameters(self.clock.hz(), self.sample_rate);
        for voice in &mut self.voices {
            voice.reset();
        }
        self.encoder.reset();
        self.counter.reset(self.tempo.subticks_per_beat);
        info!(
            chip = self.chip_model.name(),
            clock = self.clock.hz(),
            sample_rate = self.sample_rate,
            tuning = self.tuning.name(),
            "sid setup"
        );
    }

    pub fn voice(&self, index: usize) -> Option<&VoiceState> {
        self.voices.get(index)
    }

    pub fn voice_mut(&mut self, index: usize) -> Option<&mut VoiceState> {
        self.voices.get_mut(index)
    }

    pub fn voices(&self) -> &[VoiceState; NUM_VOICES] {
        &self.voices
    }

    pub fn chip(&self) -> &ChipState {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipState {
        &mut self.chip
    }

    pub fn emulation(&self) -> &E {
        &self.emulation
    }

    pub fn emulation_mut(&mut self) -> &mut E {
        &mut self.emulation
    }

    pub fn encoder(&self) -> &RegisterEncoder {
        &self.encoder
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current 1-based subtick within the tick.
    pub fn subtick(&self) -> u16 {
        self.counter.count()
    }

    /// Takes effect with the next note.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn set_chip_model(&mut self, model: ChipModel) {
        self.chip_model = model;
        self.setup();
    }

    pub fn set_clock(&mut self, clock: ClockRate) {
        self.clock = clock;
        self.setup();
    }

    /// Sum of the effect countdowns across all voices.
    pub fn effect_subticks_remaining(&self) -> u32 {
        self.voices.iter().map(|v| v.effect_ticks_remaining).sum()
    }

    /// True while any voice has its gate open.
    pub fn is_gated(&self) -> bool {
        self.voices.iter().any(VoiceState::gate)
    }

    /// Effect type an effect value is read against: the one last set as a
    /// parameter, else the first pending or running effect on any voice.
    fn effect_context(&self) -> EffectType {
        if self.last_effect != EffectType::None {
            return self.last_effect;
        }
        self.voices
            .iter()
            .map(|v| v.pending_effect().map_or(v.effect_type, |cmd| cmd.kind))
            .find(|kind| *kind != EffectType::None)
            .unwrap_or(EffectType::None)
    }

    /// Run the effect state machine on every voice and write changed
    /// registers to the chip.
    fn update_regs(&mut self) {
        let ctx = EffectContext {
            tuning: self.tuning,
            armed_subticks: self.tempo.effect_subticks(),
        };
        for (i, voice) in self.voices.iter_mut().enumerate() {
            update_voice(i, voice, &ctx);
        }
        let image = encode(&self.voices, &self.chip, self.clock.hz());
        for write in self.encoder.diff(&image).iter() {
            trace!(register = write.register, value = write.value, "reg write");
            self.emulation.write(write.register, write.value);
        }
    }

    /// Clock the chip until `out` is filled.
    fn render(&mut self, out: &mut [i16]) {
        if self.sample_rate == 0 {
            warn!("no sample rate, rendering silence");
            out.fill(0);
            return;
        }
        let scale = self.clock.hz() as f64 / self.sample_rate as f64;
        let mut done = 0;
        while done < out.len() {
            let remaining = out.len() - done;
            let delta = ((scale * remaining as f64) as u32).saturating_add(4);
            let produced = self.emulation.clock(delta, &mut out[done..]);
            if produced == 0 {
                warn!(missing = remaining, "emulation produced no samples");
                out[done..].fill(0);
                break;
            }
            done += produced.min(remaining);
        }
    }

    /// Render one subtick buffer.
    ///
    /// `subtick` is the 1-based position of this buffer inside its tick; it
    /// decides which segments are sync points.
    pub fn process_subtick(&mut self, out: &mut [i16], subtick: u16) {
        if self.effect_subticks_remaining() == 0 {
            trace!(subtick, "sync");
            self.update_regs();
            self.render(out);
            return;
        }

        let stpb = self.tempo.subticks_per_beat.max(1) as u32;
        let mut step = SUBTICK_SEGMENTS * (subtick.max(1) as u32 - 1);
        let mut start = 0;
        for len in segment_lengths(out.len()) {
            if step % stpb == 0 {
                trace!(subtick, step, "sync");
                self.update_regs();
            }
            self.render(&mut out[start..start + len]);
            start += len;
            step += 1;
        }
    }

    fn set_voice_param(&mut self, track: usize, id: u16, value: i32) {
        let Some(voice) = self.voices.get_mut(track) else {
            warn!(track, "no such voice");
            return;
        };
        match id {
            track_param::NOTE => voice.set_note(Note::from_number(value as u8)),
            track_param::SYNC => voice.sync = value != 0,
            track_param::RING_MOD => voice.ring_mod = value != 0,
            track_param::TEST => voice.test = value != 0,
            track_param::WAVEFORM => match Waveform::from_bits(value as u8) {
                Some(wave) if wave.is_valid() => voice.waveform = wave,
                _ => warn!(track, value, "invalid waveform"),
            },
            track_param::PULSE_WIDTH => voice.set_pulse_width(value as u16),
            track_param::FILTER => voice.filter = value != 0,
            track_param::ATTACK => voice.envelope.attack = value as u8,
            track_param::DECAY => voice.envelope.decay = value as u8,
            track_param::SUSTAIN => voice.envelope.sustain = value as u8,
            track_param::RELEASE => voice.envelope.release = value as u8,
            track_param::EFFECT_TYPE => {
                let kind = EffectType::from_raw(value as u8);
                debug!(track, effect = kind.name(), "effect type");
                voice.set_effect_type(kind);
                if kind != EffectType::None {
                    self.last_effect = kind;
                }
            }
            track_param::EFFECT_VALUE => voice.set_effect_value(value as u8),
            _ => {}
        }
    }
}

impl<E: SidEmulation> Machine for SidSynth<E> {
    fn info(&self) -> &MachineInfo {
        &INFO
    }

    fn init(&mut self, sample_rate: u32) {
        if sample_rate == 0 {
            warn!("ignoring zero sample rate");
            return;
        }
        self.sample_rate = sample_rate;
        self.setup();
    }

    fn set_tempo(&mut self, tempo: &Tempo) {
        if !tempo.is_valid() {
            warn!(?tempo, "ignoring invalid tempo");
            return;
        }
        self.tempo = *tempo;
        self.counter.reset(tempo.subticks_per_beat);
    }

    fn work(&mut self, buffer: &mut [i16]) -> bool {
        let subtick = self.counter.count();
        self.process_subtick(buffer, subtick);
        self.counter.advance();
        self.is_gated()
    }

    fn stop(&mut self) {
        for voice in &mut self.voices {
            voice.set_note(Note::Off);
        }
    }

    fn set_param(&mut self, id: u16, value: i32) {
        let Some(info) = INFO.param(id) else {
            warn!(param = id, "unknown parameter");
            return;
        };
        let Some(value) = resolve(info, value) else {
            return;
        };
        let chip = &mut self.chip;
        match id {
            param::CUTOFF => chip.cutoff = value as u16,
            param::RESONANCE => chip.resonance = value as u8,
            param::VOLUME => chip.volume = value as u8,
            param::LOW_PASS => chip.low_pass = value != 0,
            param::BAND_PASS => chip.band_pass = value != 0,
            param::HIGH_PASS => chip.high_pass = value != 0,
            param::VOICE3_OFF => chip.voice3_off = value != 0,
            _ => {}
        }
    }

    fn set_track_param(&mut self, track: u8, id: u16, value: i32) {
        let Some(info) = INFO.track_param(id) else {
            warn!(param = id, "unknown track parameter");
            return;
        };
        if let Some(value) = resolve(info, value) {
            self.set_voice_param(track as usize, id, value);
        }
    }

    fn describe_param(&self, id: u16, value: i32) -> Option<String> {
        match id {
            param::CUTOFF => Some(describe::cutoff(value)),
            param::LOW_PASS | param::BAND_PASS | param::HIGH_PASS | param::VOICE3_OFF => {
                Some(describe::on_off(value).to_string())
            }
            param::RESONANCE | param::VOLUME => Some(format!("{value}")),
            _ => None,
        }
    }

    fn describe_track_param(&self, id: u16, value: i32) -> Option<String> {
        let byte = u8::try_from(value).ok();
        match id {
            track_param::NOTE => byte.map(|b| Note::from_number(b).to_string()),
            track_param::SYNC | track_param::RING_MOD | track_param::TEST | track_param::FILTER => {
                Some(describe::on_off(value).to_string())
            }
            track_param::WAVEFORM => byte
                .and_then(Waveform::from_bits)
                .and_then(Waveform::name)
                .map(str::to_string),
            track_param::PULSE_WIDTH => Some(describe::pulse_width(value)),
            track_param::ATTACK => byte.and_then(describe::attack).map(str::to_string),
            track_param::DECAY | track_param::RELEASE => {
                byte.and_then(describe::decay_release).map(str::to_string)
            }
            track_param::SUSTAIN => byte.filter(|b| *b <= 15).map(describe::sustain),
            track_param::EFFECT_TYPE => byte.map(|b| EffectType::from_raw(b).name().to_string()),
            track_param::EFFECT_VALUE => byte.map(|b| match self.effect_context() {
                EffectType::None => format!("0x{b:02x}"),
                kind => describe::effect_value(kind, b),
            }),
            _ => None,
        }
    }
}
