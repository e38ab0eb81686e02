//! Per-voice oscillator, envelope and effect state.

use sid_ir::{Adsr, EffectCommand, EffectType, Note, Tuning, VibratoWaveform, Waveform};

/// Default pulse width (50% duty cycle).
pub const DEFAULT_PULSE_WIDTH: u16 = 2048;

/// Mutable state of one chip voice.
///
/// Notes and effect commands arrive as pending commands and are taken at
/// the start of the next register update; oscillator and envelope fields
/// apply on every update.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceState {
    /// Last note taken from the pending slot.
    pub note: Note,
    /// Last note that was not note-off.
    pub prev_note: Note,
    /// Instantaneous frequency in Hz (negative after note-off).
    pub frequency: f64,
    /// Frequency before the latest note.
    pub prev_frequency: f64,
    /// Target of portamento-to-note.
    pub want_frequency: f64,
    /// Ratio applied by the finetune effect.
    pub finetune: f64,
    /// Per-subtick frequency multiplier of the portamento effects.
    pub portamento_rate: f64,
    /// High-nibble note, low-nibble note, original frequency.
    pub arpeggio_frequencies: [f64; 3],
    pub vibrato_position: f64,
    pub vibrato_depth: f64,
    pub vibrato_speed: f64,
    pub vibrato_center: f64,
    pub vibrato_waveform: VibratoWaveform,
    /// Glissando control; stored only.
    pub quantize_frequency: bool,
    /// Active effect.
    pub effect_type: EffectType,
    /// Last effect parameter received.
    pub effect_value: u8,
    /// Subticks left before the active timed effect goes stale.
    pub effect_ticks_remaining: u32,

    pub waveform: Waveform,
    /// Pulse width, 12 bits.
    pub pulse_width: u16,
    pub envelope: Adsr,
    pub sync: bool,
    pub ring_mod: bool,
    pub test: bool,
    /// Route this voice through the filter.
    pub filter: bool,

    /// Latched when a note is taken; effects do not change it.
    gate: bool,
    pending_note: Option<Note>,
    pending_effect: Option<EffectCommand>,
}

impl Default for VoiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceState {
    pub fn new() -> Self {
        Self {
            note: Note::Off,
            prev_note: Note::Off,
            frequency: 0.0,
            prev_frequency: 0.0,
            want_frequency: 0.0,
            finetune: 1.0,
            portamento_rate: 1.0,
            arpeggio_frequencies: [0.0; 3],
            vibrato_position: 0.0,
            vibrato_depth: 0.0,
            vibrato_speed: 0.0,
            vibrato_center: 0.0,
            vibrato_waveform: VibratoWaveform::Sine,
            quantize_frequency: false,
            effect_type: EffectType::None,
            effect_value: 0,
            effect_ticks_remaining: 0,
            waveform: Waveform::TRIANGLE,
            pulse_width: DEFAULT_PULSE_WIDTH,
            envelope: Adsr::default(),
            sync: false,
            ring_mod: false,
            test: false,
            filter: false,
            gate: false,
            pending_note: None,
            pending_effect: None,
        }
    }

    /// Silence the voice for a new stream, keeping oscillator settings.
    pub fn reset(&mut self) {
        *self = Self {
            waveform: self.waveform,
            pulse_width: self.pulse_width,
            envelope: self.envelope,
            sync: self.sync,
            ring_mod: self.ring_mod,
            test: self.test,
            filter: self.filter,
            finetune: self.finetune,
            ..Self::new()
        };
    }

    /// Whether the envelope generator is triggered.
    pub fn gate(&self) -> bool {
        self.gate
    }

    // --- Pending commands ---

    /// Queue a note for the next update. "No note" is ignored.
    pub fn set_note(&mut self, note: Note) {
        if note != Note::None {
            self.pending_note = Some(note);
        }
    }

    /// Queue an effect type for the next update, using the current effect
    /// value. `None` is ignored.
    pub fn set_effect_type(&mut self, kind: EffectType) {
        if kind != EffectType::None {
            self.pending_effect = Some(EffectCommand::new(kind, self.effect_value));
        }
    }

    /// Set the effect parameter, also updating a pending command.
    pub fn set_effect_value(&mut self, value: u8) {
        self.effect_value = value;
        if let Some(cmd) = self.pending_effect.as_mut() {
            cmd.value = value;
        }
    }

    /// Queue a complete effect command.
    pub fn set_effect(&mut self, cmd: EffectCommand) {
        self.set_effect_value(cmd.value);
        self.set_effect_type(cmd.kind);
    }

    pub fn pending_note(&self) -> Option<Note> {
        self.pending_note
    }

    pub fn pending_effect(&self) -> Option<EffectCommand> {
        self.pending_effect
    }

    pub(crate) fn take_note(&mut self) -> Option<Note> {
        self.pending_note.take()
    }

    pub(crate) fn take_effect(&mut self) -> Option<EffectCommand> {
        self.pending_effect.take()
    }

    /// Start a note: remember the previous frequency, translate the new
    /// one and open the gate if it is audible.
    pub fn apply_note(&mut self, note: Note, tuning: Tuning) {
        self.prev_frequency = self.frequency;
        self.note = note;
        if note != Note::Off {
            self.prev_note = note;
        }
        self.frequency = tuning.translate(note);
        self.gate = self.frequency > 0.0;
    }

    // --- Oscillator settings ---

    pub fn set_pulse_width(&mut self, width: u16) {
        self.pulse_width = width & 0x0FFF;
    }

    pub fn set_envelope(&mut self, envelope: Adsr) {
        self.envelope = Adsr {
            attack: envelope.attack & 0x0F,
            decay: envelope.decay & 0x0F,
            sustain: envelope.sustain & 0x0F,
            release: envelope.release & 0x0F,
        };
    }
}
