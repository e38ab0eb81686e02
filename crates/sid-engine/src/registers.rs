//! Register image encoding and diffing.
//!
//! The chip exposes 29 registers: 7 per voice, 4 for filter and volume,
//! and 4 read-only ones at the top. Only registers whose value changed
//! since the last pass are written.

use heapless::Vec;
use serde::{Deserialize, Serialize};
use sid_ir::NUM_VOICES;

use crate::voice::VoiceState;

/// Size of the register file.
pub const NUM_REGS: usize = 29;
/// Registers `0x00..=0x18` accept writes.
pub const WRITABLE_REGS: usize = 25;
/// Registers per voice.
pub const VOICE_REGS: usize = 7;

pub const REG_CUTOFF_LO: u8 = 0x15;
pub const REG_CUTOFF_HI: u8 = 0x16;
pub const REG_RESONANCE_FILTER: u8 = 0x17;
pub const REG_MODE_VOLUME: u8 = 0x18;

/// Voice register offsets.
pub const VOICE_FREQ_LO: u8 = 0;
pub const VOICE_FREQ_HI: u8 = 1;
pub const VOICE_PW_LO: u8 = 2;
pub const VOICE_PW_HI: u8 = 3;
pub const VOICE_CONTROL: u8 = 4;
pub const VOICE_ATTACK_DECAY: u8 = 5;
pub const VOICE_SUSTAIN_RELEASE: u8 = 6;

/// Full register file contents.
pub type RegisterImage = [u8; NUM_REGS];

/// Order writes are issued in: control last within each voice so the gate
/// flips after the envelope is set up.
pub const WRITE_ORDER: [u8; WRITABLE_REGS] = write_order();

const fn write_order() -> [u8; WRITABLE_REGS] {
    const VOICE_ORDER: [u8; VOICE_REGS] = [
        VOICE_FREQ_LO,
        VOICE_FREQ_HI,
        VOICE_PW_LO,
        VOICE_PW_HI,
        VOICE_ATTACK_DECAY,
        VOICE_SUSTAIN_RELEASE,
        VOICE_CONTROL,
    ];
    let mut order = [0u8; WRITABLE_REGS];
    let mut i = 0;
    while i < NUM_VOICES * VOICE_REGS {
        order[i] = ((i / VOICE_REGS) * VOICE_REGS) as u8 + VOICE_ORDER[i % VOICE_REGS];
        i += 1;
    }
    while i < WRITABLE_REGS {
        order[i] = REG_CUTOFF_LO + (i - NUM_VOICES * VOICE_REGS) as u8;
        i += 1;
    }
    order
}

/// A single register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    pub register: u8,
    pub value: u8,
}

/// Filter and volume settings shared by all voices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipState {
    /// Filter cutoff, 11 bits
    pub cutoff: u16,
    /// Filter resonance, 4 bits
    pub resonance: u8,
    /// Master volume, 4 bits
    pub volume: u8,
    pub low_pass: bool,
    pub band_pass: bool,
    pub high_pass: bool,
    /// Disconnect voice 3 from the output
    pub voice3_off: bool,
}

impl Default for ChipState {
    fn default() -> Self {
        Self {
            cutoff: 1024,
            resonance: 2,
            volume: 15,
            low_pass: false,
            band_pass: false,
            high_pass: false,
            voice3_off: false,
        }
    }
}

/// Convert a frequency to the 16-bit oscillator register value.
///
/// Frequencies at or below zero give 0; values beyond the register range
/// wrap.
pub fn frequency_to_tone(frequency: f64, clock_hz: u32) -> u16 {
    if frequency > 0.0 {
        ((frequency * (1u32 << 24) as f64) / clock_hz as f64) as u32 as u16
    } else {
        0
    }
}

/// Build the register image for the current voice and chip state.
pub fn encode(voices: &[VoiceState; NUM_VOICES], chip: &ChipState, clock_hz: u32) -> RegisterImage {
    let mut regs = [0u8; NUM_REGS];
    let mut filters = 0u8;

    for (i, voice) in voices.iter().enumerate() {
        let base = i * VOICE_REGS;
        let tone = frequency_to_tone(voice.frequency, clock_hz);
        let env = voice.envelope;

        regs[base + VOICE_FREQ_LO as usize] = tone as u8;
        regs[base + VOICE_FREQ_HI as usize] = (tone >> 8) as u8;
        regs[base + VOICE_PW_LO as usize] = voice.pulse_width as u8;
        regs[base + VOICE_PW_HI as usize] = ((voice.pulse_width >> 8) & 0x0F) as u8;
        regs[base + VOICE_CONTROL as usize] = (voice.waveform.bits() << 4)
            | ((voice.test as u8) << 3)
            | ((voice.ring_mod as u8) << 2)
            | ((voice.sync as u8) << 1)
            | voice.gate() as u8;
        regs[base + VOICE_ATTACK_DECAY as usize] = ((env.attack & 0x0F) << 4) | (env.decay & 0x0F);
        regs[base + VOICE_SUSTAIN_RELEASE as usize] =
            ((env.sustain & 0x0F) << 4) | (env.release & 0x0F);

        if voice.filter {
            filters |= 1 << i;
        }
    }

    regs[REG_CUTOFF_LO as usize] = (chip.cutoff & 0x07) as u8;
    regs[REG_CUTOFF_HI as usize] = ((chip.cutoff >> 3) & 0xFF) as u8;
    regs[REG_RESONANCE_FILTER as usize] = ((chip.resonance & 0x0F) << 4) | filters;
    regs[REG_MODE_VOLUME as usize] = ((chip.voice3_off as u8) << 7)
        | ((chip.high_pass as u8) << 6)
        | ((chip.band_pass as u8) << 5)
        | ((chip.low_pass as u8) << 4)
        | (chip.volume & 0x0F);
    regs
}

/// Remembers the last written image and reports what changed.
#[derive(Clone, Debug, Default)]
pub struct RegisterEncoder {
    previous: Option<RegisterImage>,
}

impl RegisterEncoder {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Forget the last image so the next diff writes every register.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Last image handed to [`RegisterEncoder::diff`].
    pub fn previous(&self) -> Option<&RegisterImage> {
        self.previous.as_ref()
    }

    /// Writes needed to move the chip from the last image to `image`.
    pub fn diff(&mut self, image: &RegisterImage) -> Vec<RegisterWrite, WRITABLE_REGS> {
        let mut writes = Vec::new();
        for &reg in WRITE_ORDER.iter() {
            let value = image[reg as usize];
            let changed = self.previous.map_or(true, |prev| prev[reg as usize] != value);
            if changed {
                // capacity equals the number of writable registers
                let _ = writes.push(RegisterWrite { register: reg, value });
            }
        }
        self.previous = Some(*image);
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sid_ir::{Adsr, ClockRate, Note, Tuning, Waveform};

    fn voices() -> [VoiceState; NUM_VOICES] {
        [VoiceState::new(), VoiceState::new(), VoiceState::new()]
    }

    #[test]
    fn write_order_puts_control_last() {
        assert_eq!(&WRITE_ORDER[..7], &[0, 1, 2, 3, 5, 6, 4]);
        assert_eq!(&WRITE_ORDER[7..14], &[7, 8, 9, 10, 12, 13, 11]);
        assert_eq!(&WRITE_ORDER[21..], &[0x15, 0x16, 0x17, 0x18]);
    }

    #[test]
    fn tone_conversion() {
        // 440 Hz on PAL: 440 * 2^24 / 985248 = 7492.5...
        assert_eq!(frequency_to_tone(440.0, 985_248), 7492);
        assert_eq!(frequency_to_tone(0.0, 985_248), 0);
        assert_eq!(frequency_to_tone(-1.0, 985_248), 0);
    }

    #[test]
    fn ntsc_clock_lowers_tone() {
        let mut voices = voices();
        voices[0].apply_note(Note::from_octave_semitone(3, 9), Tuning::EqualTemperament);
        let pal = encode(&voices, &ChipState::default(), ClockRate::PAL_HZ);
        let ntsc = encode(&voices, &ChipState::default(), ClockRate::NTSC_HZ);
        // 440 * 2^24 / 1022727 = 7217.9...
        assert_eq!(u16::from_le_bytes([ntsc[0], ntsc[1]]), 7217);
        assert_eq!(u16::from_le_bytes([pal[0], pal[1]]), 7492);
        assert_eq!(&ntsc[2..], &pal[2..]);
    }

    #[test]
    fn tone_wraps_above_register_range() {
        let clock = 985_248;
        let top = 65536.0 * clock as f64 / (1u32 << 24) as f64;
        // one Hz above the top adds 2^24 / clock = 17.03 steps past the wrap
        assert_eq!(frequency_to_tone(top + 1.0, clock), 17);
    }

    #[test]
    fn voice_layout() {
        let mut voices = voices();
        let v = &mut voices[1];
        v.apply_note(Note::from_octave_semitone(3, 9), Tuning::EqualTemperament);
        v.waveform = Waveform::PULSE | Waveform::SAW;
        v.set_pulse_width(0x0ABC);
        v.set_envelope(Adsr { attack: 1, decay: 2, sustain: 3, release: 4 });
        v.sync = true;
        v.ring_mod = true;
        v.filter = true;

        let regs = encode(&voices, &ChipState::default(), 985_248);
        assert_eq!(u16::from_le_bytes([regs[7], regs[8]]), 7492);
        assert_eq!(regs[9], 0xBC);
        assert_eq!(regs[10], 0x0A);
        assert_eq!(regs[11], 0x60 | 0x04 | 0x02 | 0x01);
        assert_eq!(regs[12], 0x12);
        assert_eq!(regs[13], 0x34);
        assert_eq!(regs[0x17] & 0x07, 0b010);
        // silent voices keep the gate closed
        assert_eq!(regs[4], 0x10);
    }

    #[test]
    fn global_layout() {
        let chip = ChipState {
            cutoff: 0x7FF,
            resonance: 0xA,
            volume: 9,
            low_pass: true,
            band_pass: false,
            high_pass: true,
            voice3_off: true,
        };
        let regs = encode(&voices(), &chip, 985_248);
        assert_eq!(regs[0x15], 0x07);
        assert_eq!(regs[0x16], 0xFF);
        assert_eq!(regs[0x17], 0xA0);
        assert_eq!(regs[0x18], 0x80 | 0x40 | 0x10 | 9);
    }

    #[test]
    fn first_diff_writes_everything() {
        let mut encoder = RegisterEncoder::new();
        let image = encode(&voices(), &ChipState::default(), 985_248);
        let writes = encoder.diff(&image);
        assert_eq!(writes.len(), WRITABLE_REGS);
        assert_eq!(encoder.previous(), Some(&image));
    }

    #[test]
    fn identical_state_writes_nothing() {
        let mut encoder = RegisterEncoder::new();
        let voices = voices();
        let chip = ChipState::default();
        encoder.diff(&encode(&voices, &chip, 985_248));
        let writes = encoder.diff(&encode(&voices, &chip, 985_248));
        assert!(writes.is_empty());
    }

    #[test]
    fn only_changed_registers_are_written() {
        let mut encoder = RegisterEncoder::new();
        let mut voices = voices();
        let chip = ChipState::default();
        encoder.diff(&encode(&voices, &chip, 985_248));

        voices[2].set_pulse_width(0x0801);
        let writes = encoder.diff(&encode(&voices, &chip, 985_248));
        assert_eq!(writes.as_slice(), &[RegisterWrite { register: 16, value: 0x01 }]);
    }

    #[test]
    fn reset_forces_full_write() {
        let mut encoder = RegisterEncoder::new();
        let image = encode(&voices(), &ChipState::default(), 985_248);
        encoder.diff(&image);
        encoder.reset();
        assert_eq!(encoder.diff(&image).len(), WRITABLE_REGS);
    }
}
