//! Voice effect commands.

use serde::{Deserialize, Serialize};

/// Effect selected on a voice.
///
/// The discriminants are the raw codes used on the parameter surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EffectType {
    /// Cycle between the note and two semitone offsets
    Arpeggio = 0x00,
    /// Slide pitch up at a fixed rate
    PortamentoUp = 0x01,
    /// Slide pitch down at a fixed rate
    PortamentoDown = 0x02,
    /// Slide from the previous note to the new one
    PortamentoToNote = 0x03,
    /// Periodic pitch modulation
    Vibrato = 0x04,
    /// Toggle semitone quantization of slides
    GlissandoControl = 0xE3,
    /// Select the vibrato waveform
    VibratoType = 0xE4,
    /// Set the voice finetune ratio
    Finetune = 0xE5,
    #[default]
    None = 0xFF,
}

impl EffectType {
    /// Decode a raw effect code; unknown codes map to `None`.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => EffectType::Arpeggio,
            0x01 => EffectType::PortamentoUp,
            0x02 => EffectType::PortamentoDown,
            0x03 => EffectType::PortamentoToNote,
            0x04 => EffectType::Vibrato,
            0xE3 => EffectType::GlissandoControl,
            0xE4 => EffectType::VibratoType,
            0xE5 => EffectType::Finetune,
            _ => EffectType::None,
        }
    }

    /// Raw effect code.
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            EffectType::Arpeggio => "Arpeggio",
            EffectType::PortamentoUp => "Portamento up",
            EffectType::PortamentoDown => "Portamento down",
            EffectType::PortamentoToNote => "Portamento",
            EffectType::Vibrato => "Vibrato",
            EffectType::GlissandoControl => "Glissando control",
            EffectType::VibratoType => "Vibrato type",
            EffectType::Finetune => "Finetune",
            EffectType::None => "None",
        }
    }
}

/// An effect type paired with its 8-bit parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectCommand {
    pub kind: EffectType,
    #[serde(default)]
    pub value: u8,
}

impl EffectCommand {
    pub const fn new(kind: EffectType, value: u8) -> Self {
        Self { kind, value }
    }

    pub const fn arpeggio(value: u8) -> Self {
        Self::new(EffectType::Arpeggio, value)
    }

    pub const fn vibrato(speed: u8, depth: u8) -> Self {
        Self::new(EffectType::Vibrato, (speed << 4) | (depth & 0x0F))
    }

    /// High nibble of the parameter.
    pub const fn high(self) -> u8 {
        self.value >> 4
    }

    /// Low nibble of the parameter.
    pub const fn low(self) -> u8 {
        self.value & 0x0F
    }
}

/// Waveform used by the vibrato effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibratoWaveform {
    #[default]
    Sine,
    RampDown,
    Square,
    /// Selector value 3: no modulation
    Flat,
}

impl VibratoWaveform {
    /// Decode the low two bits of a vibrato-type parameter.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => VibratoWaveform::Sine,
            1 => VibratoWaveform::RampDown,
            2 => VibratoWaveform::Square,
            _ => VibratoWaveform::Flat,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            VibratoWaveform::Sine => "Sine",
            VibratoWaveform::RampDown => "Ramp down",
            VibratoWaveform::Square => "Square",
            VibratoWaveform::Flat => "Flat",
        }
    }
}
