//! Human-readable parameter values.

use alloc::format;
use alloc::string::{String, ToString};

use sid_ir::{EffectType, VibratoWaveform};

static ATTACK: [&str; 16] = [
    "2 ms", "8 ms", "16 ms", "24 ms", "38 ms", "56 ms", "68 ms", "80 ms", "100 ms", "240 ms",
    "500 ms", "800 ms", "1 s", "3 s", "5 s", "8 s",
];

static DECAY_RELEASE: [&str; 16] = [
    "6 ms", "24 ms", "48 ms", "72 ms", "114 ms", "168 ms", "204 ms", "240 ms", "300 ms", "750 ms",
    "1.5 s", "2.4 s", "3 s", "9 s", "15 s", "24 s",
];

pub fn attack(value: u8) -> Option<&'static str> {
    ATTACK.get(value as usize).copied()
}

pub fn decay_release(value: u8) -> Option<&'static str> {
    DECAY_RELEASE.get(value as usize).copied()
}

pub fn sustain(value: u8) -> String {
    format!("{:.0} %", value as f64 * 100.0 / 15.0)
}

pub fn pulse_width(value: i32) -> String {
    format!("{:5.1} %", value as f64 / 40.95)
}

pub fn cutoff(value: i32) -> String {
    format!("{:7.1} Hz", 30.0 + value as f64 * 10000.0 / 2047.0)
}

pub fn on_off(value: i32) -> &'static str {
    if value != 0 {
        "on"
    } else {
        "off"
    }
}

/// What an effect parameter means for a given effect type.
pub fn effect_value(kind: EffectType, value: u8) -> String {
    let high = value >> 4;
    let low = value & 0x0F;
    match kind {
        EffectType::Arpeggio => format!("+{high} / +{low} semitones"),
        EffectType::PortamentoUp | EffectType::PortamentoDown => format!("slide speed {value}"),
        EffectType::PortamentoToNote if value == 0 => "keep going".to_string(),
        EffectType::PortamentoToNote => format!("slide speed {value}"),
        EffectType::Vibrato => format!("speed {high}, depth {low}"),
        EffectType::GlissandoControl if value & 0x1 != 0 => "quantized".to_string(),
        EffectType::GlissandoControl => "smooth".to_string(),
        EffectType::VibratoType => {
            format!("Vibrato waveform: {}", VibratoWaveform::from_bits(value).name())
        }
        EffectType::Finetune => {
            let cents = (value as f64 - 128.0) * 100.0 / 256.0;
            format!("{cents:+.1} cents")
        }
        EffectType::None => "-".to_string(),
    }
}
