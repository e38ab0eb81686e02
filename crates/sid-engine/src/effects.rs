//! Effect state machine.
//!
//! A register update takes a voice through three steps: a pending note is
//! applied, a pending effect command is initialised once, and the armed
//! effect advances by one subtick.

use core::f64::consts::{PI, TAU};

use sid_ir::{EffectCommand, EffectType, Tuning, VibratoWaveform};
use tracing::{debug, trace};

use crate::voice::VoiceState;

/// Shared inputs for effect processing.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext {
    pub tuning: Tuning,
    /// Countdown a timed effect is armed with.
    pub armed_subticks: u32,
}

/// Frequency multiplier for a portamento speed, per subtick.
pub fn portamento_rate(value: u8) -> f64 {
    libm::pow(2.0, value as f64 / 512.0)
}

/// Finetune ratio for a value centred on 128 (1/256 semitone steps).
pub fn finetune_ratio(value: u8) -> f64 {
    if value >= 128 {
        libm::pow(2.0, ((value - 128) as f64 / 256.0) / 12.0)
    } else {
        1.0 / libm::pow(2.0, ((128 - value) as f64 / 256.0) / 12.0)
    }
}

/// Run one register-update pass of the state machine on a voice.
pub fn update_voice(index: usize, voice: &mut VoiceState, ctx: &EffectContext) {
    if let Some(note) = voice.take_note() {
        voice.apply_note(note, ctx.tuning);
        debug!(voice = index, %note, frequency = voice.frequency, "note on");
    }
    if let Some(cmd) = voice.take_effect() {
        start_effect(index, voice, cmd, ctx);
    }
    advance_effect(index, voice);
}

/// Initialise an effect command.
///
/// Commands whose preconditions fail degrade to `EffectType::None` and
/// clear the countdown.
pub fn start_effect(index: usize, voice: &mut VoiceState, cmd: EffectCommand, ctx: &EffectContext) {
    voice.effect_type = cmd.kind;
    voice.effect_value = cmd.value;

    match cmd.kind {
        EffectType::Arpeggio => {
            if cmd.value == 0 {
                cancel(voice);
                return;
            }
            // prev_note keeps the arpeggio running after note-off
            let high = voice.prev_note.offset(cmd.high());
            let low = voice.prev_note.offset(cmd.low());
            voice.arpeggio_frequencies = [
                voice.finetune * ctx.tuning.translate(high),
                voice.finetune * ctx.tuning.translate(low),
                voice.frequency,
            ];
            voice.effect_ticks_remaining = ctx.armed_subticks;
            debug!(
                voice = index,
                value = cmd.value,
                frequencies = ?voice.arpeggio_frequencies,
                "arpeggio"
            );
        }
        EffectType::PortamentoUp => {
            voice.portamento_rate = portamento_rate(cmd.value);
            voice.effect_ticks_remaining = ctx.armed_subticks;
        }
        EffectType::PortamentoDown => {
            voice.portamento_rate = 1.0 / portamento_rate(cmd.value);
            voice.effect_ticks_remaining = ctx.armed_subticks;
        }
        EffectType::PortamentoToNote => {
            if voice.prev_frequency <= 0.0 || voice.frequency <= 0.0 {
                cancel(voice);
                return;
            }
            if cmd.value > 0 {
                let rate = portamento_rate(cmd.value);
                voice.portamento_rate = if voice.frequency > voice.prev_frequency {
                    rate
                } else {
                    1.0 / rate
                };
                voice.want_frequency = voice.frequency;
                voice.frequency = voice.prev_frequency;
            }
            voice.effect_ticks_remaining = ctx.armed_subticks;
            debug!(
                voice = index,
                rate = voice.portamento_rate,
                from = voice.frequency,
                to = voice.want_frequency,
                "portamento"
            );
        }
        EffectType::Vibrato => {
            voice.vibrato_position = 0.0;
            voice.vibrato_center = voice.frequency;
            let speed = cmd.high() as f64;
            if speed > 0.0 {
                // 0xF: one cycle per tick
                voice.vibrato_speed = speed * speed * TAU / 225.0;
            }
            let depth = cmd.low() as f64;
            if depth > 0.0 {
                voice.vibrato_depth = depth * depth / 700.0;
            }
            voice.effect_ticks_remaining = ctx.armed_subticks;
        }
        EffectType::GlissandoControl => {
            voice.quantize_frequency = cmd.value & 0x1 != 0;
        }
        EffectType::VibratoType => {
            voice.vibrato_waveform = VibratoWaveform::from_bits(cmd.value);
        }
        EffectType::Finetune => {
            voice.finetune = finetune_ratio(cmd.value);
            voice.frequency *= voice.finetune;
            debug!(voice = index, value = cmd.value, finetune = voice.finetune, "finetune");
        }
        EffectType::None => {}
    }
}

/// Advance the armed effect by one subtick and count the subtick down.
pub fn advance_effect(index: usize, voice: &mut VoiceState) {
    if voice.effect_ticks_remaining == 0 {
        return;
    }
    trace!(
        voice = index,
        effect = voice.effect_type.raw(),
        left = voice.effect_ticks_remaining,
        "effect tick"
    );

    match voice.effect_type {
        EffectType::Arpeggio => {
            // the armed countdown is a multiple of 3, so this walks 0, 1, 2
            let step = (3 - voice.effect_ticks_remaining % 3) % 3;
            voice.frequency = voice.arpeggio_frequencies[step as usize];
        }
        EffectType::PortamentoUp | EffectType::PortamentoDown => {
            voice.frequency *= voice.portamento_rate;
        }
        EffectType::PortamentoToNote => {
            voice.frequency *= voice.portamento_rate;
            let rate = voice.portamento_rate;
            let target = voice.want_frequency;
            if (rate > 1.0 && voice.frequency > target) || (rate < 1.0 && voice.frequency < target) {
                voice.frequency = target;
                cancel(voice);
                debug!(voice = index, "portamento done");
                return;
            }
        }
        EffectType::Vibrato => {
            let shape = match voice.vibrato_waveform {
                VibratoWaveform::Sine => libm::sin(voice.vibrato_position),
                VibratoWaveform::RampDown => voice.vibrato_position / PI - 1.0,
                VibratoWaveform::Square => {
                    if voice.vibrato_position >= PI {
                        1.0
                    } else {
                        -1.0
                    }
                }
                VibratoWaveform::Flat => 0.0,
            };
            let depth = shape * voice.vibrato_depth;
            voice.frequency = voice.vibrato_center * libm::pow(2.0, depth);
            voice.vibrato_position += voice.vibrato_speed;
            if voice.vibrato_position >= TAU {
                voice.vibrato_position -= TAU;
            }
        }
        _ => {}
    }

    voice.effect_ticks_remaining -= 1;
}

fn cancel(voice: &mut VoiceState) {
    voice.effect_type = EffectType::None;
    voice.effect_ticks_remaining = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sid_ir::Note;

    const CTX: EffectContext = EffectContext {
        tuning: Tuning::EqualTemperament,
        armed_subticks: 24,
    };

    fn c4() -> Note {
        Note::from_octave_semitone(4, 0)
    }

    fn freq(note: Note) -> f64 {
        Tuning::EqualTemperament.translate(note)
    }

    fn playing(note: Note) -> VoiceState {
        let mut voice = VoiceState::new();
        voice.set_note(note);
        update_voice(0, &mut voice, &CTX);
        voice
    }

    #[test]
    fn arpeggio_cycles_high_low_original() {
        let mut voice = VoiceState::new();
        voice.set_note(c4());
        voice.set_effect(EffectCommand::arpeggio(0x47));

        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.frequency, freq(c4().offset(4)), epsilon = 1e-9);
        assert_eq!(voice.effect_ticks_remaining, 23);

        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.frequency, freq(c4().offset(7)), epsilon = 1e-9);

        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.frequency, freq(c4()), epsilon = 1e-9);
        assert_eq!(voice.effect_ticks_remaining, 21);
    }

    #[test]
    fn arpeggio_period_holds_for_whole_countdown() {
        let mut voice = VoiceState::new();
        voice.set_note(Note::from_octave_semitone(2, 5));
        voice.set_effect(EffectCommand::arpeggio(0x3C));
        update_voice(0, &mut voice, &CTX);
        let expected = voice.arpeggio_frequencies;
        let mut seen = alloc::vec![voice.frequency];
        while voice.effect_ticks_remaining > 0 {
            advance_effect(0, &mut voice);
            seen.push(voice.frequency);
        }
        assert_eq!(seen.len(), 24);
        for (i, f) in seen.iter().enumerate() {
            assert_eq!(*f, expected[i % 3]);
        }
    }

    #[test]
    fn arpeggio_after_note_off_uses_prev_note() {
        let mut voice = playing(c4());
        voice.set_note(Note::Off);
        voice.set_effect(EffectCommand::arpeggio(0x0C));
        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.arpeggio_frequencies[1], freq(c4()) * 2.0, epsilon = 1e-9);
        assert_eq!(voice.arpeggio_frequencies[2], -1.0);
    }

    #[test]
    fn zero_arpeggio_degrades_to_none() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::new(EffectType::Vibrato, 0x44));
        update_voice(0, &mut voice, &CTX);
        assert!(voice.effect_ticks_remaining > 0);

        voice.set_effect(EffectCommand::arpeggio(0));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.effect_type, EffectType::None);
        assert_eq!(voice.effect_ticks_remaining, 0);
    }

    #[test]
    fn portamento_up_and_down() {
        let mut voice = playing(c4());
        let start = voice.frequency;
        voice.set_effect(EffectCommand::new(EffectType::PortamentoUp, 0x40));
        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.frequency, start * libm::pow(2.0, 0.125), epsilon = 1e-9);

        voice.set_effect(EffectCommand::new(EffectType::PortamentoDown, 0x40));
        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.frequency, start, epsilon = 1e-9);
    }

    #[test]
    fn portamento_to_note_slides_from_previous() {
        let mut voice = playing(c4());
        let from = voice.frequency;
        let target_note = Note::from_octave_semitone(4, 7);
        voice.set_note(target_note);
        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0x20));
        update_voice(0, &mut voice, &CTX);

        assert_eq!(voice.want_frequency, freq(target_note));
        assert!(voice.portamento_rate > 1.0);
        assert_relative_eq!(voice.frequency, from * voice.portamento_rate, epsilon = 1e-9);
    }

    #[test]
    fn portamento_to_note_terminates_within_bound() {
        let mut voice = playing(Note::from_octave_semitone(3, 0));
        voice.set_note(Note::from_octave_semitone(3, 4));
        let ctx = EffectContext { armed_subticks: 10_000, ..CTX };
        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0x08));
        update_voice(0, &mut voice, &ctx);

        let bound = libm::ceil(
            libm::log(voice.want_frequency / voice.frequency) / libm::log(voice.portamento_rate),
        ) as u32
            + 1;
        let mut steps = 0;
        while voice.effect_type != EffectType::None {
            advance_effect(0, &mut voice);
            steps += 1;
            assert!(steps <= bound, "no convergence after {steps} steps");
        }
        assert_eq!(voice.frequency, voice.want_frequency);
        assert_eq!(voice.effect_ticks_remaining, 0);
    }

    #[test]
    fn portamento_to_note_downwards() {
        let mut voice = playing(Note::from_octave_semitone(5, 0));
        voice.set_note(Note::from_octave_semitone(4, 0));
        let ctx = EffectContext { armed_subticks: 10_000, ..CTX };
        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0xFF));
        update_voice(0, &mut voice, &ctx);
        assert!(voice.portamento_rate < 1.0);
        while voice.effect_type != EffectType::None {
            advance_effect(0, &mut voice);
        }
        assert_eq!(voice.frequency, freq(Note::from_octave_semitone(4, 0)));
    }

    #[test]
    fn portamento_to_note_without_previous_note_degrades() {
        let mut voice = VoiceState::new();
        voice.set_note(c4());
        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0x10));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.effect_type, EffectType::None);
        assert_eq!(voice.effect_ticks_remaining, 0);
        assert_eq!(voice.frequency, freq(c4()));
    }

    #[test]
    fn portamento_to_note_zero_keeps_slide() {
        let mut voice = playing(c4());
        voice.set_note(Note::from_octave_semitone(5, 0));
        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0x04));
        update_voice(0, &mut voice, &CTX);
        let rate = voice.portamento_rate;
        let want = voice.want_frequency;

        voice.set_effect(EffectCommand::new(EffectType::PortamentoToNote, 0));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.portamento_rate, rate);
        assert_eq!(voice.want_frequency, want);
        assert_eq!(voice.effect_ticks_remaining, 23);
    }

    #[test]
    fn vibrato_parameters() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::vibrato(0xF, 0x7));
        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.vibrato_speed, TAU, epsilon = 1e-12);
        assert_relative_eq!(voice.vibrato_depth, 49.0 / 700.0, epsilon = 1e-12);
        // sin(0) = 0 on the first step
        assert_eq!(voice.frequency, voice.vibrato_center);
    }

    #[test]
    fn vibrato_zero_nibble_keeps_previous() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::vibrato(4, 2));
        update_voice(0, &mut voice, &CTX);
        voice.set_effect(EffectCommand::vibrato(0, 5));
        update_voice(0, &mut voice, &CTX);
        assert_relative_eq!(voice.vibrato_speed, 16.0 * TAU / 225.0, epsilon = 1e-12);
        assert_relative_eq!(voice.vibrato_depth, 25.0 / 700.0, epsilon = 1e-12);
    }

    #[test]
    fn vibrato_square_wave() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::new(EffectType::VibratoType, 2));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.vibrato_waveform, VibratoWaveform::Square);
        assert_eq!(voice.effect_ticks_remaining, 0);

        voice.set_effect(EffectCommand::vibrato(0xA, 0xA));
        update_voice(0, &mut voice, &CTX);
        let center = voice.vibrato_center;
        assert_relative_eq!(
            voice.frequency,
            center * libm::pow(2.0, -voice.vibrato_depth),
            epsilon = 1e-9
        );
    }

    #[test]
    fn vibrato_ramp_down_wave() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::new(EffectType::VibratoType, 1));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.vibrato_waveform, VibratoWaveform::RampDown);

        voice.set_effect(EffectCommand::vibrato(5, 7));
        update_voice(0, &mut voice, &CTX);
        let center = voice.vibrato_center;
        let depth = voice.vibrato_depth;
        // the ramp starts at the bottom and climbs by speed / pi per step
        assert_relative_eq!(voice.frequency, center * libm::pow(2.0, -depth), epsilon = 1e-9);
        advance_effect(0, &mut voice);
        assert_relative_eq!(
            voice.frequency,
            center * libm::pow(2.0, -7.0 / 9.0 * depth),
            epsilon = 1e-9
        );
    }

    #[test]
    fn vibrato_position_wraps() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::vibrato(0xF, 1));
        update_voice(0, &mut voice, &CTX);
        for _ in 0..10 {
            advance_effect(0, &mut voice);
            assert!(voice.vibrato_position < TAU);
        }
    }

    #[test]
    fn glissando_control_only_sets_flag() {
        let mut voice = playing(c4());
        let before = voice.frequency;
        voice.set_effect(EffectCommand::new(EffectType::GlissandoControl, 1));
        update_voice(0, &mut voice, &CTX);
        assert!(voice.quantize_frequency);
        assert_eq!(voice.frequency, before);
        assert_eq!(voice.effect_ticks_remaining, 0);
    }

    #[test]
    fn finetune_center_is_identity() {
        let mut voice = playing(c4());
        let before = voice.frequency;
        voice.set_effect(EffectCommand::new(EffectType::Finetune, 128));
        update_voice(0, &mut voice, &CTX);
        assert_eq!(voice.finetune, 1.0);
        assert_eq!(voice.frequency, before);
    }

    #[test]
    fn finetune_max_scales_frequency() {
        let mut voice = playing(c4());
        let before = voice.frequency;
        voice.set_effect(EffectCommand::new(EffectType::Finetune, 255));
        update_voice(0, &mut voice, &CTX);
        let expected = libm::pow(2.0, 127.0 / 256.0 / 12.0);
        assert_relative_eq!(voice.finetune, expected, epsilon = 1e-12);
        assert_relative_eq!(voice.frequency, before * expected, epsilon = 1e-9);
    }

    #[test]
    fn finetune_below_center_lowers() {
        assert!(finetune_ratio(0) < 1.0);
        assert_relative_eq!(finetune_ratio(0) * finetune_ratio(255), libm::pow(2.0, -1.0 / 3072.0), epsilon = 1e-12);
    }

    #[test]
    fn countdown_implies_effect() {
        let mut voice = playing(c4());
        voice.set_effect(EffectCommand::arpeggio(0x47));
        for _ in 0..30 {
            update_voice(0, &mut voice, &CTX);
            if voice.effect_ticks_remaining > 0 {
                assert_ne!(voice.effect_type, EffectType::None);
            }
        }
        assert_eq!(voice.effect_ticks_remaining, 0);
    }
}
