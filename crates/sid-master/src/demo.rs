//! Built-in demo song.

use sid_ir::{Adsr, EffectCommand, EffectType, Note, Pattern, Song, Tempo, Waveform};

const CHORDS: [(u8, u8, u8); 4] = [
    // octave, semitone, arpeggio
    (4, 0, 0x47),
    (3, 9, 0x37),
    (3, 5, 0x47),
    (3, 7, 0x47),
];

/// A one-pattern song: arpeggiated chords, a sliding bass and a vibrato
/// lead.
pub fn demo_song() -> Song {
    let mut pattern = Pattern::new(16);

    pattern.global_mut(0).cutoff = Some(0x400);
    pattern.global_mut(0).resonance = Some(4);
    pattern.global_mut(0).volume = Some(15);

    for (i, &(octave, semitone, arp)) in CHORDS.iter().enumerate() {
        let row = i as u16 * 4;
        let chord = pattern.cell_mut(row, 0);
        chord.note = Note::from_octave_semitone(octave, semitone);
        chord.effect = Some(EffectCommand::arpeggio(arp));
        if row == 0 {
            chord.waveform = Some(Waveform::PULSE);
            chord.pulse_width = Some(0x400);
            chord.envelope = Some(Adsr {
                attack: 0,
                decay: 9,
                sustain: 8,
                release: 6,
            });
        }

        let bass = pattern.cell_mut(row, 1);
        bass.note = Note::from_octave_semitone(octave - 2, semitone);
        if row == 0 {
            bass.waveform = Some(Waveform::SAW);
        } else {
            bass.effect = Some(EffectCommand::new(EffectType::PortamentoToNote, 0x20));
        }
    }
    pattern.cell_mut(15, 0).note = Note::Off;
    pattern.cell_mut(15, 1).note = Note::Off;

    let lead = pattern.cell_mut(8, 2);
    lead.note = Note::from_octave_semitone(5, 4);
    lead.effect = Some(EffectCommand::vibrato(4, 6));
    pattern.cell_mut(14, 2).note = Note::Off;

    let mut song = Song::new("Demo");
    song.tempo = Tempo::new(125, 4, 2);
    song.patterns.push(pattern);
    song.order = vec![0];
    song
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_shape() {
        let song = demo_song();
        assert_eq!(song.total_ticks(), 16);
        assert!(song.tempo.is_valid());
        let pattern = &song.patterns[0];
        assert_eq!(pattern.cell(4, 0).effect, Some(EffectCommand::arpeggio(0x37)));
        assert_eq!(pattern.cell(4, 1).note, Note::from_octave_semitone(1, 9));
    }

    #[test]
    fn demo_survives_json() {
        let song = demo_song();
        let json = serde_json::to_string(&song).unwrap();
        let back: Song = serde_json::from_str(&json).unwrap();
        assert_eq!(back, song);
    }
}
