//! Song and configuration files from `demos/`.

use sid_engine::NullEmulation;
use sid_ir::{ChipModel, EffectType, Note, Tuning, Waveform};
use sid_master::Controller;
use std::path::PathBuf;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos")
}

#[test]
fn arpeggio_song_loads() {
    let mut ctrl = Controller::new();
    ctrl.load_song_file(demos_dir().join("arpeggio.json")).unwrap();

    let song = ctrl.song();
    assert_eq!(song.title, "Arpeggio");
    assert_eq!(song.total_ticks(), 16);
    let pattern = &song.patterns[0];
    let lead = pattern.cell(0, 0);
    assert_eq!(lead.note, Note::from_octave_semitone(4, 0));
    assert_eq!(lead.waveform, Some(Waveform::PULSE));
    assert_eq!(lead.effect.map(|e| e.kind), Some(EffectType::Arpeggio));
    assert_eq!(
        pattern.cell(4, 1).effect.map(|e| e.kind),
        Some(EffectType::PortamentoToNote)
    );
    assert_eq!(pattern.global(0).volume, Some(15));
}

#[test]
fn config_file_overrides_defaults() {
    let mut ctrl = Controller::new();
    ctrl.load_config_file(demos_dir().join("config.json")).unwrap();
    let config = ctrl.config();
    assert_eq!(config.chip_model, ChipModel::Mos8580);
    assert_eq!(config.tuning, Tuning::JustIntonation);
    assert_eq!(config.sample_rate, 48000);
}

#[test]
fn song_tempo_sets_buffer_size() {
    let mut ctrl = Controller::new();
    ctrl.load_config_file(demos_dir().join("config.json")).unwrap();
    ctrl.load_song_file(demos_dir().join("arpeggio.json")).unwrap();

    let samples = ctrl.render_with(NullEmulation::new(), usize::MAX).unwrap();
    // 16 rows and an 8-tick tail, two 2880-sample buffers per tick at 48 kHz
    assert_eq!(samples.len(), (16 + 8) * 2 * 2880);
}

#[test]
fn missing_file_is_an_io_error() {
    let mut ctrl = Controller::new();
    let err = ctrl.load_song_file(demos_dir().join("nope.json")).unwrap_err();
    assert!(matches!(err, sid_master::ControllerError::Io(_)));
}
