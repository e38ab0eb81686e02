//! Headless controller for the sidsyn SID synthesizer.
//!
//! Provides a unified API for loading songs, playback, and rendering
//! that the CLI and tests share.

mod demo;
mod wav;

use sid_audio::{AudioOutput, CpalOutput};
use sid_engine::{Engine, Machine, NullEmulation, ResidEmulation, SidEmulation, SidSynth};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{error, info, warn};

// Re-export common types so callers don't need sid-ir/sid-engine directly.
pub use sid_audio::AudioError;
pub use sid_engine::{ConfigError, SynthConfig};
pub use sid_ir::{ChipModel, ClockRate, Song, SongPosition, Tuning};

/// Install as the global allocator to abort on allocations in the render
/// path.
#[cfg(feature = "alloc_check")]
pub use assert_no_alloc::AllocDisabler;

pub use demo::demo_song;
pub use wav::{samples_to_wav, write_wav, write_wav_file};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("audio output: {0}")]
    Audio(#[from] AudioError),
    #[error("wav encoding: {0}")]
    Wav(#[from] hound::Error),
}

/// Headless controller: owns a song and a synth configuration and manages
/// playback.
pub struct Controller {
    song: Song,
    config: SynthConfig,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    current_tick: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            song: demo_song(),
            config: SynthConfig::default(),
            playback: None,
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn set_song(&mut self, song: Song) {
        self.stop();
        self.song = song;
    }

    pub fn load_song_json(&mut self, data: &[u8]) -> Result<(), ControllerError> {
        let song: Song = serde_json::from_slice(data)?;
        info!(title = %song.title, patterns = song.patterns.len(), "song loaded");
        self.set_song(song);
        Ok(())
    }

    pub fn load_song_file(&mut self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let data = std::fs::read(path)?;
        self.load_song_json(&data)
    }

    // --- Configuration ---

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SynthConfig) -> Result<(), ControllerError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn load_config_json(&mut self, data: &[u8]) -> Result<(), ControllerError> {
        let config: SynthConfig = serde_json::from_slice(data)?;
        self.set_config(config)
    }

    pub fn load_config_file(&mut self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let data = std::fs::read(path)?;
        self.load_config_json(&data)
    }

    // --- Real-time playback ---

    pub fn play(&mut self) {
        self.stop();

        let song = self.song.clone();
        let config = self.config;
        let stop_signal = Arc::new(AtomicBool::new(false));
        let current_tick = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let tick = current_tick.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || {
            if let Err(err) = audio_thread(&song, config, &stop, &tick) {
                error!(%err, "playback failed");
            }
            done.store(true, Ordering::Relaxed);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            current_tick,
            finished,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                if handle.join().is_err() {
                    warn!("audio thread panicked");
                }
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    pub fn position(&self) -> Option<SongPosition> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        self.song.position_at(pb.current_tick.load(Ordering::Relaxed))
    }

    // --- Offline rendering ---

    /// Render the song through reSID, at most `max_samples` samples.
    pub fn render_samples(&self, max_samples: usize) -> Result<Vec<i16>, ControllerError> {
        self.render_with(ResidEmulation::new(), max_samples)
    }

    /// Render the song through any chip emulation.
    pub fn render_with<E: SidEmulation>(
        &self,
        emulation: E,
        max_samples: usize,
    ) -> Result<Vec<i16>, ControllerError> {
        self.config.validate()?;
        let mut engine = Engine::new(&self.song, &self.config, emulation);
        let mut buf = vec![0i16; engine.max_buffer_len()];
        let mut samples = Vec::new();

        while !engine.is_finished() && samples.len() < max_samples {
            let len = engine.render_subtick(&mut buf);
            let take = len.min(max_samples - samples.len());
            samples.extend_from_slice(&buf[..take]);
        }
        info!(samples = samples.len(), "render complete");
        Ok(samples)
    }

    /// Render at most `max_seconds` of the song into WAV bytes.
    pub fn render_to_wav(&self, max_seconds: u32) -> Result<Vec<u8>, ControllerError> {
        let max_samples = (self.config.sample_rate as usize) * max_seconds as usize;
        let samples = self.render_samples(max_samples)?;
        Ok(wav::samples_to_wav(&samples, self.config.sample_rate)?)
    }

    /// Render at most `max_seconds` of the song into a WAV file.
    pub fn render_to_wav_file(
        &self,
        path: impl AsRef<Path>,
        max_seconds: u32,
    ) -> Result<usize, ControllerError> {
        let max_samples = (self.config.sample_rate as usize) * max_seconds as usize;
        let samples = self.render_samples(max_samples)?;
        wav::write_wav_file(path, &samples, self.config.sample_rate)?;
        Ok(samples.len())
    }

    /// Parameter table of the synth with the default of each parameter
    /// spelled out.
    pub fn describe_machine(&self) -> String {
        let synth = SidSynth::new(&self.config, NullEmulation::new());
        let info = synth.info();
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}), {} voices", info.name, info.short_name, info.tracks);
        let _ = writeln!(out, "global parameters:");
        for p in info.params {
            let text = synth.describe_param(p.id, p.default).unwrap_or_default();
            let _ = writeln!(out, "  {:2} {:<12} {:>5}..{:<5} {}", p.id, p.name, p.min, p.max, text);
        }
        let _ = writeln!(out, "voice parameters:");
        for p in info.track_params {
            let text = synth.describe_track_param(p.id, p.default).unwrap_or_default();
            let _ = writeln!(out, "  {:2} {:<12} {:>5}..{:<5} {}", p.id, p.name, p.min, p.max, text);
        }
        out
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn audio_thread(
    song: &Song,
    config: SynthConfig,
    stop_signal: &AtomicBool,
    current_tick: &AtomicU64,
) -> Result<(), ControllerError> {
    let (mut output, consumer) = CpalOutput::new()?;

    let config = SynthConfig {
        sample_rate: output.sample_rate(),
        ..config
    };
    config.validate()?;
    // reSID is not Send, so the engine lives on this thread
    let mut engine = Engine::new(song, &config, ResidEmulation::new());
    let mut buf = vec![0i16; engine.max_buffer_len()];

    output.build_stream(consumer)?;
    output.start()?;

    while !engine.is_finished() && !stop_signal.load(Ordering::Relaxed) {
        let len = engine.render_subtick(&mut buf);
        output.write_spin(&buf[..len]);
        current_tick.store(engine.position().tick, Ordering::Relaxed);
    }

    if !stop_signal.load(Ordering::Relaxed) {
        // let the device drain
        let silence = vec![0i16; config.sample_rate as usize];
        output.write_spin(&silence);
    }
    output.stop()?;
    Ok(())
}
