//! sidsyn CLI: headless playback and WAV export.
//!
//! Usage:
//!   sid-cli song.json
//!   sid-cli song.json --wav output.wav --seconds 60
//!   sid-cli --chip 8580 --tuning just

use clap::{Parser, ValueEnum};
use sid_master::{ChipModel, ClockRate, Controller, ControllerError, Tuning};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: sid_master::AllocDisabler = sid_master::AllocDisabler;

#[derive(Parser)]
#[command(name = "sid-cli")]
#[command(about = "Play or render SID songs")]
struct Args {
    /// Song file (JSON); the built-in demo when omitted
    song: Option<PathBuf>,

    /// Synth configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render to this WAV file instead of playing
    #[arg(short, long)]
    wav: Option<PathBuf>,

    /// Longest render, in seconds
    #[arg(short, long, default_value_t = 300)]
    seconds: u32,

    #[arg(long, value_enum)]
    chip: Option<ChipArg>,

    #[arg(long, value_enum)]
    tuning: Option<TuningArg>,

    /// Use the NTSC clock instead of PAL
    #[arg(long)]
    ntsc: bool,

    /// Print the synth parameter table and exit
    #[arg(long)]
    describe: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChipArg {
    #[value(name = "6581")]
    Mos6581,
    #[value(name = "8580")]
    Mos8580,
}

#[derive(Clone, Copy, ValueEnum)]
enum TuningArg {
    Equal,
    Just,
    Pythagorean,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sid_cli=info,sid_master=info,sid_engine=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "sid-cli failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ControllerError> {
    let mut ctrl = Controller::new();

    if let Some(path) = &args.config {
        ctrl.load_config_file(path)?;
    }
    let mut config = *ctrl.config();
    if let Some(chip) = args.chip {
        config.chip_model = match chip {
            ChipArg::Mos6581 => ChipModel::Mos6581,
            ChipArg::Mos8580 => ChipModel::Mos8580,
        };
    }
    if let Some(tuning) = args.tuning {
        config.tuning = match tuning {
            TuningArg::Equal => Tuning::EqualTemperament,
            TuningArg::Just => Tuning::JustIntonation,
            TuningArg::Pythagorean => Tuning::Pythagorean,
        };
    }
    if args.ntsc {
        config.clock = ClockRate::Ntsc;
    }
    ctrl.set_config(config)?;

    if args.describe {
        print!("{}", ctrl.describe_machine());
        return Ok(());
    }

    if let Some(path) = &args.song {
        ctrl.load_song_file(path)?;
    }

    let song = ctrl.song();
    let config = ctrl.config();
    println!("Title:    {}", song.title);
    println!("Patterns: {}", song.patterns.len());
    println!("Orders:   {}", song.order.len());
    println!(
        "Tempo:    {} BPM, {} ticks/beat, {} subticks/tick",
        song.tempo.beats_per_minute, song.tempo.ticks_per_beat, song.tempo.subticks_per_beat
    );
    println!(
        "Chip:     {} @ {} Hz, {} tuning",
        config.chip_model.name(),
        config.clock.hz(),
        config.tuning.name()
    );
    println!();

    match &args.wav {
        Some(path) => {
            info!(path = %path.display(), sample_rate = config.sample_rate, "rendering");
            let samples = ctrl.render_to_wav_file(path, args.seconds)?;
            println!("Rendered {samples} samples to {}", path.display());
        }
        None => play_audio(&mut ctrl),
    }
    Ok(())
}

fn play_audio(ctrl: &mut Controller) {
    ctrl.play();
    println!("Playing...");
    println!();

    while ctrl.is_playing() {
        if let Some(pos) = ctrl.position() {
            print!("\rOrd: {:02X} | Row: {:02X}", pos.order, pos.row);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    println!("\rDone.          ");
}
