//! WAV encoding for 16-bit mono PCM.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

fn spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

pub fn write_wav<W: Write + Seek>(
    w: W,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::new(w, spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

pub fn write_wav_file(
    path: impl AsRef<Path>,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path, spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

pub fn samples_to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, samples, sample_rate)?;
    Ok(cursor.into_inner())
}
