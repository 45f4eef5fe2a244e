use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavIntoSamples, WavReader};

use yin_tuner::pipeline::AudioSource;
use yin_tuner::TunerError;

/// Reads consecutive blocks of the first channel of a 16-bit PCM WAV file.
pub struct WavSource {
    samples: WavIntoSamples<BufReader<File>, i16>,
    channels: usize,
    sample_rate: u32,
}

impl WavSource {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            bail!(
                "Unsupported WAV format: {} bit {:?}, expected 16 bit PCM",
                spec.bits_per_sample,
                spec.sample_format
            );
        }
        log::info!(
            "Input: {} ({} Hz, {} channel(s), {:.1}s)",
            path.display(),
            spec.sample_rate,
            spec.channels,
            reader.duration() as f64 / spec.sample_rate as f64
        );

        Ok(WavSource {
            channels: spec.channels.max(1) as usize,
            sample_rate: spec.sample_rate,
            samples: reader.into_samples(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSource for WavSource {
    type Sample = i16;

    fn read(&mut self, block: &mut [i16]) -> yin_tuner::Result<()> {
        for slot in block.iter_mut() {
            *slot = match self.samples.next() {
                Some(sample) => sample.map_err(TunerError::source)?,
                None => return Err(TunerError::EndOfStream),
            };
            // Skip the remaining channels of this frame.
            for _ in 1..self.channels {
                if let Some(Err(err)) = self.samples.next() {
                    return Err(TunerError::source(err));
                }
            }
        }
        Ok(())
    }
}
