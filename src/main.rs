mod cli;
mod wav;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use wav::WavSource;
use yin_tuner::pipeline::Tuner;
use yin_tuner::TunerConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let config = TunerConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => TunerConfig::default(),
    };

    let source = WavSource::open(&cli.input)?;
    config.sample_rate = source.sample_rate();
    if cli.no_wait {
        config.cadence_ms = 0;
    }

    // Each cycle consumes one capture block, so the block index gives the time.
    let block_seconds = config.capture_length as f64 / config.sample_rate as f64;
    let mut cycle = 0usize;
    let display = move |text: &str| {
        println!("{:>9.3}s  {}", cycle as f64 * block_seconds, text);
        cycle += 1;
    };

    let tuner: Tuner<_, _> =
        Tuner::new(config, source, display).context("Invalid tuner configuration")?;
    tuner.spawn()?.join()?;

    Ok(())
}
