use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "yin-tuner", about = "Replay a WAV file through the YIN tuner")]
pub struct Cli {
    /// Input audio file (16-bit PCM WAV; only the first channel is used)
    pub input: PathBuf,

    /// Tuner configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Process blocks back to back instead of at the configured cadence
    #[arg(long)]
    pub no_wait: bool,
}
