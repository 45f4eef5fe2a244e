//! # YIN Tuner
//! *yin_tuner* is the core of a real-time monophonic tuner. Each cycle takes a block of
//! raw audio samples, estimates its fundamental frequency with the YIN algorithm and names
//! the nearest equal-temperament note.
//!
//! The pieces, in the order data flows through them:
//!
//!   * [pcm] turns raw PCM samples into a waveform in `[-1, 1]`.
//!   * [YINDetector][detector::yin::YINDetector] estimates the period of the waveform.
//!   * [NoteMapper][note::NoteMapper] maps the frequency to a note and a cents deviation.
//!   * [Tuner][pipeline::Tuner] runs the cycle at a fixed cadence between an
//!     [AudioSource][pipeline::AudioSource] and a [DisplaySink][pipeline::DisplaySink].
//!
//! Capturing audio and drawing the result are left to the caller.
//!
//! # Examples
//! ```
//! use yin_tuner::pipeline::{from_fn, Status, Tuner};
//! use yin_tuner::TunerConfig;
//!
//! fn main() {
//!     let config = TunerConfig::default();
//!     let rate = config.sample_rate as f64;
//!
//!     // Samples coming from some source (microphone, file, generated, etc...)
//!     let block: Vec<i16> = (0..config.capture_length)
//!         .map(|i| (16000.0 * (2.0 * std::f64::consts::PI * 220.0 * i as f64 / rate).sin()) as i16)
//!         .collect();
//!     let source = from_fn(move |out: &mut [i16]| {
//!         out.copy_from_slice(&block);
//!         Ok(())
//!     });
//!     let display = |text: &str| println!("{}", text);
//!
//!     let mut tuner: Tuner<_, _> = Tuner::new(config, source, display).unwrap();
//!
//!     match tuner.run_cycle().unwrap() {
//!         Status::Detected { note, frequency } => {
//!             assert_eq!(note.name(), "A3");
//!             assert!((215.0..=225.0).contains(&frequency));
//!         }
//!         Status::Unknown => unreachable!(),
//!     }
//! }
//! ```

pub use config::TunerConfig;
pub use detector::internals::Pitch;
pub use error::{Result, TunerError};

pub mod config;
pub mod detector;
pub mod error;
pub mod float;
pub mod note;
pub mod pcm;
pub mod pipeline;
pub mod utils;
