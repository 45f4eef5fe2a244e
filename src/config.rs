use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detector::DifferenceMethod;
use crate::error::{Result, TunerError};

/// Everything the detection pipeline needs to know up front.
///
/// Buffers are sized from these values once, when the pipeline is built, and
/// [TunerConfig::validate] rejects combinations the detector could not run with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TunerConfig {
    /// Capture sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Samples per raw block handed over by the audio source.
    #[serde(default = "default_capture_length")]
    pub capture_length: usize,
    /// Lags in the difference buffer. At most half of `capture_length`.
    #[serde(default = "default_detection_length")]
    pub detection_length: usize,
    /// Interval between detection cycles.
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
    /// Absolute threshold for the normalized difference dip.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Frequencies at or below this are reported as "no pitch".
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    /// Frequency of A4.
    #[serde(default = "default_reference_pitch")]
    pub reference_pitch: f64,
    #[serde(default)]
    pub difference: DifferenceMethod,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            capture_length: default_capture_length(),
            detection_length: default_detection_length(),
            cadence_ms: default_cadence_ms(),
            threshold: default_threshold(),
            min_frequency: default_min_frequency(),
            reference_pitch: default_reference_pitch(),
            difference: DifferenceMethod::default(),
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_capture_length() -> usize { 2048 }
fn default_detection_length() -> usize { 1024 }
fn default_cadence_ms() -> u64 { 250 }
fn default_threshold() -> f64 { 0.125 }
fn default_min_frequency() -> f64 { 10.0 }
fn default_reference_pitch() -> f64 { 440.0 }

impl TunerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TunerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Check every constraint the pipeline relies on at run time.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(TunerError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.detection_length < 3 {
            return Err(TunerError::BufferTooSmall(self.detection_length));
        }
        let required = 2 * self.detection_length;
        if self.capture_length < required {
            return Err(TunerError::BufferTooLarge {
                detection: self.detection_length,
                capture: self.capture_length,
                required,
            });
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(TunerError::invalid_param(
                "threshold",
                format!("must be in (0, 1], got {}", self.threshold),
            ));
        }
        if !(self.min_frequency.is_finite() && self.min_frequency >= 0.0) {
            return Err(TunerError::invalid_param(
                "min_frequency",
                format!("must be a non-negative frequency, got {}", self.min_frequency),
            ));
        }
        if !(self.reference_pitch.is_finite() && self.reference_pitch > 0.0) {
            return Err(TunerError::invalid_param(
                "reference_pitch",
                format!("must be a positive frequency, got {}", self.reference_pitch),
            ));
        }
        Ok(())
    }
}
