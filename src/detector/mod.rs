use serde::{Deserialize, Serialize};

use crate::detector::internals::Pitch;
use crate::float::Float;

pub mod internals;
pub mod yin;

/// How the difference function is evaluated. Both produce the same values up to
/// floating point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceMethod {
    /// The O(w^2) definition.
    Direct,
    /// Windowed autocorrelation through an FFT, O(w log w).
    #[default]
    Fft,
}

pub trait PitchDetector<T>
where
    T: Float,
{
    /// Estimate the pitch of `signal`. A number always comes back, even for
    /// silence or noise; judging whether it is plausible is up to the caller.
    fn get_pitch(&mut self, signal: &[T], sample_rate: usize) -> Pitch<T>;
}
