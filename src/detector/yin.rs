//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//!
//! Let $S=(s_0,s_1,\ldots,s_N)$ be a discrete signal and $w$ the window (buffer) length.
//! The *difference function* is
//! $$ d(t) = \sum_{i=0}^{w-1} (s_i-s_{i+t})^2. $$
//! It is close to zero when the signal "lines up" with itself, but its scale depends on
//! volume. YIN therefore uses the *cumulative mean normalized difference function*,
//! $$ d\'(t) = \begin{cases}1&\text{if }t=0\\\\ d(t) / \left[ \tfrac{1}{t}\sum_{i=1}^t d(i) \right] & \text{otherwise}\end{cases}, $$
//! and picks the first dip of $d\'(t)$ below an absolute threshold, followed down to its floor.
//! Quadratic interpolation around that dip gives a fractional period.
//!
//! ## Fallbacks
//! If nothing drops below the threshold the last lag is used. A dip with no curvature is
//! not interpolated. A block with no variation at all (silence) reports `0` Hz. None of
//! these are errors: the caller decides what frequencies are believable.
//!
//! Step 6 of the paper (best local estimate) is not performed.

use crate::detector::internals::{difference, pitch_from_difference, square_difference};
use crate::detector::internals::{DetectorInternals, Pitch};
use crate::detector::{DifferenceMethod, PitchDetector};
use crate::float::Float;

/// Threshold used by [YINDetector::new]. The paper suggests 0.10 to 0.15.
pub const DEFAULT_THRESHOLD: f64 = 0.125;

/// Estimate the fundamental frequency of `signal` with the direct difference function,
/// using `result` as the difference buffer. The window length is `result.len()`.
///
/// `signal` must hold at least `2 * result.len()` samples and `result` at least 3.
///
/// ```rust
/// use yin_tuner::detector::yin::detect;
///
/// let sample_rate = 44100;
/// let signal: Vec<f64> = (0..2048)
///     .map(|i| (2.0 * std::f64::consts::PI * 220.0 * i as f64 / sample_rate as f64).sin())
///     .collect();
/// let mut buffer = vec![0.0; 1024];
///
/// let pitch = detect(&signal, sample_rate, 0.125, &mut buffer);
/// assert!((pitch.frequency - 220.0).abs() < 2.0);
/// assert_eq!(buffer[0], 1.0);
/// ```
pub fn detect<T: Float>(
    signal: &[T],
    sample_rate: usize,
    threshold: T,
    result: &mut [T],
) -> Pitch<T> {
    assert!(result.len() >= 3, "The buffer must hold at least 3 lags");
    square_difference(signal, result);
    pitch_from_difference(result, sample_rate, threshold)
}

/// A YIN detector that owns its difference buffer and, for
/// [DifferenceMethod::Fft], its transform plans. Nothing is allocated per call.
pub struct YINDetector<T>
where
    T: Float,
{
    internals: DetectorInternals<T>,
}

impl<T> YINDetector<T>
where
    T: Float,
{
    /// A detector with the default threshold and FFT difference function.
    pub fn new(window_size: usize) -> Self {
        Self::with_method(
            window_size,
            T::from_f64(DEFAULT_THRESHOLD).unwrap(),
            DifferenceMethod::Fft,
        )
    }

    pub fn with_method(window_size: usize, threshold: T, method: DifferenceMethod) -> Self {
        YINDetector {
            internals: DetectorInternals::new(window_size, threshold, method),
        }
    }

    pub fn window_size(&self) -> usize {
        self.internals.window_size
    }

    pub fn method(&self) -> DifferenceMethod {
        self.internals.method
    }

    /// The cumulative mean normalized difference of the last call.
    pub fn cmnd(&self) -> &[T] {
        &self.internals.result
    }
}

impl<T> PitchDetector<T> for YINDetector<T>
where
    T: Float,
{
    fn get_pitch(&mut self, signal: &[T], sample_rate: usize) -> Pitch<T> {
        assert!(
            signal.len() >= 2 * self.internals.window_size,
            "The signal must hold two windows"
        );
        let internals = &mut self.internals;

        // STEP 2: Calculate the difference function, d_t.
        difference(
            signal,
            internals.method,
            internals.spectral.as_mut(),
            &mut internals.result,
        );

        // STEPS 3-5: normalize, threshold, interpolate.
        pitch_from_difference(&mut internals.result, sample_rate, internals.threshold)
    }
}
