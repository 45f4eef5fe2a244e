use crate::float::Float;
use crate::utils::buffer::{copy_complex_to_real, copy_real_to_complex, square_sum};
use crate::utils::buffer::{new_real_buffer, SpectralBuffers};
use crate::utils::peak::refine_dip;

use super::DifferenceMethod;

/// Outcome of one detection call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    /// Estimated fundamental frequency in Hz. `0` for a flat (silent) block.
    pub frequency: T,
    /// Refined period, in samples.
    pub period: T,
    /// `1 - d'(tau)` clamped to `[0, 1]`: how deep the chosen dip is.
    pub clarity: T,
}

/// Buffers needed for one detector, sized once from the window length.
pub struct DetectorInternals<T>
where
    T: Float,
{
    pub window_size: usize,
    pub threshold: T,
    pub method: DifferenceMethod,
    pub result: Vec<T>,
    pub spectral: Option<SpectralBuffers<T>>,
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    pub fn new(window_size: usize, threshold: T, method: DifferenceMethod) -> Self {
        assert!(window_size >= 3, "The window must hold at least 3 lags");
        let spectral = match method {
            DifferenceMethod::Direct => None,
            DifferenceMethod::Fft => Some(SpectralBuffers::new(2 * window_size)),
        };

        DetectorInternals {
            window_size,
            threshold,
            method,
            result: new_real_buffer(window_size),
            spectral,
        }
    }
}

/// Compute the difference function directly from its definition,
///
///  > d(t) = sum_{i=0}^{w-1} (x_i - x_{i+t})^2
///
/// for `t` in `1..w`, where `w = result.len()`. `result[0]` is left at zero.
/// This is O(w^2); `signal` must hold at least `2 * w` samples.
pub fn square_difference<T: Float>(signal: &[T], result: &mut [T]) {
    let window_size = result.len();
    assert!(
        2 * window_size <= signal.len(),
        "The window size cannot be more than half the signal length"
    );

    result[0] = T::zero();
    for (tau, r) in result.iter_mut().enumerate().skip(1) {
        *r = signal[..window_size]
            .iter()
            .zip(&signal[tau..tau + window_size])
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum();
    }
}

/// Compute the windowed autocorrelation of `signal` and put the result in `result`.
/// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
/// the function
///
/// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
///
/// Only the first `2 * w` samples of `signal` are used, matching the length the
/// transforms in `buffers` were planned for.
pub fn windowed_autocorrelation<T: Float>(
    signal: &[T],
    window_size: usize,
    buffers: &mut SpectralBuffers<T>,
    result: &mut [T],
) {
    let size = buffers.len();
    assert!(
        size >= 2 * window_size && signal.len() >= size,
        "The transform must cover two windows of the signal"
    );
    let signal = &signal[..size];

    // Cross correlate the signal with its first window, zero padded. Lags stay
    // below `w` and indices below `2w`, so the circular correlation never wraps.
    copy_real_to_complex(signal, &mut buffers.signal);
    copy_real_to_complex(&signal[..window_size], &mut buffers.window);
    buffers
        .forward
        .process_with_scratch(&mut buffers.signal, &mut buffers.scratch);
    buffers
        .forward
        .process_with_scratch(&mut buffers.window, &mut buffers.scratch);

    // rustfft does not normalize, so forward then inverse scales by `size`.
    let normalization_const = T::one() / T::from_usize(size).unwrap();
    buffers
        .signal
        .iter_mut()
        .zip(buffers.window.iter())
        .for_each(|(a, b)| {
            *a = *a * normalization_const * b.conj();
        });
    buffers
        .inverse
        .process_with_scratch(&mut buffers.signal, &mut buffers.scratch);

    copy_complex_to_real(&buffers.signal[..window_size], result);
}

/// Compute the difference function _d(t)_ of `signal` with an FFT. The values match
/// [square_difference] up to floating point error, in O(w log w).
///
/// _d(t)_ does not change when a constant is added to every sample, so the mean
/// of the analysed samples is removed first. With a DC offset the power terms
/// below would otherwise dwarf _d(t)_ and the subtraction would cancel it away.
pub fn windowed_square_error<T: Float>(
    signal: &[T],
    buffers: &mut SpectralBuffers<T>,
    result: &mut [T],
) {
    let window_size = result.len();
    let size = buffers.len();
    assert!(
        2 * window_size <= size && size <= signal.len(),
        "The window size cannot be more than half the signal length"
    );

    let two = T::from_f64(2.).unwrap();

    let mut centered = std::mem::take(&mut buffers.centered);
    let mean = signal[..size].iter().copied().sum::<T>() / T::from_usize(size).unwrap();
    centered
        .iter_mut()
        .zip(&signal[..size])
        .for_each(|(c, &s)| *c = s - mean);

    // d(t) = pow_0^w + pow_t^{t+w} - 2 * r(t), where pow_a^b is the sum of the
    // squares of the centered signal on `a..b`.
    windowed_autocorrelation(&centered, window_size, buffers, result);
    let mut windowed_power = square_sum(&centered[..window_size]);
    let power = windowed_power;

    result.iter_mut().enumerate().for_each(|(i, a)| {
        // Cancellation can leave tiny negatives where d(t) is really zero.
        *a = (power + windowed_power - two * *a).max(T::zero());
        // Slide pow_t^{t+w} to pow_{t+1}^{t+1+w}.
        windowed_power = windowed_power - centered[i] * centered[i]
            + centered[i + window_size] * centered[i + window_size];
    });
    result[0] = T::zero();
    buffers.centered = centered;
}

/// Fill `result` with the difference function of `signal` using `method`.
pub fn difference<T: Float>(
    signal: &[T],
    method: DifferenceMethod,
    spectral: Option<&mut SpectralBuffers<T>>,
    result: &mut [T],
) {
    match (method, spectral) {
        (DifferenceMethod::Fft, Some(buffers)) => windowed_square_error(signal, buffers, result),
        _ => square_difference(signal, result),
    }
}

/// Calculate the "cumulative mean normalized difference function" in place.
/// If _d(t)_ is the square error function, _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) * t / sum_{i=1}^t d(i)
///
/// While the running sum is still zero the value is defined as `1`, so a flat
/// difference function never produces NaN. Returns the total of `d(1..w)`: zero
/// means the block carried no variation at all.
pub fn yin_normalize_square_error<T: Float>(square_error: &mut [T]) -> T {
    let mut sum = T::zero();
    square_error[0] = T::one();
    square_error
        .iter_mut()
        .enumerate()
        .skip(1)
        .for_each(|(i, a)| {
            sum = sum + *a;
            *a = if sum > T::zero() {
                *a * T::from_usize(i).unwrap() / sum
            } else {
                T::one()
            };
        });
    sum
}

/// The absolute threshold step. Scan from `t = 2` for the first value below
/// `threshold`, then follow the dip down to its floor. Without any such value
/// the last index is returned, a best effort rather than a failure.
pub fn absolute_threshold<T: Float>(cmnd: &[T], threshold: T) -> usize {
    let length = cmnd.len();
    let mut tau = 2;
    while tau < length {
        if cmnd[tau] < threshold {
            while tau + 1 < length && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return tau;
        }
        tau += 1;
    }
    length - 1
}

/// Run the normalization, threshold and interpolation steps on a difference
/// function held in `result`, and turn the period into a [Pitch].
pub fn pitch_from_difference<T: Float>(
    result: &mut [T],
    sample_rate: usize,
    threshold: T,
) -> Pitch<T> {
    let total = yin_normalize_square_error(result);
    if total <= T::zero() {
        return Pitch {
            frequency: T::zero(),
            period: T::zero(),
            clarity: T::zero(),
        };
    }

    let tau = absolute_threshold(result, threshold);
    let period = refine_dip(tau, result).max(T::one());
    let clarity = (T::one() - result[tau]).max(T::zero()).min(T::one());

    Pitch {
        frequency: T::from_usize(sample_rate).unwrap() / period,
        period,
        clarity,
    }
}
