use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real parts of `output`, zeroing the imaginary parts
/// and zero-padding whatever `input` does not cover.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = *i;
        o.im = T::zero();
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real parts of `input` into `output`.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T]) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .map(|c| c.re)
        .zip(output.iter_mut())
        .for_each(|(i, o)| *o = i);

    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = T::zero());
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// FFT plans, complex scratch space and a real staging buffer for the windowed
/// autocorrelation.
///
/// Everything is allocated once, when the detector is built, and reused for
/// every call: a real-time loop should not hit the allocator once per block.
///
/// ```rust
/// use yin_tuner::utils::buffer::SpectralBuffers;
///
/// let buffers = SpectralBuffers::<f32>::new(1024);
/// assert_eq!(buffers.len(), 1024);
/// ```
pub struct SpectralBuffers<T: Float> {
    pub(crate) forward: Arc<dyn Fft<T>>,
    pub(crate) inverse: Arc<dyn Fft<T>>,
    pub(crate) signal: Vec<Complex<T>>,
    pub(crate) window: Vec<Complex<T>>,
    pub(crate) scratch: Vec<Complex<T>>,
    pub(crate) centered: Vec<T>,
}

impl<T: Float> SpectralBuffers<T> {
    /// Plan transforms of length `size`.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        SpectralBuffers {
            forward,
            inverse,
            signal: new_complex_buffer(size),
            window: new_complex_buffer(size),
            scratch: new_complex_buffer(scratch_len),
            centered: new_real_buffer(size),
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }
}
