//! Generic [Float] type which acts as a stand-in for `f32` or `f64`.
use rustfft::num_traits::Float as NumFloat;
use rustfft::FftNum;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Waveforms and difference buffers are processed as arrays of [Float]s.
/// A [Float] is normally `f32` or `f64`.
pub trait Float: Display + Debug + NumFloat + FftNum + Sum {}

impl Float for f64 {}
impl Float for f32 {}

/// `true` when `x` cannot be told apart from zero at the precision of `T`.
///
/// `num_traits::Float` and `num_traits::Signed` both provide `abs`, so the call
/// is spelled out here once instead of at every use site.
pub fn is_negligible<T: Float>(x: T) -> bool {
    NumFloat::abs(x) <= <T as NumFloat>::epsilon()
}
