//! Conversion of raw PCM samples into a normalized waveform.
//!
//! Every sample is divided by the full-scale magnitude of its encoding, the
//! magnitude of the most negative representable value, and then clamped to
//! `[-1, 1]`. Integer ranges are asymmetric (`i16` spans `-32768..=32767`), so
//! only the negative extreme lands exactly on `-1.0`.
use byteorder::ByteOrder;

use crate::float::Float;

/// A raw audio sample encoding.
pub trait PcmSample: Copy + Send + 'static {
    /// Magnitude that maps to `1.0`.
    const FULL_SCALE: f64;
    /// The value that normalizes to `0.0`.
    const SILENCE: Self;

    /// The signed amplitude of this sample, in encoding units.
    fn amplitude(self) -> f64;
}

impl PcmSample for i8 {
    const FULL_SCALE: f64 = -(i8::MIN as f64);
    const SILENCE: Self = 0;

    fn amplitude(self) -> f64 {
        self as f64
    }
}

impl PcmSample for i16 {
    const FULL_SCALE: f64 = -(i16::MIN as f64);
    const SILENCE: Self = 0;

    fn amplitude(self) -> f64 {
        self as f64
    }
}

impl PcmSample for i32 {
    const FULL_SCALE: f64 = -(i32::MIN as f64);
    const SILENCE: Self = 0;

    fn amplitude(self) -> f64 {
        self as f64
    }
}

/// Unsigned 8-bit PCM is offset binary: silence is 128.
impl PcmSample for u8 {
    const FULL_SCALE: f64 = 128.0;
    const SILENCE: Self = 128;

    fn amplitude(self) -> f64 {
        self as f64 - 128.0
    }
}

/// Float samples are already normalized and are only clamped.
impl PcmSample for f32 {
    const FULL_SCALE: f64 = 1.0;
    const SILENCE: Self = 0.0;

    fn amplitude(self) -> f64 {
        if self.is_nan() {
            0.0
        } else {
            self as f64
        }
    }
}

/// Normalize a single sample into `[-1, 1]`.
pub fn normalize<S: PcmSample, T: Float>(sample: S) -> T {
    let value = (sample.amplitude() / S::FULL_SCALE).clamp(-1.0, 1.0);
    T::from_f64(value).unwrap()
}

/// Normalize `raw` into `output`, which must have the same length.
pub fn normalize_into<S: PcmSample, T: Float>(raw: &[S], output: &mut [T]) {
    assert_eq!(
        raw.len(),
        output.len(),
        "The waveform must have one slot per raw sample"
    );
    raw.iter()
        .zip(output.iter_mut())
        .for_each(|(&s, o)| *o = normalize(s));
}

/// Allocate and return the normalized waveform of `raw`.
pub fn to_waveform<S: PcmSample, T: Float>(raw: &[S]) -> Vec<T> {
    raw.iter().map(|&s| normalize(s)).collect()
}

/// Decode byte-encoded 16-bit PCM with byte order `B` and normalize it into
/// `output`. `bytes` must hold exactly two bytes per output sample.
///
/// ```rust
/// use byteorder::LittleEndian;
/// use yin_tuner::pcm::normalize_pcm16_bytes;
///
/// let bytes = [0x00, 0x80, 0x00, 0x40, 0xff, 0x7f];
/// let mut wave = [0.0f32; 3];
/// normalize_pcm16_bytes::<LittleEndian, f32>(&bytes, &mut wave);
/// assert_eq!(wave[0], -1.0);
/// assert_eq!(wave[1], 0.5);
/// assert!(wave[2] < 1.0);
/// ```
pub fn normalize_pcm16_bytes<B: ByteOrder, T: Float>(bytes: &[u8], output: &mut [T]) {
    assert_eq!(
        bytes.len(),
        2 * output.len(),
        "16-bit PCM needs two bytes per sample"
    );
    bytes
        .chunks_exact(2)
        .zip(output.iter_mut())
        .for_each(|(pair, o)| *o = normalize(B::read_i16(pair)));
}
