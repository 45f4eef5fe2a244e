//! Mapping of frequencies onto twelve-tone equal temperament.
//!
//! Notes are named in scientific pitch notation with sharps: octaves begin at
//! C, so middle C is `C4` (MIDI 60) and the reference pitch is `A4` (MIDI 69).
use std::fmt;

use crate::error::{Result, TunerError};
use crate::float::Float;

/// Pitch-class names, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Concert pitch for A4, in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

const A4_MIDI: i32 = 69;

/// The equal-temperament note nearest to a measured frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Pitch class, e.g. `"C#"`.
    pub pitch_class: &'static str,
    /// Octave number; C4 is middle C.
    pub octave: i32,
    /// MIDI note number.
    pub midi: i32,
    /// Exact frequency of the note under the mapper's reference pitch.
    pub frequency: f64,
    /// Signed distance of the measurement from [Note::frequency], in cents.
    /// Positive is sharp.
    pub cents: f64,
}

impl Note {
    /// Note name with octave, e.g. `"A4"`.
    pub fn name(&self) -> String {
        format!("{}{}", self.pitch_class, self.octave)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Maps frequencies to notes relative to a reference pitch for A4.
///
/// ```rust
/// use yin_tuner::note::NoteMapper;
///
/// let mapper = NoteMapper::default();
/// let note = mapper.map(220.0f32).unwrap();
/// assert_eq!(note.name(), "A3");
/// assert!(note.cents.abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteMapper {
    reference_pitch: f64,
}

impl Default for NoteMapper {
    fn default() -> Self {
        NoteMapper {
            reference_pitch: A4_FREQUENCY,
        }
    }
}

impl NoteMapper {
    pub fn new(reference_pitch: f64) -> Result<Self> {
        if !(reference_pitch.is_finite() && reference_pitch > 0.0) {
            return Err(TunerError::invalid_param(
                "reference_pitch",
                format!("must be a positive frequency, got {}", reference_pitch),
            ));
        }
        Ok(NoteMapper { reference_pitch })
    }

    pub fn reference_pitch(&self) -> f64 {
        self.reference_pitch
    }

    /// Find the note nearest to `frequency` and the deviation from it.
    ///
    /// Non-positive and non-finite frequencies have no note and are rejected.
    pub fn map<T: Float>(&self, frequency: T) -> Result<Note> {
        let freq = frequency.to_f64().unwrap_or(f64::NAN);
        if !(freq.is_finite() && freq > 0.0) {
            return Err(TunerError::InvalidFrequency { freq });
        }

        let semitones = 12.0 * (freq / self.reference_pitch).log2();
        let nearest = semitones.round();
        let midi = A4_MIDI + nearest as i32;

        Ok(Note {
            pitch_class: NOTE_NAMES[midi.rem_euclid(12) as usize],
            octave: midi.div_euclid(12) - 1,
            midi,
            frequency: self.frequency_of(midi),
            cents: 100.0 * (semitones - nearest),
        })
    }

    /// Equal-temperament frequency of a MIDI note number.
    pub fn frequency_of(&self, midi: i32) -> f64 {
        self.reference_pitch * 2.0_f64.powf((midi - A4_MIDI) as f64 / 12.0)
    }
}

/// Deviation of `freq` from `target` in cents. Positive is sharp.
pub fn cents_between(freq: f64, target: f64) -> f64 {
    1200.0 * (freq / target).log2()
}
