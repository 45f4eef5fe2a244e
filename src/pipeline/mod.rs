//! The detection loop: pull a block, normalize, detect, name the note, publish.
//!
//! The driver owns every buffer it uses. The raw block, the normalized waveform
//! and the detector's difference buffer are allocated once, in [Tuner::new], and
//! overwritten on each cycle. Cycles never overlap, so nothing here is shared or
//! locked; the only cross-thread state is the `running` flag checked between
//! cycles.
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::TunerConfig;
use crate::detector::internals::Pitch;
use crate::detector::yin::YINDetector;
use crate::detector::PitchDetector;
use crate::error::{Result, TunerError};
use crate::float::Float;
use crate::note::{Note, NoteMapper};
use crate::pcm::{normalize_into, PcmSample};

pub mod channel;

/// Where raw sample blocks come from.
pub trait AudioSource {
    type Sample: PcmSample;

    /// Fill `block` completely, blocking until enough samples are available.
    ///
    /// Return [TunerError::EndOfStream] once no more audio will arrive; any other
    /// error stops the pipeline and is handed back to its owner.
    fn read(&mut self, block: &mut [Self::Sample]) -> Result<()>;
}

/// Where status strings go.
pub trait DisplaySink {
    fn set_text(&mut self, text: &str);
}

impl<F> DisplaySink for F
where
    F: FnMut(&str),
{
    fn set_text(&mut self, text: &str) {
        self(text)
    }
}

/// An [AudioSource] backed by a closure. See [from_fn].
pub struct FnSource<S, F> {
    read: F,
    _sample: PhantomData<fn() -> S>,
}

/// Use a "pull next block" closure as an [AudioSource].
pub fn from_fn<S, F>(read: F) -> FnSource<S, F>
where
    S: PcmSample,
    F: FnMut(&mut [S]) -> Result<()>,
{
    FnSource {
        read,
        _sample: PhantomData,
    }
}

impl<S, F> AudioSource for FnSource<S, F>
where
    S: PcmSample,
    F: FnMut(&mut [S]) -> Result<()>,
{
    type Sample = S;

    fn read(&mut self, block: &mut [S]) -> Result<()> {
        (self.read)(block)
    }
}

/// The outcome of one detection cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Silence, noise, or anything below the audible gate.
    Unknown,
    Detected {
        note: Note,
        /// Measured frequency in Hz.
        frequency: f64,
    },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unknown => f.write_str("?"),
            Status::Detected { note, frequency } => write!(f, "{}: {:.2}", note, frequency),
        }
    }
}

/// Drives detection cycles from an [AudioSource] to a [DisplaySink].
pub struct Tuner<A, D, T = f32>
where
    A: AudioSource,
    D: DisplaySink,
    T: Float,
{
    config: TunerConfig,
    source: A,
    sink: D,
    block: Vec<A::Sample>,
    waveform: Vec<T>,
    detector: YINDetector<T>,
    mapper: NoteMapper,
}

impl<A, D, T> Tuner<A, D, T>
where
    A: AudioSource,
    D: DisplaySink,
    T: Float,
{
    /// Validate `config` and size every buffer from it.
    pub fn new(config: TunerConfig, source: A, sink: D) -> Result<Self> {
        config.validate()?;
        let mapper = NoteMapper::new(config.reference_pitch)?;
        let threshold = T::from_f64(config.threshold)
            .ok_or_else(|| TunerError::invalid_param("threshold", "not representable"))?;
        let detector =
            YINDetector::with_method(config.detection_length, threshold, config.difference);

        Ok(Tuner {
            block: vec![<A::Sample as PcmSample>::SILENCE; config.capture_length],
            waveform: vec![T::zero(); config.capture_length],
            detector,
            mapper,
            source,
            sink,
            config,
        })
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Run exactly one cycle and return what was published.
    pub fn run_cycle(&mut self) -> Result<Status> {
        self.source.read(&mut self.block)?;
        normalize_into(&self.block, &mut self.waveform);

        let pitch = self
            .detector
            .get_pitch(&self.waveform, self.config.sample_rate as usize);
        let status = self.classify(&pitch);
        log::debug!(
            "frequency {:.2} Hz, clarity {:.3}: {}",
            pitch.frequency,
            pitch.clarity,
            status
        );

        self.sink.set_text(&status.to_string());
        Ok(status)
    }

    /// The plausibility gate. The detector always answers; only frequencies above
    /// the audible minimum are worth naming.
    fn classify(&self, pitch: &Pitch<T>) -> Status {
        let frequency = pitch.frequency.to_f64().unwrap_or(f64::NAN);
        if !frequency.is_finite() || frequency <= self.config.min_frequency {
            return Status::Unknown;
        }
        match self.mapper.map(frequency) {
            Ok(note) => Status::Detected { note, frequency },
            Err(_) => Status::Unknown,
        }
    }

    /// Run cycles at the configured cadence until `running` is cleared or the
    /// source ends. A cycle in progress is always completed.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        let cadence = self.config.cadence();
        log::info!(
            "Tuner started: {} Hz, {} samples per block, {} lags, every {:?}",
            self.config.sample_rate,
            self.config.capture_length,
            self.config.detection_length,
            cadence
        );

        let mut next_tick = Instant::now();
        while running.load(Ordering::Acquire) {
            match self.run_cycle() {
                Ok(_) => {}
                Err(TunerError::EndOfStream) => {
                    log::info!("Audio source reached end of stream");
                    break;
                }
                Err(err) => return Err(err),
            }

            next_tick += cadence;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else {
                if !cadence.is_zero() {
                    log::warn!(
                        "Detection cycle overran the {:?} cadence by {:?}; consider a shorter detection length",
                        cadence,
                        now - next_tick
                    );
                }
                next_tick = now;
            }
        }

        log::info!("Tuner stopped");
        Ok(())
    }

    /// Give back the collaborators.
    pub fn into_parts(self) -> (A, D) {
        (self.source, self.sink)
    }
}

impl<A, D, T> Tuner<A, D, T>
where
    A: AudioSource + Send + 'static,
    D: DisplaySink + Send + 'static,
    T: Float,
{
    /// Move the tuner onto its own thread and start [Tuner::run].
    pub fn spawn(mut self) -> Result<TunerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("yin-tuner".into())
            .spawn(move || self.run(&flag))?;

        Ok(TunerHandle {
            running,
            thread: Some(thread),
        })
    }
}

/// Control over a tuner running on a background thread.
///
/// Dropping the handle without [TunerHandle::stop] or [TunerHandle::join] asks
/// the loop to exit after its current cycle but does not wait for it.
pub struct TunerHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl TunerHandle {
    /// Whether the loop has exited, on its own or after [TunerHandle::stop].
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |thread| thread.is_finished())
    }

    /// Ask the loop to exit after the current cycle and wait for it.
    pub fn stop(self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    /// Wait for the loop to exit on its own.
    pub fn join(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| TunerError::WorkerPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for TunerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.running.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn sine_block(freq: f64, amplitude: f64, size: usize, sample_rate: u32) -> Vec<i16> {
        (0..size)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (amplitude * 32767.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    }

    #[test]
    fn status_strings() {
        assert_eq!(Status::Unknown.to_string(), "?");
        let note = NoteMapper::default().map(220.0f64).unwrap();
        let status = Status::Detected {
            note,
            frequency: 220.456,
        };
        assert_eq!(status.to_string(), "A3: 220.46");
    }

    #[test]
    fn closure_collaborators() {
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let published = Rc::clone(&published);
            move |text: &str| published.borrow_mut().push(text.to_string())
        };
        let block = sine_block(440.0, 0.8, 2048, 44100);
        let source = from_fn(move |out: &mut [i16]| {
            out.copy_from_slice(&block);
            Ok(())
        });

        let mut tuner: Tuner<_, _> = Tuner::new(TunerConfig::default(), source, sink).unwrap();
        let status = tuner.run_cycle().unwrap();

        match &status {
            Status::Detected { note, frequency } => {
                assert_eq!(note.name(), "A4");
                assert!((frequency - 440.0).abs() < 5.0);
            }
            Status::Unknown => panic!("expected a note"),
        }
        assert_eq!(*published.borrow(), vec![status.to_string()]);
    }

    #[test]
    fn gate_rejects_low_frequencies() {
        let config = TunerConfig {
            min_frequency: 1000.0,
            ..TunerConfig::default()
        };
        let block = sine_block(440.0, 0.8, 2048, 44100);
        let source = from_fn(move |out: &mut [i16]| {
            out.copy_from_slice(&block);
            Ok(())
        });
        let mut tuner: Tuner<_, _, f64> = Tuner::new(config, source, |_: &str| {}).unwrap();
        assert_eq!(tuner.run_cycle().unwrap(), Status::Unknown);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = TunerConfig {
            capture_length: 1000,
            ..TunerConfig::default()
        };
        let source = from_fn(|_: &mut [i16]| Ok(()));
        let result: Result<Tuner<_, _>> = Tuner::new(config, source, |_: &str| {});
        assert!(matches!(result, Err(TunerError::BufferTooLarge { .. })));
    }

    #[test]
    fn run_stops_at_end_of_stream() {
        let mut remaining = 3;
        let source = from_fn(move |out: &mut [i16]| {
            if remaining == 0 {
                return Err(TunerError::EndOfStream);
            }
            remaining -= 1;
            out.iter_mut().for_each(|s| *s = 0);
            Ok(())
        });
        let mut count = 0;
        let config = TunerConfig {
            cadence_ms: 0,
            ..TunerConfig::default()
        };
        {
            let mut tuner: Tuner<_, _> = Tuner::new(config, source, |text: &str| {
                assert_eq!(text, "?");
                count += 1;
            })
            .unwrap();
            tuner.run(&AtomicBool::new(true)).unwrap();
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn source_errors_propagate() {
        let source = from_fn(|_: &mut [i16]| {
            Err(TunerError::source(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mic gone",
            )))
        });
        let mut tuner: Tuner<_, _> =
            Tuner::new(TunerConfig::default(), source, |_: &str| {}).unwrap();
        assert!(matches!(
            tuner.run(&AtomicBool::new(true)),
            Err(TunerError::Source(_))
        ));
    }

    #[test]
    fn cleared_flag_runs_nothing() {
        let source = from_fn(|_: &mut [i16]| -> Result<()> { panic!("should not read") });
        let mut tuner: Tuner<_, _> =
            Tuner::new(TunerConfig::default(), source, |_: &str| {}).unwrap();
        assert!(tuner.run(&AtomicBool::new(false)).is_ok());
    }

    fn small_config(cadence_ms: u64) -> TunerConfig {
        TunerConfig {
            capture_length: 256,
            detection_length: 128,
            cadence_ms,
            ..TunerConfig::default()
        }
    }

    #[test]
    fn cycles_follow_the_cadence() {
        let mut remaining = 4;
        let source = from_fn(move |out: &mut [i16]| {
            if remaining == 0 {
                return Err(TunerError::EndOfStream);
            }
            remaining -= 1;
            out.iter_mut().for_each(|s| *s = 0);
            Ok(())
        });
        let mut tuner: Tuner<_, _> = Tuner::new(small_config(50), source, |_: &str| {}).unwrap();

        let start = Instant::now();
        tuner.run(&AtomicBool::new(true)).unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(3 * 50), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "{:?}", elapsed);
    }

    #[test]
    fn overrun_restarts_the_schedule() {
        let reads = Rc::new(RefCell::new(Vec::new()));
        let source = {
            let reads = Rc::clone(&reads);
            from_fn(move |out: &mut [i16]| {
                let mut reads = reads.borrow_mut();
                if reads.len() == 4 {
                    return Err(TunerError::EndOfStream);
                }
                reads.push(Instant::now());
                if reads.len() == 1 {
                    thread::sleep(Duration::from_millis(150));
                }
                out.iter_mut().for_each(|s| *s = 0);
                Ok(())
            })
        };
        let mut tuner: Tuner<_, _> = Tuner::new(small_config(50), source, |_: &str| {}).unwrap();
        tuner.run(&AtomicBool::new(true)).unwrap();

        let reads = reads.borrow();
        assert_eq!(reads.len(), 4);
        // No extra wait after the slow cycle...
        let after_overrun = reads[1] - reads[0];
        assert!(after_overrun < Duration::from_millis(195), "{:?}", after_overrun);
        // ...and no burst of back to back cycles to catch up.
        for pair in reads[1..].windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(40), "{:?}", gap);
        }
    }

    #[test]
    fn dropped_handle_stops_the_loop() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = {
            let reads = Arc::clone(&reads);
            from_fn(move |out: &mut [i16]| {
                reads.fetch_add(1, Ordering::SeqCst);
                out.iter_mut().for_each(|s| *s = 0);
                Ok(())
            })
        };
        let handle = Tuner::<_, _>::new(small_config(5), source, |_: &str| {})
            .unwrap()
            .spawn()
            .unwrap();

        thread::sleep(Duration::from_millis(30));
        drop(handle);
        // Let a cycle already in progress finish.
        thread::sleep(Duration::from_millis(50));
        let settled = reads.load(Ordering::SeqCst);
        assert!(settled > 0);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(reads.load(Ordering::SeqCst), settled);
    }
}
