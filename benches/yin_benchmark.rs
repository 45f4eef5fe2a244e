use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yin_tuner::{
    detector::{
        internals::{square_difference, windowed_square_error},
        yin::YINDetector,
        DifferenceMethod, PitchDetector,
    },
    note::NoteMapper,
    pcm::normalize_into,
    utils::buffer::SpectralBuffers,
};

const SAMPLE_RATE: usize = 44100;
const SIZE: usize = 2048;
const LAGS: usize = SIZE / 2;

fn sine(freq: f64) -> Vec<f64> {
    // Signal coming from some source (microphone, generated, etc...)
    let dt = 1.0 / SAMPLE_RATE as f64;
    (0..SIZE)
        .map(|x| (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
        .collect()
}

pub fn difference_benchmark(c: &mut Criterion) {
    let signal = sine(300.0);
    let mut result = vec![0.0; LAGS];
    let mut buffers = SpectralBuffers::new(2 * LAGS);

    c.bench_function("square_difference", |b| {
        b.iter(|| square_difference(black_box(&signal), &mut result))
    });

    c.bench_function("windowed_square_error", |b| {
        b.iter(|| windowed_square_error(black_box(&signal), &mut buffers, &mut result))
    });
}

pub fn pitch_detect_benchmark(c: &mut Criterion) {
    let signal = sine(300.0);
    let mut direct = YINDetector::with_method(LAGS, 0.125, DifferenceMethod::Direct);
    let mut fft = YINDetector::with_method(LAGS, 0.125, DifferenceMethod::Fft);

    c.bench_function("YIN direct get_pitch", |b| {
        b.iter(|| direct.get_pitch(black_box(&signal), SAMPLE_RATE))
    });

    c.bench_function("YIN fft get_pitch", |b| {
        b.iter(|| fft.get_pitch(black_box(&signal), SAMPLE_RATE))
    });
}

pub fn cycle_benchmark(c: &mut Criterion) {
    let raw: Vec<i16> = sine(220.0)
        .iter()
        .map(|y| (y * 16000.0) as i16)
        .collect();
    let mut waveform = vec![0.0f32; SIZE];
    let mut detector = YINDetector::<f32>::new(LAGS);
    let mapper = NoteMapper::default();

    c.bench_function("normalize, detect and map", |b| {
        b.iter(|| {
            normalize_into(black_box(&raw), &mut waveform);
            let pitch = detector.get_pitch(&waveform, SAMPLE_RATE);
            mapper.map(pitch.frequency)
        })
    });
}

criterion_group!(
    benches,
    difference_benchmark,
    pitch_detect_benchmark,
    cycle_benchmark
);
criterion_main!(benches);
