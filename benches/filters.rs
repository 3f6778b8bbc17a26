use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dmtx_rescue::models::AdaptiveMethod;
use dmtx_rescue::utils::binarization::{adaptive_binarize, threshold_binarize};
use dmtx_rescue::utils::clahe::{ClaheConfig, clahe};
use dmtx_rescue::utils::denoise::{NlMeansConfig, nl_means_denoise};
use dmtx_rescue::utils::grayscale::rgb_to_grayscale;
use dmtx_rescue::utils::morphology::{close, erode, open};
use dmtx_rescue::utils::sharpen::sharpen;

mod common;
use common::synthetic_gray;

fn bench_rgb_to_grayscale_medium(c: &mut Criterion) {
    let image = vec![128u8; 640 * 480 * 3];
    c.bench_function("rgb_to_grayscale_640x480", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&image), black_box(640), black_box(480)))
    });
}

fn bench_nl_means_small(c: &mut Criterion) {
    let gray = synthetic_gray(200, 80);
    c.bench_function("nl_means_denoise_200x80_h5", |b| {
        b.iter(|| {
            nl_means_denoise(
                black_box(&gray),
                black_box(200),
                black_box(80),
                black_box(5.0),
                NlMeansConfig::default(),
            )
        })
    });
}

fn bench_sharpen_medium(c: &mut Criterion) {
    let gray = synthetic_gray(640, 480);
    c.bench_function("sharpen_640x480", |b| {
        b.iter(|| sharpen(black_box(&gray), black_box(640), black_box(480), black_box(0.5)))
    });
}

fn bench_clahe_medium(c: &mut Criterion) {
    let gray = synthetic_gray(640, 480);
    c.bench_function("clahe_640x480", |b| {
        b.iter(|| clahe(black_box(&gray), black_box(640), black_box(480), ClaheConfig::default()))
    });
}

fn bench_threshold_binarize_medium(c: &mut Criterion) {
    let gray = synthetic_gray(640, 480);
    c.bench_function("threshold_binarize_640x480", |b| {
        b.iter(|| {
            threshold_binarize(
                black_box(&gray),
                black_box(640),
                black_box(480),
                black_box(127),
            )
        })
    });
}

fn bench_adaptive_binarize_medium(c: &mut Criterion) {
    let gray = synthetic_gray(640, 480);
    for method in [AdaptiveMethod::Mean, AdaptiveMethod::Gaussian] {
        c.bench_function(&format!("adaptive_binarize_{method}_640x480"), |b| {
            b.iter(|| {
                adaptive_binarize(
                    black_box(&gray),
                    black_box(640),
                    black_box(480),
                    method,
                    black_box(11),
                    black_box(2),
                )
            })
        });
    }
}

fn bench_morphology_medium(c: &mut Criterion) {
    let gray = synthetic_gray(640, 480);
    let binary = threshold_binarize(&gray, 640, 480, 127);
    c.bench_function("erode_close_open_640x480", |b| {
        b.iter(|| {
            let eroded = erode(black_box(&binary), 2, 1);
            let closed = close(&eroded, 4);
            open(&closed, 3)
        })
    });
}

criterion_group!(
    benches,
    bench_rgb_to_grayscale_medium,
    bench_nl_means_small,
    bench_sharpen_medium,
    bench_clahe_medium,
    bench_threshold_binarize_medium,
    bench_adaptive_binarize_medium,
    bench_morphology_medium
);
criterion_main!(benches);
