use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dmtx_rescue::models::{AdaptiveMethod, ParameterSet, Region};
use dmtx_rescue::presets::builtin_presets;
use dmtx_rescue::TransformPipeline;

mod common;
use common::synthetic_photo;

fn bench_pipeline_global(c: &mut Criterion) {
    let image = synthetic_photo(640, 480, 8);
    let pipeline = TransformPipeline::new();
    let region = Some(Region::new(100, 100, 300, 180));
    let params = ParameterSet::default();
    c.bench_function("pipeline_global_200x80", |b| {
        b.iter(|| pipeline.run(black_box(&image), region, black_box(&params)))
    });
}

fn bench_pipeline_adaptive_denoised(c: &mut Criterion) {
    let image = synthetic_photo(640, 480, 8);
    let pipeline = TransformPipeline::new();
    let region = Some(Region::new(100, 100, 300, 180));
    let params = ParameterSet {
        sharpness: 30,
        denoise_strength: 5,
        use_adaptive_threshold: true,
        adaptive_method: AdaptiveMethod::Gaussian,
        ..Default::default()
    };
    c.bench_function("pipeline_adaptive_denoised_200x80", |b| {
        b.iter(|| pipeline.run(black_box(&image), region, black_box(&params)))
    });
}

fn bench_pipeline_builtin_presets(c: &mut Criterion) {
    let image = synthetic_photo(640, 480, 8);
    let pipeline = TransformPipeline::new();
    let region = Some(Region::new(0, 0, 640, 480));
    let presets = builtin_presets();
    c.bench_function("pipeline_builtin_presets_640x480", |b| {
        b.iter(|| {
            for preset in &presets {
                let _ = black_box(pipeline.run(&image, region, &preset.params));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_pipeline_global,
    bench_pipeline_adaptive_denoised,
    bench_pipeline_builtin_presets
);
criterion_main!(benches);
