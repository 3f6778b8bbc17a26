//! End-to-end decode attempts on rendered Data Matrix art.
//!
//! The scenario symbols are real ECC 200 codes from the `datamatrix` encoder
//! and go through the built-in decoder; stub decoders only cover the attempt
//! plumbing (payload choice, timeouts).

use datamatrix::{DataMatrix, SymbolSize};
use dmtx_rescue::decoder::{MatrixDecoder, TimeBound, attempt};
use dmtx_rescue::models::{BinaryImage, DecodeOutcome, ParameterSet, Region};
use dmtx_rescue::{DecoderError, TransformPipeline, decode_region};
use image::{Rgb, RgbImage};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

const PAYLOAD: &str = "LOT-4711/A";

/// Reports two payloads for any image with at least one dark pixel.
struct TwoPayloads;

impl MatrixDecoder for TwoPayloads {
    fn decode(&self, image: &BinaryImage, _timeout: Duration) -> Result<Vec<Vec<u8>>, DecoderError> {
        if image.dark_ratio() > 0.0 {
            Ok(vec![PAYLOAD.as_bytes().to_vec(), b"second".to_vec()])
        } else {
            Ok(Vec::new())
        }
    }
}

#[derive(Default)]
struct RecordsTimeout(Mutex<Vec<Duration>>);

impl MatrixDecoder for RecordsTimeout {
    fn decode(&self, _image: &BinaryImage, timeout: Duration) -> Result<Vec<Vec<u8>>, DecoderError> {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(timeout);
        }
        Ok(Vec::new())
    }
}

struct Stuck;

impl MatrixDecoder for Stuck {
    fn decode(&self, _image: &BinaryImage, _timeout: Duration) -> Result<Vec<Vec<u8>>, DecoderError> {
        thread::sleep(Duration::from_millis(400));
        Ok(vec![b"too late".to_vec()])
    }
}

/// 240x120 light photo with `PAYLOAD` as an 8x32 Data Matrix (5 px modules)
/// at (20, 20), so the scenario region (0,0)-(200,80) holds the symbol plus
/// a four-module quiet zone.
fn clean_symbol() -> RgbImage {
    let module = 5;
    let origin = 20;
    let bitmap = DataMatrix::encode(PAYLOAD.as_bytes(), SymbolSize::Rect8x32)
        .expect("payload fits an 8x32 symbol")
        .bitmap();
    assert_eq!((bitmap.width(), bitmap.height()), (32, 8));

    let mut image = RgbImage::from_pixel(240, 120, Rgb([245, 245, 245]));
    for (mx, my) in bitmap.pixels() {
        for dy in 0..module {
            for dx in 0..module {
                let x = (origin + mx * module + dx) as u32;
                let y = (origin + my * module + dy) as u32;
                image.put_pixel(x, y, Rgb([12, 12, 12]));
            }
        }
    }
    image
}

fn scenario_params() -> ParameterSet {
    ParameterSet {
        threshold_value: 127,
        inverse: false,
        erode_size: 2,
        erode_iter: 1,
        close_size: 4,
        open_size: 3,
        sharpness: 0,
        denoise_strength: 0,
        use_adaptive_threshold: false,
        ..Default::default()
    }
}

#[test]
fn test_clean_symbol_decodes() {
    let outcome = decode_region(
        &clean_symbol(),
        Region::new(0, 0, 200, 80),
        &scenario_params(),
        2000,
    );
    assert_eq!(
        outcome,
        DecodeOutcome::Success {
            payload: PAYLOAD.to_string()
        }
    );
}

#[test]
fn test_zero_threshold_finds_nothing() {
    let params = ParameterSet {
        threshold_value: 0,
        ..scenario_params()
    };
    let outcome = decode_region(&clean_symbol(), Region::new(0, 0, 200, 80), &params, 2000);
    assert_eq!(outcome, DecodeOutcome::NotFound);
}

#[test]
fn test_first_payload_wins() {
    let outcome = attempt(
        &TwoPayloads,
        &TransformPipeline::new(),
        &clean_symbol(),
        Some(Region::new(0, 0, 200, 80)),
        &scenario_params(),
        2000,
    );
    assert_eq!(
        outcome,
        DecodeOutcome::Success {
            payload: PAYLOAD.to_string()
        }
    );
}

#[test]
fn test_degenerate_regions_are_errors() {
    let image = clean_symbol();
    for region in [
        Some(Region::new(50, 10, 50, 60)),
        Some(Region::new(10, 60, 90, 20)),
        Some(Region::new(300, 200, 400, 260)),
        None,
    ] {
        let outcome = attempt(
            &TwoPayloads,
            &TransformPipeline::new(),
            &image,
            region,
            &scenario_params(),
            2000,
        );
        assert_eq!(outcome, DecodeOutcome::error("invalid region"), "{region:?}");
    }
}

#[test]
fn test_non_positive_timeout_is_normalized() {
    let image = clean_symbol();
    let decoder = RecordsTimeout::default();
    let region = Some(Region::new(0, 0, 40, 40));
    for timeout in [0, -5, 250] {
        attempt(
            &decoder,
            &TransformPipeline::new(),
            &image,
            region,
            &scenario_params(),
            timeout,
        );
    }
    let seen = decoder.0.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(1000),
            Duration::from_millis(250)
        ]
    );
}

#[test]
fn test_stuck_decoder_becomes_error() {
    let image = clean_symbol();
    let outcome = attempt(
        &TimeBound::new(Stuck),
        &TransformPipeline::new(),
        &image,
        Some(Region::new(0, 0, 40, 40)),
        &scenario_params(),
        30,
    );
    match outcome {
        DecodeOutcome::Error { message } => assert!(message.contains("30 ms"), "{message}"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let image = clean_symbol();
    let pipeline = TransformPipeline::new();
    let region = Some(Region::new(5, 5, 195, 75));
    let params = ParameterSet {
        sharpness: 40,
        denoise_strength: 4,
        use_adaptive_threshold: true,
        ..scenario_params()
    };
    let first = pipeline.run(&image, region, &params).unwrap();
    let second = pipeline.run(&image, region, &params).unwrap();
    assert_eq!(first, second);
    assert_eq!((first.width(), first.height()), (190, 70));
}

#[test]
fn test_builtin_decoder_on_blank_region() {
    let image = RgbImage::from_pixel(120, 120, Rgb([240, 240, 240]));
    let outcome = decode_region(&image, Region::new(0, 0, 120, 120), &ParameterSet::default(), 500);
    assert_eq!(outcome, DecodeOutcome::NotFound);
}
