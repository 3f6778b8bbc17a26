//! The region-to-binary transform chain.
//!
//! Stage order is fixed: crop, grayscale, denoise, sharpen, CLAHE, binarize,
//! invert, then erode / close / open. Denoise and sharpen are skipped outright
//! at strength 0; every other stage always runs.

use image::RgbImage;
use log::debug;

use crate::error::Rejected;
use crate::models::{BinaryImage, ParameterSet, Region};
use crate::utils::binarization::binarize;
use crate::utils::clahe::{ClaheConfig, clahe};
use crate::utils::denoise::{NlMeansConfig, nl_means_denoise};
use crate::utils::grayscale::rgb_to_grayscale;
use crate::utils::morphology::{close, erode, open};
use crate::utils::sharpen::sharpen;

/// Grayscale crop of the source, the input to every later stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayCrop {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Deterministic `region x params -> BinaryImage` transform.
///
/// Holds only the settings that are fixed for every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformPipeline {
    pub clahe: ClaheConfig,
    pub denoise: NlMeansConfig,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every stage on `region` of `source`.
    pub fn run(
        &self,
        source: &RgbImage,
        region: Option<Region>,
        params: &ParameterSet,
    ) -> Result<BinaryImage, Rejected> {
        params.validate()?;
        let crop = crop_gray(source, region)?;
        Ok(self.run_gray(crop, params))
    }

    /// Stages 3 to 8 on an already extracted grayscale crop
    pub fn run_gray(&self, crop: GrayCrop, params: &ParameterSet) -> BinaryImage {
        let GrayCrop {
            width,
            height,
            data: mut gray,
        } = crop;

        if params.denoise_strength > 0 {
            debug!("denoise h={}", params.denoise_strength);
            gray = nl_means_denoise(
                &gray,
                width,
                height,
                params.denoise_strength as f32,
                self.denoise,
            );
        }

        if params.sharpness > 0 {
            debug!("sharpen alpha={:.2}", params.sharpen_alpha());
            gray = sharpen(&gray, width, height, params.sharpen_alpha());
        }

        gray = clahe(&gray, width, height, self.clahe);

        let mode = params.thresholding();
        debug!("binarize {:?}", mode);
        let mut binary = binarize(&gray, width, height, mode);

        if params.inverse {
            binary.invert();
        }

        let binary = erode(
            &binary,
            params.erode_size as usize,
            params.erode_iter as usize,
        );
        let binary = close(&binary, params.close_size as usize);
        open(&binary, params.open_size as usize)
    }
}

/// Copy `region` out of `source` and convert it to intensity.
///
/// The crop is clipped to the image; the result owns its samples, so later
/// edits to `source` never reach it.
pub fn crop_gray(source: &RgbImage, region: Option<Region>) -> Result<GrayCrop, Rejected> {
    let region = region.ok_or(Rejected::MissingRegion)?;
    if region.is_degenerate() {
        return Err(Rejected::DegenerateRegion(region));
    }
    let clipped = region.clamp_to(source.width(), source.height());
    if clipped.is_degenerate() {
        return Err(Rejected::EmptyCrop);
    }

    let cropped = image::imageops::crop_imm(
        source,
        clipped.x1,
        clipped.y1,
        clipped.width(),
        clipped.height(),
    )
    .to_image();
    let width = cropped.width() as usize;
    let height = cropped.height() as usize;
    let data = rgb_to_grayscale(cropped.as_raw(), width, height);
    debug!(
        "cropped {}x{} at ({}, {})",
        width, height, clipped.x1, clipped.y1
    );
    Ok(GrayCrop {
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker(width: u32, height: u32, cell: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([15, 15, 15])
            } else {
                Rgb([240, 240, 240])
            }
        })
    }

    #[test]
    fn test_missing_and_degenerate_regions_rejected() {
        let img = checker(40, 40, 5);
        let pipeline = TransformPipeline::new();
        let params = ParameterSet::default();

        assert_eq!(
            pipeline.run(&img, None, &params),
            Err(Rejected::MissingRegion)
        );
        let flat = Region::new(10, 10, 10, 30);
        assert_eq!(
            pipeline.run(&img, Some(flat), &params),
            Err(Rejected::DegenerateRegion(flat))
        );
        let outside = Region::new(50, 50, 60, 60);
        assert_eq!(
            pipeline.run(&img, Some(outside), &params),
            Err(Rejected::EmptyCrop)
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        let img = checker(40, 40, 5);
        let params = ParameterSet {
            erode_size: 0,
            ..Default::default()
        };
        let result = TransformPipeline::new().run(&img, Some(Region::new(0, 0, 40, 40)), &params);
        assert!(matches!(result, Err(Rejected::InvalidParameters(_))));
    }

    #[test]
    fn test_output_matches_clipped_crop_size() {
        let img = checker(40, 30, 5);
        let out = TransformPipeline::new()
            .run(&img, Some(Region::new(10, 5, 100, 25)), &ParameterSet::default())
            .unwrap();
        assert_eq!((out.width(), out.height()), (30, 20));
        assert!(out.as_bytes().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_crop_is_a_copy() {
        let mut img = checker(20, 20, 4);
        let crop = crop_gray(&img, Some(Region::new(0, 0, 8, 8))).unwrap();
        for px in img.pixels_mut() {
            *px = Rgb([0, 0, 0]);
        }
        assert!(crop.data.iter().any(|&v| v > 200));
    }

    #[test]
    fn test_inverse_flips_before_morphology() {
        let img = checker(48, 48, 8);
        let region = Some(Region::new(0, 0, 48, 48));
        let plain = ParameterSet {
            erode_size: 1,
            close_size: 2,
            open_size: 2,
            ..Default::default()
        };
        let inverted = ParameterSet {
            inverse: true,
            ..plain
        };
        let pipeline = TransformPipeline::new();
        let a = pipeline.run(&img, region, &plain).unwrap();
        let b = pipeline.run(&img, region, &inverted).unwrap();
        // Dark cells are black without inversion and white with it
        assert!(!a.get(3, 3));
        assert!(b.get(3, 3));
        assert!(a.get(11, 3));
        assert!(!b.get(11, 3));
    }

    #[test]
    fn test_repeat_runs_identical() {
        let img = checker(64, 40, 6);
        let params = ParameterSet {
            sharpness: 35,
            denoise_strength: 4,
            use_adaptive_threshold: true,
            ..Default::default()
        };
        let pipeline = TransformPipeline::new();
        let region = Some(Region::new(3, 2, 60, 38));
        let first = pipeline.run(&img, region, &params).unwrap();
        let second = pipeline.run(&img, region, &params).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
