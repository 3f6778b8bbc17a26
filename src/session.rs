//! The operator's working state: one RGB buffer, a selection and the active
//! parameter set.
//!
//! The buffer is replaced wholesale on load and upscale and painted in place
//! for manual repair; pipeline runs only ever borrow it.

use std::path::Path;
use std::str::FromStr;

use image::imageops::FilterType;
use image::{GrayImage, Rgb, RgbImage};
use log::{debug, info};

use crate::error::SessionError;
use crate::models::{ParameterSet, Region};
use crate::pipeline::TransformPipeline;

/// Longest side of a preview thumbnail
pub const PREVIEW_SIDE: u32 = 200;

/// Fill colour for manual repair strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintColor {
    #[default]
    Black,
    White,
}

impl PaintColor {
    fn pixel(self) -> Rgb<u8> {
        match self {
            PaintColor::Black => Rgb([0, 0, 0]),
            PaintColor::White => Rgb([255, 255, 255]),
        }
    }
}

impl FromStr for PaintColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(PaintColor::Black),
            "white" => Ok(PaintColor::White),
            other => Err(format!("unknown paint color '{other}' (expected black or white)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    image: Option<RgbImage>,
    selection: Option<Region>,
    params: ParameterSet,
}

impl Session {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Replace the buffer. Any selection refers to the old image and is dropped.
    pub fn load(&mut self, image: RgbImage) {
        debug!("session image {}x{}", image.width(), image.height());
        self.image = Some(image);
        self.selection = None;
    }

    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SessionError> {
        let img = image::open(path.as_ref())?.to_rgb8();
        info!("loaded {}", path.as_ref().display());
        self.load(img);
        Ok(())
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn selection(&self) -> Option<Region> {
        self.selection
    }

    pub fn select(&mut self, region: Region) {
        self.selection = Some(Region::from_corners(
            (region.x1, region.y1),
            (region.x2, region.y2),
        ));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Replace the active parameters wholesale
    pub fn set_params(&mut self, params: ParameterSet) {
        self.params = params;
    }

    /// Enlarge the buffer by `factor` (> 1) with Lanczos resampling.
    ///
    /// Returns the new dimensions. The selection is cleared.
    pub fn upscale(&mut self, factor: f64) -> Result<(u32, u32), SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        if factor.is_nan() || factor <= 1.0 || factor.is_infinite() {
            return Err(SessionError::UpscaleFactor(factor));
        }
        let w = (image.width() as f64 * factor).floor() as u32;
        let h = (image.height() as f64 * factor).floor() as u32;
        let resized = image::imageops::resize(image, w, h, FilterType::Lanczos3);
        info!("upscaled by {factor:.2} to {w}x{h}");
        self.load(resized);
        Ok((w, h))
    }

    /// Paint a filled square of side `brush` centred on `(x, y)`.
    ///
    /// The square spans `[x - brush/2, x + brush/2]` on both axes, inclusive,
    /// clipped to the image. Nothing is painted when the clipped square has
    /// no extent; the return value says whether anything changed.
    pub fn paint(&mut self, x: u32, y: u32, brush: u32, color: PaintColor) -> Result<bool, SessionError> {
        let image = self.image.as_mut().ok_or(SessionError::NoImage)?;
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Ok(false);
        }
        let half = brush / 2;
        let (x1, y1) = (x.saturating_sub(half), y.saturating_sub(half));
        let x2 = x.saturating_add(half).min(w - 1);
        let y2 = y.saturating_add(half).min(h - 1);
        if x1 >= x2 || y1 >= y2 {
            return Ok(false);
        }

        let pixel = color.pixel();
        for py in y1..=y2 {
            for px in x1..=x2 {
                image.put_pixel(px, py, pixel);
            }
        }
        debug!("painted ({x1},{y1})-({x2},{y2}) {color:?}");
        Ok(true)
    }

    /// Binarized selection scaled to fit `PREVIEW_SIDE`, for display.
    pub fn preview(&self, pipeline: &TransformPipeline) -> Result<GrayImage, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let region = self.selection.ok_or(SessionError::NoSelection)?;
        let binary = pipeline.run(image, Some(region), &self.params)?;
        Ok(binary.thumbnail(PREVIEW_SIDE))
    }
}
