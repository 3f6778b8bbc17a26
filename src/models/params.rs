use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// Inclusive domain of each tunable knob.
pub mod domain {
    pub const ERODE_SIZE: (i64, i64) = (1, 5);
    pub const ERODE_ITER: (i64, i64) = (1, 3);
    pub const CLOSE_SIZE: (i64, i64) = (2, 6);
    pub const OPEN_SIZE: (i64, i64) = (2, 5);
    pub const THRESHOLD: (i64, i64) = (0, 255);
    pub const SHARPNESS: (i64, i64) = (0, 100);
    pub const DENOISE: (i64, i64) = (0, 30);
    pub const ADAPTIVE_BLOCK_RAW: (i64, i64) = (1, 15);
    pub const ADAPTIVE_C: (i64, i64) = (-10, 10);
}

/// Local-mean estimator used by adaptive thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdaptiveMethod {
    Mean,
    #[default]
    Gaussian,
}

impl AdaptiveMethod {
    /// Literal name used in the settings and preset files.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdaptiveMethod::Mean => "MEAN",
            AdaptiveMethod::Gaussian => "GAUSSIAN",
        }
    }
}

impl fmt::Display for AdaptiveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdaptiveMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEAN" => Ok(AdaptiveMethod::Mean),
            "GAUSSIAN" => Ok(AdaptiveMethod::Gaussian),
            _ => Err(()),
        }
    }
}

/// Binarization strategy, chosen once per pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thresholding {
    /// `pixel > cutoff` becomes white.
    Global { cutoff: u8 },
    /// `pixel > local_mean - c` becomes white.
    Adaptive {
        method: AdaptiveMethod,
        block_size: usize,
        c: i32,
    },
}

/// The full set of knobs for one pipeline run.
///
/// A plain value: the session owns one and replaces it wholesale, presets own
/// theirs, and the pipeline only borrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub erode_size: u32,
    pub erode_iter: u32,
    pub close_size: u32,
    pub open_size: u32,
    pub threshold_value: u8,
    pub inverse: bool,
    pub sharpness: u32,
    pub denoise_strength: u32,
    pub use_adaptive_threshold: bool,
    pub adaptive_method: AdaptiveMethod,
    pub adaptive_block_raw: u32,
    pub adaptive_c: i32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            erode_size: 2,
            erode_iter: 1,
            close_size: 4,
            open_size: 3,
            threshold_value: 127,
            inverse: false,
            sharpness: 0,
            denoise_strength: 0,
            use_adaptive_threshold: false,
            adaptive_method: AdaptiveMethod::Gaussian,
            adaptive_block_raw: 5,
            adaptive_c: 2,
        }
    }
}

impl ParameterSet {
    /// Odd adaptive block size derived from the raw knob: `2 * raw + 1`, never below 3.
    pub fn adaptive_block_size(&self) -> usize {
        (self.adaptive_block_raw as usize * 2 + 1).max(3)
    }

    /// Sharpen blend weight in `[0, 1]`.
    pub fn sharpen_alpha(&self) -> f32 {
        self.sharpness.min(100) as f32 / 100.0
    }

    pub fn thresholding(&self) -> Thresholding {
        if self.use_adaptive_threshold {
            Thresholding::Adaptive {
                method: self.adaptive_method,
                block_size: self.adaptive_block_size(),
                c: self.adaptive_c,
            }
        } else {
            Thresholding::Global {
                cutoff: self.threshold_value,
            }
        }
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), ParamError> {
        check("erodeSize", self.erode_size as i64, domain::ERODE_SIZE)?;
        check("erodeIter", self.erode_iter as i64, domain::ERODE_ITER)?;
        check("closeSize", self.close_size as i64, domain::CLOSE_SIZE)?;
        check("openSize", self.open_size as i64, domain::OPEN_SIZE)?;
        check("sharpness", self.sharpness as i64, domain::SHARPNESS)?;
        check("denoiseStrength", self.denoise_strength as i64, domain::DENOISE)?;
        check(
            "adaptiveBlockRaw",
            self.adaptive_block_raw as i64,
            domain::ADAPTIVE_BLOCK_RAW,
        )?;
        check("adaptiveC", self.adaptive_c as i64, domain::ADAPTIVE_C)?;
        Ok(())
    }
}

pub(crate) fn check(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<(), ParamError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ParamError {
            field,
            value,
            min,
            max,
        })
    }
}
