use crate::models::{BinaryImage, ResultLog};
use crate::utils::grayscale::rgb_to_grayscale;
use image::RgbImage;

/// Convert an RGB image into grayscale bytes.
pub fn to_grayscale(rgb: &RgbImage) -> Vec<u8> {
    let (w, h) = rgb.dimensions();
    rgb_to_grayscale(rgb.as_raw(), w as usize, h as usize)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the image.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    if gray.is_empty() {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = (sum / gray.len() as u64) as u8;
    GrayStats { min, max, avg }
}

/// Compute black pixel stats for a binary image.
pub fn binary_stats(binary: &BinaryImage) -> BinaryStats {
    let total = binary.width() * binary.height();
    let black = binary.as_bytes().iter().filter(|&&v| v == 0).count();
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: binary.dark_ratio(),
    }
}

/// One `label: result` line per entry.
pub fn format_log(log: &ResultLog) -> String {
    let mut out = String::new();
    for entry in log {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}
