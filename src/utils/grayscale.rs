//! Convert RGB samples to single-channel intensity
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (77*R + 150*G + 29*B + 128) >> 8
//!
//! The weights sum to 256, so pure white maps to 255 and pure black to 0.

use rayon::prelude::*;

const COEF_R: u32 = 77;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Images at or above this many pixels are converted row-parallel
const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + 128) >> 8) as u8
}

/// Convert a packed RGB buffer to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    debug_assert!(rgb.len() >= pixel_count * 3);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut gray = vec![0u8; pixel_count];
    if pixel_count >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| convert_row(&rgb[y * width * 3..(y + 1) * width * 3], row));
    } else {
        for (y, row) in gray.chunks_mut(width).enumerate() {
            convert_row(&rgb[y * width * 3..(y + 1) * width * 3], row);
        }
    }
    gray
}

fn convert_row(rgb_row: &[u8], out: &mut [u8]) {
    for (px, dst) in rgb_row.chunks_exact(3).zip(out.iter_mut()) {
        *dst = luminance(px[0], px[1], px[2]);
    }
}
