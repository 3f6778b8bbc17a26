//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a grid of tiles (right/bottom edges padded by
//! reflect-101 when the size is not a multiple of the grid). Each tile gets a
//! clipped, redistributed histogram turned into a lookup table, and every
//! pixel is mapped by bilinear interpolation between the four nearest tile
//! tables.

use rayon::prelude::*;

use crate::utils::border::reflect101;

const BINS: usize = 256;

/// Fixed tile grid and clip limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaheConfig {
    pub clip_limit: f32,
    pub tiles_x: usize,
    pub tiles_y: usize,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

/// Equalize `gray` with the given configuration
pub fn clahe(gray: &[u8], width: usize, height: usize, config: ClaheConfig) -> Vec<u8> {
    if width == 0 || height == 0 {
        return gray.to_vec();
    }
    let tiles_x = config.tiles_x.max(1);
    let tiles_y = config.tiles_y.max(1);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;

    let clip = if config.clip_limit > 0.0 {
        ((config.clip_limit * tile_area as f32 / BINS as f32) as usize).max(1)
    } else {
        usize::MAX
    };
    let lut_scale = (BINS - 1) as f32 / tile_area as f32;

    let luts: Vec<[u8; BINS]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let mut hist = [0usize; BINS];
            for py in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(py as isize, height);
                for px in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect101(px as isize, width);
                    hist[gray[sy * width + sx] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);
            let mut lut = [0u8; BINS];
            let mut cumulative = 0usize;
            for (bin, slot) in lut.iter_mut().enumerate() {
                cumulative += hist[bin];
                *slot = (cumulative as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
            }
            lut
        })
        .collect();

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let mut out = vec![0u8; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor() as isize;
        let ya = tyf - ty1 as f32;
        let ty2 = (ty1 + 1).min(tiles_y as isize - 1) as usize;
        let ty1 = ty1.max(0) as usize;

        for (x, dst) in row.iter_mut().enumerate() {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor() as isize;
            let xa = txf - tx1 as f32;
            let tx2 = (tx1 + 1).min(tiles_x as isize - 1) as usize;
            let tx1 = tx1.max(0) as usize;

            let v = gray[y * width + x] as usize;
            let top = luts[ty1 * tiles_x + tx1][v] as f32 * (1.0 - xa)
                + luts[ty1 * tiles_x + tx2][v] as f32 * xa;
            let bottom = luts[ty2 * tiles_x + tx1][v] as f32 * (1.0 - xa)
                + luts[ty2 * tiles_x + tx2][v] as f32 * xa;
            let mapped = top * (1.0 - ya) + bottom * ya;
            *dst = mapped.round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

/// Clip every bin to `limit` and spread the excess evenly over all bins
fn clip_histogram(hist: &mut [usize; BINS], limit: usize) {
    let mut clipped = 0usize;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }
    if clipped == 0 {
        return;
    }

    let batch = clipped / BINS;
    let mut residual = clipped - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: usize, height: usize, dark: u8, light: u8) -> Vec<u8> {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                if (x / 4 + y / 4) % 2 == 0 { dark } else { light }
            })
            .collect()
    }

    #[test]
    fn test_clip_preserves_mass() {
        let mut hist = [0usize; BINS];
        hist[0] = 500;
        hist[255] = 300;
        clip_histogram(&mut hist, 40);
        assert_eq!(hist.iter().sum::<usize>(), 800);
        assert!(hist[0] <= 40 + 3);
    }

    #[test]
    fn test_keeps_two_tone_separated() {
        let (w, h) = (64, 48);
        let gray = two_tone(w, h, 20, 230);
        let out = clahe(&gray, w, h, ClaheConfig::default());
        for (src, dst) in gray.iter().zip(&out) {
            if *src == 20 {
                assert!(*dst < 127, "dark pixel mapped to {dst}");
            } else {
                assert!(*dst > 127, "light pixel mapped to {dst}");
            }
        }
    }

    #[test]
    fn test_stretches_low_contrast() {
        let (w, h) = (64, 64);
        let gray = two_tone(w, h, 110, 140);
        let out = clahe(&gray, w, h, ClaheConfig::default());
        let min = *out.iter().min().unwrap();
        let max = *out.iter().max().unwrap();
        assert!(max - min > 30);
    }

    #[test]
    fn test_small_image_smaller_than_grid() {
        let gray = vec![10u8, 240, 10, 240, 10, 240];
        let out = clahe(&gray, 3, 2, ClaheConfig::default());
        assert_eq!(out.len(), 6);
    }
}
