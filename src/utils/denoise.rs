//! Non-local-means denoising for single-channel images.
//!
//! Every pixel is replaced by a weighted mean of the pixels in its search
//! window, each weighted by how similar its surrounding template patch is to
//! the centre pixel's patch: `w = exp(-d² / h²)` with `d²` the mean squared
//! patch difference. Patch distances are computed per search offset with an
//! integral image, so cost is `O(search² · pixels)` independent of template size.

use rayon::prelude::*;

use crate::utils::border::reflect101;

/// Window sizes of the filter. Both must be odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlMeansConfig {
    pub template_window: usize,
    pub search_window: usize,
}

impl Default for NlMeansConfig {
    fn default() -> Self {
        Self {
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Denoise `gray` with filter strength `h`. `h <= 0` returns a copy.
pub fn nl_means_denoise(
    gray: &[u8],
    width: usize,
    height: usize,
    h: f32,
    config: NlMeansConfig,
) -> Vec<u8> {
    if width == 0 || height == 0 || h <= 0.0 {
        return gray.to_vec();
    }

    let tr = config.template_window / 2;
    let sr = config.search_window / 2;
    let template = 2 * tr + 1;
    let pad = tr + sr;
    let pw = width + 2 * pad;
    let ph = height + 2 * pad;

    let mut padded = vec![0u8; pw * ph];
    for py in 0..ph {
        let sy = reflect101(py as isize - pad as isize, height);
        for px in 0..pw {
            let sx = reflect101(px as isize - pad as isize, width);
            padded[py * pw + px] = gray[sy * width + sx];
        }
    }

    // Squared-difference domain: every template position any output pixel can touch.
    let dw = width + 2 * tr;
    let dh = height + 2 * tr;
    let iw = dw + 1;
    let mut integral = vec![0u64; iw * (dh + 1)];

    let inv_h2 = 1.0 / (h * h);
    let inv_area = 1.0 / (template * template) as f32;
    let mut weight_sum = vec![0f32; width * height];
    let mut value_sum = vec![0f32; width * height];

    for dy in -(sr as isize)..=(sr as isize) {
        for dx in -(sr as isize)..=(sr as isize) {
            for v in 0..dh {
                let row_a = (v + sr) * pw;
                let row_b = ((v + sr) as isize + dy) as usize * pw;
                let mut running = 0u64;
                for u in 0..dw {
                    let a = padded[row_a + u + sr] as i32;
                    let b = padded[row_b + ((u + sr) as isize + dx) as usize] as i32;
                    let d = (a - b) as i64;
                    running += (d * d) as u64;
                    integral[(v + 1) * iw + u + 1] = integral[v * iw + u + 1] + running;
                }
            }

            let integral = &integral;
            let padded = &padded;
            weight_sum
                .par_chunks_mut(width)
                .zip(value_sum.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (weights, values))| {
                    let top = y * iw;
                    let bottom = (y + template) * iw;
                    let qrow = ((y + pad) as isize + dy) as usize * pw;
                    for x in 0..width {
                        let patch = integral[bottom + x + template] + integral[top + x]
                            - integral[bottom + x]
                            - integral[top + x + template];
                        let dist = patch as f32 * inv_area;
                        let w = (-dist * inv_h2).exp();
                        let q = padded[qrow + ((x + pad) as isize + dx) as usize] as f32;
                        weights[x] += w;
                        values[x] += w * q;
                    }
                });
        }
    }

    weight_sum
        .iter()
        .zip(&value_sum)
        .map(|(&w, &v)| (v / w).round().clamp(0.0, 255.0) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_unchanged() {
        let gray = vec![90u8; 30 * 20];
        let out = nl_means_denoise(&gray, 30, 20, 10.0, NlMeansConfig::default());
        assert_eq!(out, gray);
    }

    #[test]
    fn test_zero_strength_is_copy() {
        let gray: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let out = nl_means_denoise(&gray, 8, 8, 0.0, NlMeansConfig::default());
        assert_eq!(out, gray);
    }

    #[test]
    fn test_reduces_isolated_noise() {
        let (w, h) = (24, 24);
        let mut gray = vec![100u8; w * h];
        gray[12 * w + 12] = 160;
        let out = nl_means_denoise(&gray, w, h, 30.0, NlMeansConfig::default());
        assert!(out[12 * w + 12] < 160);
        assert!(out[12 * w + 12] >= 100);
    }

    #[test]
    fn test_tiny_image() {
        let gray = vec![10u8, 200, 30];
        let out = nl_means_denoise(&gray, 3, 1, 5.0, NlMeansConfig::default());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_deterministic() {
        let gray: Vec<u8> = (0..40 * 30).map(|i| (i * 37 % 256) as u8).collect();
        let a = nl_means_denoise(&gray, 40, 30, 12.0, NlMeansConfig::default());
        let b = nl_means_denoise(&gray, 40, 30, 12.0, NlMeansConfig::default());
        assert_eq!(a, b);
    }
}
