use rayon::prelude::*;

use crate::models::binary::{BLACK, WHITE};
use crate::models::{AdaptiveMethod, BinaryImage, Thresholding};
use crate::utils::border::replicate;

/// Binarize with whichever strategy the parameter set selected
pub fn binarize(gray: &[u8], width: usize, height: usize, mode: Thresholding) -> BinaryImage {
    match mode {
        Thresholding::Global { cutoff } => threshold_binarize(gray, width, height, cutoff),
        Thresholding::Adaptive {
            method,
            block_size,
            c,
        } => adaptive_binarize(gray, width, height, method, block_size, c),
    }
}

/// Simple global threshold binarization: `pixel > threshold` is white
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryImage {
    let data = gray[..width * height]
        .iter()
        .map(|&v| if v > threshold { WHITE } else { BLACK })
        .collect();
    BinaryImage::from_levels(width, height, data)
}

/// Adaptive threshold: `pixel > local_mean - c` is white.
///
/// The local mean is a box average or a Gaussian-weighted average over a
/// `block_size` x `block_size` neighbourhood with replicated borders, rounded
/// to an 8-bit value before comparison.
pub fn adaptive_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    method: AdaptiveMethod,
    block_size: usize,
    c: i32,
) -> BinaryImage {
    if width == 0 || height == 0 {
        return BinaryImage::new(width, height);
    }
    let block_size = (block_size | 1).max(3);
    let mean = match method {
        AdaptiveMethod::Mean => box_mean(gray, width, height, block_size),
        AdaptiveMethod::Gaussian => gaussian_mean(gray, width, height, block_size),
    };

    let mut data = vec![BLACK; width * height];
    data.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let idx = y * width + x;
            if gray[idx] as i32 > mean[idx] as i32 - c {
                *dst = WHITE;
            }
        }
    });
    BinaryImage::from_levels(width, height, data)
}

/// Box average via a summed-area table over the replicate-padded image
fn box_mean(gray: &[u8], width: usize, height: usize, block: usize) -> Vec<u8> {
    let r = block / 2;
    let pw = width + 2 * r;
    let ph = height + 2 * r;
    let iw = pw + 1;
    let mut integral = vec![0u64; iw * (ph + 1)];
    for py in 0..ph {
        let sy = replicate(py as isize - r as isize, height);
        let mut running = 0u64;
        for px in 0..pw {
            let sx = replicate(px as isize - r as isize, width);
            running += gray[sy * width + sx] as u64;
            integral[(py + 1) * iw + px + 1] = integral[py * iw + px + 1] + running;
        }
    }

    let area = (block * block) as f64;
    let mut mean = vec![0u8; width * height];
    mean.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let top = y * iw;
        let bottom = (y + block) * iw;
        for (x, dst) in row.iter_mut().enumerate() {
            let sum = integral[bottom + x + block] + integral[top + x]
                - integral[bottom + x]
                - integral[top + x + block];
            *dst = (sum as f64 / area).round() as u8;
        }
    });
    mean
}

/// Binomial kernels used for the small odd sizes instead of sampling the curve
const SMALL_GAUSSIAN_KERNELS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1-D Gaussian kernel.
///
/// Odd sizes up to 7 use the fixed binomial tables; larger sizes sample the
/// curve with sigma `0.3 * ((k - 1) / 2 - 1) + 0.8`.
fn gaussian_kernel(size: usize) -> Vec<f64> {
    if size % 2 == 1 && size <= 7 {
        return SMALL_GAUSSIAN_KERNELS[size / 2].to_vec();
    }
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f64;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with replicated borders
fn gaussian_mean(gray: &[u8], width: usize, height: usize, block: usize) -> Vec<u8> {
    let kernel = gaussian_kernel(block);
    let r = (block / 2) as isize;

    let mut horizontal = vec![0f64; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &gray[y * width..(y + 1) * width];
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let sx = replicate(x as isize + k as isize - r, width);
                    acc += w * src[sx] as f64;
                }
                *dst = acc;
            }
        });

    let mut mean = vec![0u8; width * height];
    mean.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sy = replicate(y as isize + k as isize - r, height);
                acc += w * horizontal[sy * width + x];
            }
            *dst = acc.round().clamp(0.0, 255.0) as u8;
        }
    });
    mean
}
