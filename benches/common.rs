use image::{Rgb, RgbImage};

/// Noisy low-contrast module grid, deterministic for a given size.
pub fn synthetic_photo(width: u32, height: u32, module: u32) -> RgbImage {
    let mut state: u32 = 0x9e37_79b9;
    RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 27) as u8;
        let dark = ((x / module) * 7 + (y / module) * 3) % 5 < 2;
        let base: u8 = if dark { 90 } else { 150 };
        let v = base.saturating_add(noise);
        Rgb([v, v, v])
    })
}

/// Grayscale bytes of `synthetic_photo`
#[allow(dead_code)]
pub fn synthetic_gray(width: usize, height: usize) -> Vec<u8> {
    synthetic_photo(width as u32, height as u32, 8)
        .pixels()
        .map(|p| p.0[0])
        .collect()
}
