use image::{GrayImage, imageops::FilterType};

/// Value of a foreground (white) pixel
pub const WHITE: u8 = 255;
/// Value of a background (black) pixel
pub const BLACK: u8 = 0;

/// Strict two-level image: every sample is either `BLACK` or `WHITE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryImage {
    /// Create an all-black image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![BLACK; width * height],
        }
    }

    /// Wrap a row-major buffer, snapping every non-zero sample to `WHITE`
    pub fn from_levels(width: usize, height: usize, mut data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        for v in &mut data {
            *v = if *v == BLACK { BLACK } else { WHITE };
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when (x, y) is white; out of bounds reads as black
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] == WHITE
    }

    /// Set (x, y) white or black; out of bounds is ignored
    pub fn set(&mut self, x: usize, y: usize, white: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = if white { WHITE } else { BLACK };
    }

    /// Swap black and white in place
    pub fn invert(&mut self) {
        for v in &mut self.data {
            *v = WHITE - *v;
        }
    }

    /// Fraction of black samples, 0.0 for an empty image
    pub fn dark_ratio(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let dark = self.data.iter().filter(|&&v| v == BLACK).count();
        dark as f64 / self.data.len() as f64
    }

    /// Raw samples, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy into an `image` grayscale buffer
    pub fn to_gray_image(&self) -> GrayImage {
        // Dimensions always match the buffer length, so this cannot fail.
        GrayImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width as u32, self.height as u32))
    }

    /// Scale down to fit `max_side` x `max_side`, keeping aspect ratio.
    /// Images already within bounds are copied unchanged.
    pub fn thumbnail(&self, max_side: u32) -> GrayImage {
        let gray = self.to_gray_image();
        let (w, h) = gray.dimensions();
        if (w <= max_side && h <= max_side) || w == 0 || h == 0 {
            return gray;
        }
        let scale = max_side as f64 / w.max(h) as f64;
        let nw = ((w as f64 * scale).round() as u32).max(1);
        let nh = ((h as f64 * scale).round() as u32).max(1);
        image::imageops::resize(&gray, nw, nh, FilterType::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_levels_is_strict() {
        let img = BinaryImage::from_levels(2, 2, vec![0, 1, 128, 255]);
        assert_eq!(img.as_bytes(), &[0, 255, 255, 255]);
    }

    #[test]
    fn test_double_invert_is_identity() {
        let original = BinaryImage::from_levels(3, 2, vec![0, 255, 0, 255, 255, 0]);
        let mut img = original.clone();
        img.invert();
        assert_ne!(img, original);
        img.invert();
        assert_eq!(img, original);
    }

    #[test]
    fn test_get_set_out_of_bounds() {
        let mut img = BinaryImage::new(4, 4);
        img.set(10, 10, true); // Should not panic
        assert!(!img.get(10, 10));
        img.set(1, 2, true);
        assert!(img.get(1, 2));
        assert!((img.dark_ratio() - 15.0 / 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_thumbnail_fits() {
        let img = BinaryImage::new(400, 100);
        let thumb = img.thumbnail(200);
        assert_eq!(thumb.dimensions(), (200, 50));

        let small = BinaryImage::new(20, 10);
        assert_eq!(small.thumbnail(200).dimensions(), (20, 10));
    }
}
