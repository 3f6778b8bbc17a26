use rayon::prelude::*;

use crate::utils::border::reflect101;

/// Laplacian-boost kernel: centre 9, all eight neighbours -1
const CENTER_WEIGHT: i32 = 9;

/// Apply the 3x3 boost kernel with reflect-101 borders, saturating to `[0, 255]`
pub fn laplacian_boost(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return out;
    }

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let rows = [
            reflect101(y as isize - 1, height),
            y,
            reflect101(y as isize + 1, height),
        ];
        for (x, dst) in row.iter_mut().enumerate() {
            let cols = [
                reflect101(x as isize - 1, width),
                x,
                reflect101(x as isize + 1, width),
            ];
            let mut neighbours = 0i32;
            for &ry in &rows {
                for &cx in &cols {
                    neighbours += gray[ry * width + cx] as i32;
                }
            }
            let center = gray[y * width + x] as i32;
            // Neighbour sum includes the centre once, hence the +1.
            let v = (CENTER_WEIGHT + 1) * center - neighbours;
            *dst = v.clamp(0, 255) as u8;
        }
    });
    out
}

/// Blend `gray` toward its boosted variant: `(1 - alpha) * gray + alpha * boosted`
pub fn sharpen(gray: &[u8], width: usize, height: usize, alpha: f32) -> Vec<u8> {
    let boosted = laplacian_boost(gray, width, height);
    let alpha = alpha.clamp(0.0, 1.0);
    gray.iter()
        .zip(&boosted)
        .map(|(&g, &b)| {
            let v = (1.0 - alpha) * g as f32 + alpha * b as f32;
            v.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_region_is_fixed_point() {
        let gray = vec![77u8; 16];
        assert_eq!(laplacian_boost(&gray, 4, 4), gray);
        assert_eq!(sharpen(&gray, 4, 4, 0.6), gray);
    }

    #[test]
    fn test_edge_is_amplified() {
        // 3 dark columns then 3 bright columns
        let row = [50u8, 50, 50, 150, 150, 150];
        let gray: Vec<u8> = row.iter().cycle().take(6 * 3).copied().collect();
        let boosted = laplacian_boost(&gray, 6, 3);
        assert_eq!(boosted[6 + 2], 0); // 10*50 - (6*50 + 3*150) < 0
        assert_eq!(boosted[6 + 3], 255); // 10*150 - (3*50 + 6*150) > 255
    }

    #[test]
    fn test_zero_alpha_is_identity() {
        let gray: Vec<u8> = (0..25).map(|i| (i * 10) as u8).collect();
        assert_eq!(sharpen(&gray, 5, 5, 0.0), gray);
    }
}
