//! Morphology with square structuring elements on binary images.
//!
//! The anchor sits at `size / 2`, so an even-sized element reaches one pixel
//! further back than forward. Pixels outside the image never take part in the
//! min/max, which keeps the border from eroding or growing on its own.

use crate::models::BinaryImage;

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

/// Erode (min filter) `iterations` times
pub fn erode(image: &BinaryImage, size: usize, iterations: usize) -> BinaryImage {
    let mut out = image.clone();
    for _ in 0..iterations {
        out = rect_filter(&out, size, Extremum::Min);
    }
    out
}

/// Dilate (max filter) once
pub fn dilate(image: &BinaryImage, size: usize) -> BinaryImage {
    rect_filter(image, size, Extremum::Max)
}

/// Dilate then erode: fills gaps smaller than the element
pub fn close(image: &BinaryImage, size: usize) -> BinaryImage {
    erode(&dilate(image, size), size, 1)
}

/// Erode then dilate: removes specks smaller than the element
pub fn open(image: &BinaryImage, size: usize) -> BinaryImage {
    dilate(&erode(image, size, 1), size)
}

/// Separable rectangular min/max: rows first, then columns
fn rect_filter(image: &BinaryImage, size: usize, op: Extremum) -> BinaryImage {
    let (width, height) = (image.width(), image.height());
    if size <= 1 || width == 0 || height == 0 {
        return image.clone();
    }
    let back = size / 2;
    let forward = size - 1 - back;
    let src = image.as_bytes();

    let pick = |acc: u8, v: u8| match op {
        Extremum::Min => acc.min(v),
        Extremum::Max => acc.max(v),
    };
    let identity = match op {
        Extremum::Min => u8::MAX,
        Extremum::Max => u8::MIN,
    };

    let mut rows = vec![0u8; width * height];
    for y in 0..height {
        let line = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let lo = x.saturating_sub(back);
            let hi = (x + forward).min(width - 1);
            rows[y * width + x] = line[lo..=hi].iter().fold(identity, |a, &v| pick(a, v));
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        let lo = y.saturating_sub(back);
        let hi = (y + forward).min(height - 1);
        for x in 0..width {
            out[y * width + x] = (lo..=hi)
                .map(|yy| rows[yy * width + x])
                .fold(identity, pick);
        }
    }
    BinaryImage::from_levels(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_from(rows: &[&str]) -> BinaryImage {
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        BinaryImage::from_levels(width, rows.len(), data)
    }

    fn render(image: &BinaryImage) -> Vec<String> {
        (0..image.height())
            .map(|y| {
                (0..image.width())
                    .map(|x| if image.get(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_erode_3x3_shrinks_block() {
        let img = image_from(&[".....", ".###.", ".###.", ".###.", "....."]);
        let out = erode(&img, 3, 1);
        assert_eq!(render(&out), vec![".....", ".....", "..#..", ".....", "....."]);
    }

    #[test]
    fn test_even_element_anchor() {
        // A 2-wide element looks at (x-1, x): the white run shifts its left edge right.
        let img = image_from(&["..###.."]);
        assert_eq!(render(&erode(&img, 2, 1)), vec!["...##.."]);
        assert_eq!(render(&dilate(&img, 2)), vec!["..####."]);
    }

    #[test]
    fn test_iterations_compound() {
        let img = image_from(&["#######"]);
        let once = erode(&img, 3, 1);
        let twice = erode(&img, 3, 2);
        // Border pixels are not eroded by the outside
        assert_eq!(render(&once), vec!["#######"]);
        assert_eq!(once, twice);

        let img = image_from(&["..#####.."]);
        assert_eq!(render(&erode(&img, 3, 2)), vec!["....#...."]);
    }

    #[test]
    fn test_close_fills_gap_and_open_removes_speck() {
        let gap = image_from(&["###.###"]);
        assert_eq!(render(&close(&gap, 3)), vec!["#######"]);

        let speck = image_from(&["...", ".#.", "..."]);
        assert_eq!(render(&open(&speck, 2)), vec!["...", "...", "..."]);
    }

    #[test]
    fn test_size_one_is_identity() {
        let img = image_from(&["#.#", ".#."]);
        assert_eq!(erode(&img, 1, 3), img);
        assert_eq!(dilate(&img, 1), img);
    }
}
