use serde::Serialize;

/// Axis-aligned rectangle in source-image pixel coordinates, `x2`/`y2` exclusive.
///
/// Construction never fails; a degenerate rectangle is rejected when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Region {
    /// Create a region from its corners as given
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a region from two arbitrary drag corners
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    /// `x1 >= x2` or `y1 >= y2`
    pub fn is_degenerate(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Intersect with an image of the given size. May come back degenerate.
    pub fn clamp_to(&self, width: u32, height: u32) -> Region {
        Region {
            x1: self.x1.min(width),
            y1: self.y1.min(height),
            x2: self.x2.min(width),
            y2: self.y2.min(height),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    /// Parse `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected x1,y1,x2,y2, got '{s}'"));
        }
        let mut coords = [0u32; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid coordinate '{part}'"))?;
        }
        Ok(Region::new(coords[0], coords[1], coords[2], coords[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate() {
        assert!(!Region::new(0, 0, 200, 80).is_degenerate());
        assert!(Region::new(5, 0, 5, 80).is_degenerate());
        assert!(Region::new(0, 9, 10, 3).is_degenerate());
    }

    #[test]
    fn test_from_corners_normalizes() {
        let r = Region::from_corners((50, 10), (20, 40));
        assert_eq!(r, Region::new(20, 10, 50, 40));
        assert_eq!((r.width(), r.height()), (30, 30));
    }

    #[test]
    fn test_clamp_outside_image_is_degenerate() {
        let r = Region::new(120, 0, 150, 20).clamp_to(100, 100);
        assert!(r.is_degenerate());
    }

    #[test]
    fn test_parse() {
        assert_eq!("0,0,200,80".parse(), Ok(Region::new(0, 0, 200, 80)));
        assert!("1,2,3".parse::<Region>().is_err());
        assert!("a,0,1,1".parse::<Region>().is_err());
    }
}
