//! Out-of-range index handling shared by the neighbourhood filters.

/// Reflect without repeating the edge sample: `... 2 1 | 0 1 2 ... n-1 | n-2 n-3 ...`
#[inline]
pub fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * (n - 1);
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - i;
    }
    i as usize
}

/// Clamp to the nearest edge sample
#[inline]
pub fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect101() {
        let got: Vec<usize> = (-3..8).map(|i| reflect101(i, 5)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(reflect101(-7, 1), 0);
    }

    #[test]
    fn test_replicate() {
        assert_eq!(replicate(-4, 3), 0);
        assert_eq!(replicate(1, 3), 1);
        assert_eq!(replicate(9, 3), 2);
    }
}
