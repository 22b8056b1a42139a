//! Splitting the weapon list across workers
//!
//! Partitions are contiguous index ranges over the weapon pool. The split
//! depends only on the pool size and worker count, so a fixed worker count
//! always yields the same partitions.

use std::ops::Range;

/// Split `len` items into at most `parts` contiguous, non-empty ranges
///
/// The first `len % parts` ranges get one extra item. Returns no ranges
/// when `len` is zero.
///
/// # Example
///
/// ```text
/// contiguous(10, 4) -> [0..3, 3..6, 6..8, 8..10]
/// ```
pub fn contiguous(len: usize, parts: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let parts = parts.clamp(1, len);
    let base = len / parts;
    let extra = len % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(contiguous(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_remainder_goes_first() {
        assert_eq!(contiguous(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn test_more_parts_than_items() {
        assert_eq!(contiguous(3, 8), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_zero_parts_is_one() {
        assert_eq!(contiguous(5, 0), vec![0..5]);
    }

    #[test]
    fn test_empty() {
        assert!(contiguous(0, 4).is_empty());
    }

    #[test]
    fn test_covers_everything() {
        for len in 1..40 {
            for parts in 1..10 {
                let ranges = contiguous(len, parts);
                let covered: usize = ranges.iter().map(|r| r.len()).sum();
                assert_eq!(covered, len);
                assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
                assert!(ranges.iter().all(|r| !r.is_empty()));
            }
        }
    }
}
