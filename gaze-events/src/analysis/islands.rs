//! Island Detection
//!
//! An island is a maximal run of `true` in a boolean mask. Saccade and
//! fixation detection both reduce to thresholding a per-sample signal and
//! collecting its islands, so the boundary semantics live here only:
//! `stop` is inclusive and islands touching either end of the mask are kept.

use serde::{Deserialize, Serialize};

/// Inclusive sample interval `[start, stop]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub stop: usize,
}

impl Interval {
    pub const fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Number of samples covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Never true: an interval covers at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Middle sample, rounded down.
    #[inline]
    pub fn midpoint(&self) -> usize {
        self.start + (self.stop - self.start) / 2
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.stop
    }

    /// Borrow the covered samples. `None` if the interval runs past `data`.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> Option<&'a [T]> {
        data.get(self.start..=self.stop)
    }
}

/// Maximal runs of `true` whose length is at least `min_length`.
///
/// A `min_length` of 0 behaves like 1. An empty mask yields no islands.
pub fn find_islands(mask: &[bool], min_length: usize) -> Vec<Interval> {
    let min_length = min_length.max(1);
    let mut islands = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &flag) in mask.iter().enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if i - start >= min_length {
                    islands.push(Interval::new(start, i - 1));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    // Island touching the end of the mask
    if let Some(start) = run_start {
        if mask.len() - start >= min_length {
            islands.push(Interval::new(start, mask.len() - 1));
        }
    }

    islands
}

/// Mask of length `len` that is `true` exactly on `intervals`.
///
/// Interval samples beyond `len` are ignored.
pub fn mask_from_intervals(len: usize, intervals: &[Interval]) -> Vec<bool> {
    let mut mask = vec![false; len];
    for interval in intervals {
        let stop = interval.stop.min(len.saturating_sub(1));
        if interval.start < len {
            mask[interval.start..=stop].iter_mut().for_each(|m| *m = true);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &str) -> Vec<bool> {
        bits.chars().map(|c| c == '1').collect()
    }

    /// Every island is maximal, all-true, and long enough.
    fn assert_well_formed(m: &[bool], islands: &[Interval], min_length: usize) {
        for island in islands {
            assert!(island.len() >= min_length.max(1));
            assert!(m[island.start..=island.stop].iter().all(|&b| b));
            assert!(island.start == 0 || !m[island.start - 1]);
            assert!(island.stop == m.len() - 1 || !m[island.stop + 1]);
        }
    }

    #[test]
    fn test_empty_mask() {
        assert!(find_islands(&[], 1).is_empty());
        assert!(find_islands(&[], 0).is_empty());
    }

    #[test]
    fn test_all_false() {
        assert!(find_islands(&mask("00000"), 1).is_empty());
    }

    #[test]
    fn test_all_true() {
        assert_eq!(find_islands(&mask("1111"), 1), vec![Interval::new(0, 3)]);
        assert!(find_islands(&mask("1111"), 5).is_empty());
    }

    #[test]
    fn test_islands_at_both_edges() {
        let m = mask("1100111");
        let islands = find_islands(&m, 1);
        assert_eq!(islands, vec![Interval::new(0, 1), Interval::new(4, 6)]);
        assert_well_formed(&m, &islands, 1);
    }

    #[test]
    fn test_single_sample_islands() {
        let m = mask("10101");
        assert_eq!(
            find_islands(&m, 1),
            vec![Interval::new(0, 0), Interval::new(2, 2), Interval::new(4, 4)]
        );
        assert!(find_islands(&m, 2).is_empty());
    }

    #[test]
    fn test_min_length_filter_is_inclusive() {
        let m = mask("0110111011110");
        let islands = find_islands(&m, 3);
        assert_eq!(islands, vec![Interval::new(4, 6), Interval::new(8, 11)]);
        assert_well_formed(&m, &islands, 3);
    }

    #[test]
    fn test_zero_min_length_behaves_like_one() {
        let m = mask("0110");
        assert_eq!(find_islands(&m, 0), find_islands(&m, 1));
    }

    #[test]
    fn test_idempotent_over_reconstructed_mask() {
        let patterns = ["", "0", "1", "0110111011110", "1111000011", "1010101"];
        for bits in patterns {
            let m = mask(bits);
            for min_length in 0..4 {
                let first = find_islands(&m, min_length);
                let rebuilt = mask_from_intervals(m.len(), &first);
                assert_eq!(find_islands(&rebuilt, min_length), first, "pattern {bits}");
                assert_well_formed(&m, &first, min_length);
            }
        }
    }

    #[test]
    fn test_interval_helpers() {
        let iv = Interval::new(2, 6);
        assert_eq!(iv.len(), 5);
        assert_eq!(iv.midpoint(), 4);
        assert!(iv.contains(2) && iv.contains(6) && !iv.contains(7));
        assert!(!iv.is_empty());

        let data = [0, 1, 2, 3, 4, 5, 6];
        assert_eq!(iv.slice(&data), Some(&data[2..=6]));
        assert_eq!(Interval::new(5, 9).slice(&data), None);
        assert_eq!(Interval::new(3, 4).midpoint(), 3);
    }

    #[test]
    fn test_mask_from_intervals_clamps() {
        let m = mask_from_intervals(4, &[Interval::new(2, 10), Interval::new(7, 8)]);
        assert_eq!(m, mask("0011"));
    }
}
