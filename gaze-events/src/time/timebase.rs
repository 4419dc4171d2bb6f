//! Sample Clock
//!
//! Converts between sample indices and seconds for a fixed sampling rate.
//! The origin is 0: sample `i` is stamped `i / sampling_rate`.

use std::ops::Range;

/// Fixed-rate sample clock for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBase {
    sampling_rate: f64,
}

impl TimeBase {
    /// Create a clock. The rate must be finite and positive.
    pub fn new(sampling_rate: f64) -> crate::Result<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(crate::Error::InvalidSamplingRate(sampling_rate));
        }
        Ok(Self { sampling_rate })
    }

    /// Samples per second.
    #[inline]
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Timestamp of sample `index`.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        index as f64 / self.sampling_rate
    }

    /// Duration covered by `n_samples` samples.
    #[inline]
    pub fn duration_of(&self, n_samples: usize) -> f64 {
        n_samples as f64 / self.sampling_rate
    }

    /// Timestamps for `n_samples` samples.
    pub fn time_vector(&self, n_samples: usize) -> Vec<f64> {
        (0..n_samples).map(|i| self.sample_time(i)).collect()
    }
}

/// Build `n_samples` increasing timestamps spaced `1 / sampling_rate` apart,
/// starting at 0.
pub fn build_time_vector(n_samples: usize, sampling_rate: f64) -> crate::Result<Vec<f64>> {
    Ok(TimeBase::new(sampling_rate)?.time_vector(n_samples))
}

/// Indices of samples with `start < t <= stop`.
///
/// `time_vec` must be non-decreasing, which makes the selection contiguous.
/// Adjacent windows sharing a boundary never both claim the boundary sample.
pub fn window_range(time_vec: &[f64], start: f64, stop: f64) -> Range<usize> {
    let lo = time_vec.partition_point(|&t| t <= start);
    let hi = time_vec.partition_point(|&t| t <= stop);
    if hi < lo {
        lo..lo
    } else {
        lo..hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_vector_origin_and_spacing() {
        let t = build_time_vector(5, 1.0).unwrap();
        assert_eq!(t, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let t = build_time_vector(3, 1000.0).unwrap();
        assert_eq!(t[0], 0.0);
        assert!((t[2] - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_time_vector_empty() {
        let t = build_time_vector(0, 500.0).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_invalid_sampling_rate() {
        assert!(TimeBase::new(0.0).is_err());
        assert!(TimeBase::new(-10.0).is_err());
        assert!(TimeBase::new(f64::NAN).is_err());
        assert!(TimeBase::new(f64::INFINITY).is_err());
        assert!(build_time_vector(10, 0.0).is_err());
    }

    #[test]
    fn test_window_left_exclusive_right_inclusive() {
        let t = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(window_range(&t, 1.0, 3.0), 2..4);
    }

    #[test]
    fn test_adjacent_windows_do_not_share_samples() {
        let t = build_time_vector(10, 1.0).unwrap();
        let a = window_range(&t, 0.0, 4.0);
        let b = window_range(&t, 4.0, 9.0);
        assert_eq!(a, 1..5);
        assert_eq!(b, 5..10);
    }

    #[test]
    fn test_window_outside_trace() {
        let t = vec![0.0, 1.0, 2.0];
        assert!(window_range(&t, 5.0, 8.0).is_empty());
        assert!(window_range(&t, -3.0, -1.0).is_empty());
        assert_eq!(window_range(&t, -1.0, 0.0), 0..1);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        assert!(window_range(&t, 3.0, 1.0).is_empty());
    }

    #[test]
    fn test_clock_conversions() {
        let clock = TimeBase::new(250.0).unwrap();
        assert_eq!(clock.sampling_rate(), 250.0);
        assert!((clock.sample_time(250) - 1.0).abs() < 1e-12);
        assert!((clock.duration_of(125) - 0.5).abs() < 1e-12);
    }
}
