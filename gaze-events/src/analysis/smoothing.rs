//! Trace Smoothing
//!
//! Position traces are smoothed before differentiation. Any unary
//! `&[f64] -> Vec<f64>` function can serve as the kernel; the configurable
//! kernels are listed in [`SmoothingKernel`].

use serde::{Deserialize, Serialize};

/// Length-preserving 1D smoothing.
pub trait Smoother: Send + Sync {
    fn smooth(&self, signal: &[f64]) -> Vec<f64>;
}

impl<F> Smoother for F
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    fn smooth(&self, signal: &[f64]) -> Vec<f64> {
        self(signal)
    }
}

/// Kernels selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmoothingKernel {
    /// Pass the signal through unchanged
    Identity,
    /// Centred moving average; edges average only in-range samples
    MovingAverage { window: usize },
}

impl Default for SmoothingKernel {
    fn default() -> Self {
        SmoothingKernel::MovingAverage { window: 7 }
    }
}

impl SmoothingKernel {
    pub fn validate(&self) -> crate::Result<()> {
        if let SmoothingKernel::MovingAverage { window: 0 } = self {
            return Err(crate::Error::Config(
                "moving_average window must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Smoother for SmoothingKernel {
    fn smooth(&self, signal: &[f64]) -> Vec<f64> {
        match *self {
            SmoothingKernel::Identity => signal.to_vec(),
            SmoothingKernel::MovingAverage { window } => moving_average(signal, window),
        }
    }
}

/// Centred moving average of `window` samples.
///
/// Even windows extend one sample further back than forward. Near the edges
/// the window is truncated to the available samples. A non-finite sample
/// only affects the outputs whose window contains it.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || signal.is_empty() {
        return signal.to_vec();
    }

    let n = signal.len();
    let back = window / 2;
    let forward = window - back - 1;

    // Prefix sums over finite samples plus a prefix count of the rest
    let mut finite_sum = Vec::with_capacity(n + 1);
    let mut bad_count = Vec::with_capacity(n + 1);
    finite_sum.push(0.0);
    bad_count.push(0usize);
    for (i, &v) in signal.iter().enumerate() {
        let (sum, bad) = if v.is_finite() {
            (finite_sum[i] + v, bad_count[i])
        } else {
            (finite_sum[i], bad_count[i] + 1)
        };
        finite_sum.push(sum);
        bad_count.push(bad);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(back);
            let hi = (i + forward).min(n - 1);
            let len = (hi - lo + 1) as f64;
            if bad_count[hi + 1] > bad_count[lo] {
                signal[lo..=hi].iter().sum::<f64>() / len
            } else {
                (finite_sum[hi + 1] - finite_sum[lo]) / len
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let s = [1.0, 5.0, -2.0];
        assert_eq!(SmoothingKernel::Identity.smooth(&s), s.to_vec());
    }

    #[test]
    fn test_moving_average_interior_and_edges() {
        let s = [0.0, 3.0, 6.0, 9.0, 12.0];
        let out = moving_average(&s, 3);
        assert_eq!(out.len(), 5);
        assert!((out[0] - 1.5).abs() < 1e-12); // (0 + 3) / 2
        assert!((out[2] - 6.0).abs() < 1e-12);
        assert!((out[4] - 10.5).abs() < 1e-12); // (9 + 12) / 2
    }

    #[test]
    fn test_moving_average_preserves_constant() {
        let s = vec![4.0; 20];
        let out = SmoothingKernel::MovingAverage { window: 6 }.smooth(&s);
        assert!(out.iter().all(|v| (v - 4.0).abs() < 1e-12));
    }

    #[test]
    fn test_degenerate_windows() {
        let s = [1.0, 2.0, 3.0];
        assert_eq!(moving_average(&s, 1), s.to_vec());
        assert_eq!(moving_average(&s, 0), s.to_vec());
        assert!(moving_average(&[], 5).is_empty());
        // Window wider than the signal averages everything
        let out = moving_average(&s, 11);
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_nan_stays_inside_its_windows() {
        let mut s = vec![1.0; 40];
        s[5] = f64::NAN;
        let out = moving_average(&s, 7);
        // Windows covering index 5 are centred on 2..=8
        for (i, v) in out.iter().enumerate() {
            if (2..=8).contains(&i) {
                assert!(v.is_nan(), "expected NaN at {}", i);
            } else {
                assert!((v - 1.0).abs() < 1e-12, "unexpected {} at {}", v, i);
            }
        }
    }

    #[test]
    fn test_infinity_propagates_locally() {
        let mut s = vec![2.0; 10];
        s[0] = f64::INFINITY;
        let out = moving_average(&s, 3);
        assert_eq!(out[0], f64::INFINITY);
        assert_eq!(out[1], f64::INFINITY);
        assert!((out[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_closure_is_a_smoother() {
        let double = |s: &[f64]| s.iter().map(|v| v * 2.0).collect::<Vec<_>>();
        assert_eq!(double.smooth(&[1.0, 2.0]), vec![2.0, 4.0]);
    }

    #[test]
    fn test_validate() {
        assert!(SmoothingKernel::default().validate().is_ok());
        assert!(SmoothingKernel::MovingAverage { window: 0 }.validate().is_err());
    }

    #[test]
    fn test_kernel_serde_tags() {
        let json = serde_json::to_string(&SmoothingKernel::MovingAverage { window: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"moving_average","window":5}"#);
        let back: SmoothingKernel = serde_json::from_str(r#"{"kind":"identity"}"#).unwrap();
        assert_eq!(back, SmoothingKernel::Identity);
    }
}
