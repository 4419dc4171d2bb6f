//! Numerical Gradient
//!
//! Interior samples use central differences, the two end samples use
//! first-order one-sided differences. Run edges therefore see a forward
//! (first sample) or backward (last sample) difference.

/// Gradient with unit sample spacing.
///
/// A single sample has gradient 0; an empty input yields an empty output.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push(values[1] - values[0]);
            for i in 1..n - 1 {
                out.push((values[i + 1] - values[i - 1]) / 2.0);
            }
            out.push(values[n - 1] - values[n - 2]);
            out
        }
    }
}

/// Gradient of `values` with respect to the sample coordinates `coords`.
///
/// Handles non-uniform spacing with the second-order interior formula.
/// Zero spacing produces a non-finite value, which callers treat as
/// "no valid velocity".
pub fn gradient_with_coords(values: &[f64], coords: &[f64]) -> Vec<f64> {
    let n = values.len().min(coords.len());
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push((values[1] - values[0]) / (coords[1] - coords[0]));
            for i in 1..n - 1 {
                let h_prev = coords[i] - coords[i - 1];
                let h_next = coords[i + 1] - coords[i];
                let denom = h_prev * h_next * (h_prev + h_next);
                out.push(
                    (h_prev * h_prev * values[i + 1] - h_next * h_next * values[i - 1]
                        + (h_next * h_next - h_prev * h_prev) * values[i])
                        / denom,
                );
            }
            out.push((values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]));
            out
        }
    }
}
