//! Calibrated-Space Mapping
//!
//! Maps raw tracker coordinates into the calibrated gaze space that ROI
//! rectangles live in. The map is a 2x3 affine matrix fitted by least
//! squares from landmark correspondences.

use super::Point;
use serde::{Deserialize, Serialize};

/// Ratio of the determinant to the product of the row norms (Hadamard's
/// bound) below which the normal equations are treated as singular
const SINGULAR_RATIO: f64 = 1e-12;

/// `[x', y'] = [[a, b, c], [d, e, f]] * [x, y, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMap {
    pub matrix: [[f64; 3]; 2],
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMap {
    pub const fn identity() -> Self {
        Self {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Fit a map from `(source, destination)` pairs.
    ///
    /// Returns `None` with fewer than three pairs or when the source points
    /// are collinear.
    pub fn fit(pairs: &[(Point, Point)]) -> Option<Self> {
        if pairs.len() < 3 {
            return None;
        }

        // Normal equations: (A^T A) w = A^T b, A rows = [sx, sy, 1]
        let mut ata = [[0.0f64; 3]; 3];
        let mut atb_x = [0.0f64; 3];
        let mut atb_y = [0.0f64; 3];
        for (src, dst) in pairs {
            let row = [src.x, src.y, 1.0];
            for i in 0..3 {
                for j in 0..3 {
                    ata[i][j] += row[i] * row[j];
                }
                atb_x[i] += row[i] * dst.x;
                atb_y[i] += row[i] * dst.y;
            }
        }

        let det = det3(&ata);
        let bound: f64 = ata
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .product();
        if !det.is_finite() || !bound.is_finite() || det.abs() <= SINGULAR_RATIO * bound {
            return None;
        }

        Some(Self {
            matrix: [solve3(&ata, &atb_x, det), solve3(&ata, &atb_y, det)],
        })
    }

    /// Map one coordinate into calibrated space.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        let [r0, r1] = self.matrix;
        Point::new(
            r0[0] * p.x + r0[1] * p.y + r0[2],
            r1[0] * p.x + r1[1] * p.y + r1[2],
        )
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Cramer's rule
fn solve3(m: &[[f64; 3]; 3], rhs: &[f64; 3], det: f64) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut replaced = *m;
        for row in 0..3 {
            replaced[row][col] = rhs[row];
        }
        *slot = det3(&replaced) / det;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn test_identity() {
        let map = AffineMap::identity();
        assert!(map.is_identity());
        assert_eq!(map.apply(Point::new(3.0, -2.0)), Point::new(3.0, -2.0));
    }

    #[test]
    fn test_fit_recovers_scale_and_offset() {
        // x' = 2x + 10, y' = 0.5y - 4
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(50.0, 80.0),
        ];
        let pairs: Vec<(Point, Point)> = src
            .iter()
            .map(|&p| (p, Point::new(2.0 * p.x + 10.0, 0.5 * p.y - 4.0)))
            .collect();

        let map = AffineMap::fit(&pairs).expect("well-conditioned fit");
        assert!(close(map.apply(Point::new(10.0, 20.0)), Point::new(30.0, 6.0)));
    }

    #[test]
    fn test_fit_small_unit_landmarks() {
        // Sources a millimetre apart: x' = 2x + 1, y' = 2y + 1
        let src = [
            Point::new(0.0, 0.0),
            Point::new(0.001, 0.0),
            Point::new(0.0, 0.001),
            Point::new(0.001, 0.001),
        ];
        let pairs: Vec<(Point, Point)> = src
            .iter()
            .map(|&p| (p, Point::new(2.0 * p.x + 1.0, 2.0 * p.y + 1.0)))
            .collect();

        let map = AffineMap::fit(&pairs).expect("scale-independent fit");
        assert!(close(map.apply(Point::new(0.0005, 0.0005)), Point::new(1.001, 1.001)));
    }

    #[test]
    fn test_fit_rejects_collinear_small_units() {
        let pairs: Vec<(Point, Point)> = (0..4)
            .map(|i| {
                let p = Point::new(i as f64 * 1e-3, i as f64 * 2e-3);
                (p, p)
            })
            .collect();
        assert!(AffineMap::fit(&pairs).is_none());
    }

    #[test]
    fn test_fit_needs_three_pairs() {
        let pairs = vec![
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(1.0, 1.0), Point::new(1.0, 1.0)),
        ];
        assert!(AffineMap::fit(&pairs).is_none());
    }

    #[test]
    fn test_fit_rejects_collinear_sources() {
        let pairs: Vec<(Point, Point)> = (0..4)
            .map(|i| {
                let p = Point::new(i as f64, i as f64);
                (p, p)
            })
            .collect();
        assert!(AffineMap::fit(&pairs).is_none());
    }

    #[test]
    fn test_apply_all() {
        let map = AffineMap {
            matrix: [[1.0, 0.0, 5.0], [0.0, 1.0, -5.0]],
        };
        let out = map.apply_all(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(out, vec![Point::new(5.0, -5.0), Point::new(6.0, -4.0)]);
    }
}
