//! Coordinate geometry for gaze positions
//!
//! - Pixel to visual-angle conversion
//! - Affine mapping into the calibrated gaze space
//! - Region-of-interest rectangles derived from calibration landmarks

pub mod visual_angle;
pub mod space_map;
pub mod roi;

pub use roi::{CalibrationLandmarks, Rect, RoiConfig, RoiKind, RoiSet};
pub use space_map::AffineMap;
pub use visual_angle::VisualAngle;

use serde::{Deserialize, Serialize};

/// Gaze position in pixels (or degrees after conversion).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Mean of the finite points, or `None` if there are none.
pub fn mean_position(points: &[Point]) -> Option<Point> {
    let (sum_x, sum_y, n) = points
        .iter()
        .filter(|p| p.is_finite())
        .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
    if n == 0 {
        None
    } else {
        Some(Point::new(sum_x / n as f64, sum_y / n as f64))
    }
}
