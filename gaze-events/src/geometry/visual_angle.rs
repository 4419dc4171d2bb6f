//! Pixel to Visual-Angle Conversion
//!
//! Gaze traces arrive in screen pixels. Velocities are computed in degrees
//! of visual angle, which depend on the monitor geometry and the viewing
//! distance.

use serde::{Deserialize, Serialize};

/// Monitor geometry used to convert pixels into degrees of visual angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualAngle {
    /// Horizontal resolution of the stimulus monitor
    pub screen_width_px: f64,
    /// Physical width of the stimulus monitor
    pub screen_width_cm: f64,
    /// Eye-to-screen distance
    pub viewing_distance_cm: f64,
}

impl Default for VisualAngle {
    fn default() -> Self {
        Self {
            screen_width_px: 1024.0,
            screen_width_cm: 40.0,
            viewing_distance_cm: 50.0,
        }
    }
}

impl VisualAngle {
    /// Centimetres spanned by one pixel.
    #[inline]
    pub fn cm_per_px(&self) -> f64 {
        self.screen_width_cm / self.screen_width_px
    }

    /// Convert one pixel coordinate to degrees.
    #[inline]
    pub fn to_degrees(&self, px: f64) -> f64 {
        (px * self.cm_per_px() / self.viewing_distance_cm)
            .atan()
            .to_degrees()
    }

    /// Convert a 1D pixel sequence to degrees. Apply to x and y separately.
    pub fn pixels_to_degrees(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&px| self.to_degrees(px)).collect()
    }

    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("screen_width_px", self.screen_width_px),
            ("screen_width_cm", self.screen_width_cm),
            ("viewing_distance_cm", self.viewing_distance_cm),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::Error::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_maps_to_zero() {
        let va = VisualAngle::default();
        assert_eq!(va.to_degrees(0.0), 0.0);
    }

    #[test]
    fn test_known_angle() {
        // 1 px == 1 cm at 1 cm distance gives 45 degrees
        let va = VisualAngle {
            screen_width_px: 100.0,
            screen_width_cm: 100.0,
            viewing_distance_cm: 1.0,
        };
        assert!((va.to_degrees(1.0) - 45.0).abs() < 1e-9);
        assert!((va.to_degrees(-1.0) + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_and_length_preserving() {
        let va = VisualAngle::default();
        let deg = va.pixels_to_degrees(&[0.0, 10.0, 100.0, 500.0]);
        assert_eq!(deg.len(), 4);
        assert!(deg.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_nan_propagates() {
        let va = VisualAngle::default();
        assert!(va.to_degrees(f64::NAN).is_nan());
    }

    #[test]
    fn test_validate() {
        assert!(VisualAngle::default().validate().is_ok());
        let bad = VisualAngle {
            viewing_distance_cm: 0.0,
            ..VisualAngle::default()
        };
        assert!(bad.validate().is_err());
    }
}
