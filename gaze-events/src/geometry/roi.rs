//! Regions of Interest
//!
//! ROI rectangles (eyes, face, left/right object) are derived from the
//! far-plane calibration landmarks of each session and used to attribute
//! fixations to what the subject was looking at.

use super::{AffineMap, Point};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in gaze space. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build from two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Smallest rectangle containing every point.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::from_corners(*first, *first);
        Some(points.iter().skip(1).fold(init, |r, p| Self {
            min_x: r.min_x.min(p.x),
            min_y: r.min_y.min(p.y),
            max_x: r.max_x.max(p.x),
            max_y: r.max_y.max(p.y),
        }))
    }

    /// Square of half-size `half` centred on `center`.
    pub fn centered(center: Point, half: f64) -> Self {
        Self {
            min_x: center.x - half,
            min_y: center.y - half,
            max_x: center.x + half,
            max_y: center.y + half,
        }
    }

    pub fn padded(&self, pad: f64) -> Self {
        Self {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Which region a position falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiKind {
    Eye,
    Face,
    LeftObject,
    RightObject,
}

impl RoiKind {
    /// Lookup priority: the eye box sits inside the face box
    pub const PRIORITY: [RoiKind; 4] = [
        RoiKind::Eye,
        RoiKind::Face,
        RoiKind::LeftObject,
        RoiKind::RightObject,
    ];
}

/// Landmarks from the far-plane calibration, in raw tracker space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationLandmarks {
    pub eye_left: Point,
    pub eye_right: Point,
    pub mouth: Point,
    pub left_object: Point,
    pub right_object: Point,
    /// Raw-to-calibrated correspondences used to fit the space map
    #[serde(default)]
    pub reference_pairs: Vec<(Point, Point)>,
}

impl CalibrationLandmarks {
    /// Affine map fitted from `reference_pairs`, if they determine one.
    pub fn space_map(&self) -> Option<AffineMap> {
        AffineMap::fit(&self.reference_pairs)
    }

    /// Same landmarks with every point mapped through `map`.
    pub fn mapped(&self, map: &AffineMap) -> Self {
        Self {
            eye_left: map.apply(self.eye_left),
            eye_right: map.apply(self.eye_right),
            mouth: map.apply(self.mouth),
            left_object: map.apply(self.left_object),
            right_object: map.apply(self.right_object),
            reference_pairs: self.reference_pairs.clone(),
        }
    }
}

/// Padding applied when deriving ROI rectangles from landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    /// Margin around the two eye landmarks
    pub eye_padding_px: f64,
    /// Margin around eyes + mouth
    pub face_padding_px: f64,
    /// Half side length of each object square
    pub object_half_size_px: f64,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            eye_padding_px: 40.0,
            face_padding_px: 80.0,
            object_half_size_px: 100.0,
        }
    }
}

impl RoiConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("eye_padding_px", self.eye_padding_px),
            ("face_padding_px", self.face_padding_px),
            ("object_half_size_px", self.object_half_size_px),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::Error::Config(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// The four ROI rectangles of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiSet {
    pub eye: Rect,
    pub face: Rect,
    pub left_object: Rect,
    pub right_object: Rect,
}

impl RoiSet {
    pub fn from_landmarks(landmarks: &CalibrationLandmarks, config: &RoiConfig) -> Self {
        let eyes = Rect::from_corners(landmarks.eye_left, landmarks.eye_right);
        let face = Rect::bounding(&[landmarks.eye_left, landmarks.eye_right, landmarks.mouth])
            .unwrap_or(eyes);

        Self {
            eye: eyes.padded(config.eye_padding_px),
            face: face.padded(config.face_padding_px),
            left_object: Rect::centered(landmarks.left_object, config.object_half_size_px),
            right_object: Rect::centered(landmarks.right_object, config.object_half_size_px),
        }
    }

    pub fn rect(&self, kind: RoiKind) -> &Rect {
        match kind {
            RoiKind::Eye => &self.eye,
            RoiKind::Face => &self.face,
            RoiKind::LeftObject => &self.left_object,
            RoiKind::RightObject => &self.right_object,
        }
    }

    /// First region in priority order containing `p`.
    pub fn locate(&self, p: Point) -> Option<RoiKind> {
        if !p.is_finite() {
            return None;
        }
        RoiKind::PRIORITY
            .into_iter()
            .find(|&kind| self.rect(kind).contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks() -> CalibrationLandmarks {
        CalibrationLandmarks {
            eye_left: Point::new(400.0, 300.0),
            eye_right: Point::new(600.0, 300.0),
            mouth: Point::new(500.0, 450.0),
            left_object: Point::new(100.0, 700.0),
            right_object: Point::new(900.0, 700.0),
            reference_pairs: Vec::new(),
        }
    }

    #[test]
    fn test_rect_contains_edges_inclusive() {
        let r = Rect::from_corners(Point::new(10.0, 10.0), Point::new(0.0, 0.0));
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.0001, 5.0)));
    }

    #[test]
    fn test_bounding_empty() {
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_roi_boxes_from_landmarks() {
        let rois = RoiSet::from_landmarks(&landmarks(), &RoiConfig::default());
        assert_eq!(rois.eye.min_x, 360.0);
        assert_eq!(rois.eye.max_x, 640.0);
        assert_eq!(rois.eye.min_y, 260.0);
        assert_eq!(rois.face.max_y, 530.0);
        assert_eq!(rois.left_object, Rect::centered(Point::new(100.0, 700.0), 100.0));
    }

    #[test]
    fn test_locate_priority() {
        let rois = RoiSet::from_landmarks(&landmarks(), &RoiConfig::default());
        // Inside both eye and face: eye wins
        assert_eq!(rois.locate(Point::new(500.0, 300.0)), Some(RoiKind::Eye));
        // Face only
        assert_eq!(rois.locate(Point::new(500.0, 480.0)), Some(RoiKind::Face));
        assert_eq!(rois.locate(Point::new(120.0, 690.0)), Some(RoiKind::LeftObject));
        assert_eq!(rois.locate(Point::new(880.0, 750.0)), Some(RoiKind::RightObject));
        assert_eq!(rois.locate(Point::new(0.0, 0.0)), None);
        assert_eq!(rois.locate(Point::new(f64::NAN, 300.0)), None);
    }

    #[test]
    fn test_landmarks_space_map_and_mapping() {
        let mut lm = landmarks();
        assert!(lm.space_map().is_none());

        lm.reference_pairs = vec![
            (Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            (Point::new(100.0, 0.0), Point::new(110.0, 10.0)),
            (Point::new(0.0, 100.0), Point::new(10.0, 110.0)),
        ];
        let map = lm.space_map().expect("three independent pairs");
        let mapped = lm.mapped(&map);
        assert!((mapped.eye_left.x - 410.0).abs() < 1e-6);
        assert!((mapped.mouth.y - 460.0).abs() < 1e-6);
    }

    #[test]
    fn test_roi_config_validate() {
        assert!(RoiConfig::default().validate().is_ok());
        let bad = RoiConfig {
            face_padding_px: -1.0,
            ..RoiConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
