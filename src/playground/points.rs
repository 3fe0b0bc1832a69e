use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A painted sample in normalised canvas space, `x, y ∈ [-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub x: f64,
    pub y: f64,
    /// Class 0 or class 1.
    pub label: u8,
}

impl LabeledPoint {
    pub fn new(x: f64, y: f64, label: u8) -> LabeledPoint {
        LabeledPoint { x, y, label }
    }

    /// Network input `[x, y]`.
    pub fn input(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Network target `[label]`.
    pub fn target(&self) -> [f64; 1] {
        [self.label as f64]
    }
}

/// The points a user has painted, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointSet {
    points: Vec<LabeledPoint>,
}

impl PointSet {
    pub fn new() -> PointSet {
        PointSet::default()
    }

    pub fn add(&mut self, point: LabeledPoint) -> Result<()> {
        if point.label > 1 {
            return Err(Error::InvalidConfig(format!("label must be 0 or 1, got {}", point.label)));
        }
        if !(point.x.is_finite() && point.y.is_finite()) {
            return Err(Error::InvalidConfig("point coordinates must be finite".into()));
        }
        self.points.push(point);
        Ok(())
    }

    /// Removes every point within `radius` of `(x, y)` (boundary included)
    /// and returns how many were removed.
    pub fn erase_within(&mut self, x: f64, y: f64, radius: f64) -> usize {
        let r2 = radius * radius;
        let before = self.points.len();
        self.points.retain(|p| {
            let dx = p.x - x;
            let dy = p.y - y;
            dx * dx + dy * dy > r2
        });
        before - self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[LabeledPoint] {
        &self.points
    }

    /// Number of points per class, `[class 0, class 1]`.
    pub fn class_counts(&self) -> [usize; 2] {
        let ones = self.points.iter().filter(|p| p.label == 1).count();
        [self.points.len() - ones, ones]
    }

    /// A uniformly chosen point, or `None` when empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&LabeledPoint> {
        if self.points.is_empty() {
            return None;
        }
        Some(&self.points[rng.gen_range(0..self.points.len())])
    }
}

/// Converts a brush radius in pixels to normalised units, using the canvas
/// width as the reference span of 2.
pub fn brush_radius(brush_px: f64, canvas_width: f64) -> f64 {
    (brush_px / canvas_width) * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn erase_removes_only_points_inside_the_radius() {
        let mut set = PointSet::new();
        set.add(LabeledPoint::new(0.0, 0.0, 0)).unwrap();
        set.add(LabeledPoint::new(0.1, 0.0, 1)).unwrap();
        set.add(LabeledPoint::new(0.5, 0.5, 1)).unwrap();

        assert_eq!(set.erase_within(0.0, 0.0, 0.1), 2);
        assert_eq!(set.as_slice(), &[LabeledPoint::new(0.5, 0.5, 1)]);
        assert_eq!(set.erase_within(-0.5, -0.5, 0.2), 0);
    }

    #[test]
    fn rejects_labels_outside_the_two_classes() {
        let mut set = PointSet::new();
        assert!(set.add(LabeledPoint::new(0.0, 0.0, 2)).is_err());
        assert!(set.add(LabeledPoint::new(f64::NAN, 0.0, 0)).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn sample_and_counts() {
        let mut set = PointSet::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(set.sample(&mut rng).is_none());

        set.add(LabeledPoint::new(0.2, 0.3, 1)).unwrap();
        set.add(LabeledPoint::new(-0.2, 0.3, 0)).unwrap();
        set.add(LabeledPoint::new(-0.4, 0.1, 0)).unwrap();
        assert_eq!(set.class_counts(), [2, 1]);
        for _ in 0..20 {
            let p = set.sample(&mut rng).unwrap();
            assert!(set.as_slice().contains(p));
        }

        set.clear();
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn brush_radius_is_relative_to_canvas_width() {
        assert_eq!(brush_radius(6.0, 600.0), 0.02);
    }
}
