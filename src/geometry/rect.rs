//! Axis-aligned rectangle with strict-overlap semantics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::segment::{segment_segment_distance, segments_intersect};

/// Axis-aligned rectangle, `min` is the lower-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Build from a lower-left position and a width/height.
    pub fn from_pos_size(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::new(width, height),
        }
    }

    /// Axis-aligned stroke covering the segment (a, b) inflated by
    /// `half_width` on every side.
    pub fn from_segment_stroke(a: Vec2, b: Vec2, half_width: f32) -> Self {
        Self {
            min: a.min(b) - Vec2::splat(half_width),
            max: a.max(b) + Vec2::splat(half_width),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// The four edges in counter-clockwise order.
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// Inclusive point containment (boundary counts).
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Positive-area intersection only. Rectangles that merely share an
    /// edge within `eps` are NOT overlapping.
    pub fn overlaps(&self, other: &Rect, eps: f32) -> bool {
        self.min.x + eps < other.max.x
            && other.min.x + eps < self.max.x
            && self.min.y + eps < other.max.y
            && other.min.y + eps < self.max.y
    }

    /// Area of the intersection, zero when disjoint.
    pub fn overlap_area(&self, other: &Rect) -> f32 {
        let w = (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0);
        let h = (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0.0);
        w * h
    }

    /// Whether the segment (a, b) touches this rectangle.
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        if self.contains_point(a) || self.contains_point(b) {
            return true;
        }
        self.edges()
            .iter()
            .any(|&(p, q)| segments_intersect(a, b, p, q))
    }

    /// Minimum distance from the rectangle to a point (zero inside).
    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        let dx = (self.min.x - p.x).max(p.x - self.max.x).max(0.0);
        let dy = (self.min.y - p.y).max(p.y - self.max.y).max(0.0);
        Vec2::new(dx, dy).length()
    }

    /// Minimum distance from the rectangle to a segment (zero when the
    /// segment touches or crosses it).
    pub fn distance_to_segment(&self, a: Vec2, b: Vec2) -> f32 {
        if self.intersects_segment(a, b) {
            return 0.0;
        }
        self.edges()
            .iter()
            .map(|&(p, q)| segment_segment_distance(a, b, p, q))
            .fold(f32::MAX, f32::min)
    }

    /// Minimum distance between two rectangles (zero when they touch).
    pub fn distance_to_rect(&self, other: &Rect) -> f32 {
        let dx = (self.min.x - other.max.x).max(other.min.x - self.max.x).max(0.0);
        let dy = (self.min.y - other.max.y).max(other.min.y - self.max.y).max(0.0);
        Vec2::new(dx, dy).length()
    }

    /// Perimeter length, used to scale clearance penalties.
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width() + self.height())
    }
}
