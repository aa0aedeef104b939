//! Geometry kernel: primitives and predicates.
//!
//! - Axis-aligned rectangles with strict-overlap semantics
//! - Segment intersection and distance queries
//! - Polygon area, containment, and clearance
//!
//! All operations are pure functions over `glam::Vec2` coordinates in
//! meters. Classification of "touching vs overlapping" is governed by an
//! epsilon tolerance so adjacent shapes sharing an edge are not reported
//! as colliding.

pub mod polygon;
pub mod rect;
pub mod segment;

pub use polygon::{point_in_polygon, polygon_area, polygon_rect_distance, rect_in_polygon};
pub use rect::Rect;
pub use segment::{point_segment_distance, segment_segment_distance, segments_intersect};

/// Default numeric tolerance in plan units.
pub const EPSILON: f32 = 1e-6;
