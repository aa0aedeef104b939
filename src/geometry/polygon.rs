//! Polygon predicates: area, containment, clearance.

use glam::Vec2;

use super::rect::Rect;
use super::segment::{point_segment_distance, segment_segment_distance, segments_intersect};
use super::EPSILON;

/// Signed area via the shoelace formula. Positive for counter-clockwise
/// winding; callers take the absolute value.
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    area / 2.0
}

/// Iterate the closing edges of an implicitly closed polygon.
pub fn polygon_edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Ray-casting point-in-polygon test. Points on the boundary count as
/// inside.
pub fn point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    for (a, b) in polygon_edges(vertices) {
        if point_segment_distance(p, a, b) <= EPSILON {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let t = (p.y - vi.y) / (vj.y - vi.y);
            if p.x < vi.x + t * (vj.x - vi.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether the rectangle lies entirely inside a simple polygon: all four
/// corners inside and no polygon edge crossing the rectangle interior.
/// Boundary contact is allowed.
pub fn rect_in_polygon(rect: &Rect, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    if !rect.corners().iter().all(|&c| point_in_polygon(c, vertices)) {
        return false;
    }
    // A slightly deflated interior must not be crossed by any edge so a
    // box can sit flush against the outline.
    let inner = rect.inflate(-EPSILON);
    if inner.width() <= 0.0 || inner.height() <= 0.0 {
        return true;
    }
    !polygon_edges(vertices).any(|(a, b)| inner.intersects_segment(a, b))
}

fn is_strictly_inside(rect: &Rect, p: Vec2) -> bool {
    p.x > rect.min.x && p.x < rect.max.x && p.y > rect.min.y && p.y < rect.max.y
}

/// Whether the rectangle interior intersects a polygon. Touching at the
/// boundary within `eps` does not count.
pub fn polygon_overlaps_rect(vertices: &[Vec2], rect: &Rect, eps: f32) -> bool {
    let inner = rect.inflate(-eps);
    if inner.width() <= 0.0 || inner.height() <= 0.0 {
        return false;
    }
    if inner.corners().iter().any(|&c| point_in_polygon(c, vertices)) {
        return true;
    }
    if vertices.iter().any(|&v| is_strictly_inside(&inner, v)) {
        return true;
    }
    polygon_edges(vertices)
        .any(|(a, b)| inner.edges().iter().any(|&(p, q)| segments_intersect(a, b, p, q)))
}

/// Minimum distance between a polygon and a rectangle, zero when they
/// touch or overlap.
pub fn polygon_rect_distance(vertices: &[Vec2], rect: &Rect) -> f32 {
    if rect.corners().iter().any(|&c| point_in_polygon(c, vertices))
        || vertices.iter().any(|&v| rect.contains_point(v))
    {
        return 0.0;
    }
    polygon_edges(vertices)
        .map(|(a, b)| rect.distance_to_segment(a, b))
        .fold(f32::MAX, f32::min)
}

/// Minimum distance between a polygon and a segment, zero when the
/// segment touches the polygon or lies inside it.
pub fn polygon_segment_distance(vertices: &[Vec2], a: Vec2, b: Vec2) -> f32 {
    if point_in_polygon(a, vertices) || point_in_polygon(b, vertices) {
        return 0.0;
    }
    polygon_edges(vertices)
        .map(|(p, q)| segment_segment_distance(a, b, p, q))
        .fold(f32::MAX, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ]
    }

    #[test]
    fn shoelace_area_of_square() {
        assert!((polygon_area(&square(10.0)).abs() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn shoelace_is_signed() {
        let mut reversed = square(10.0);
        reversed.reverse();
        assert!(polygon_area(&square(10.0)) > 0.0);
        assert!(polygon_area(&reversed) < 0.0);
    }

    #[test]
    fn point_in_polygon_boundary_is_inside() {
        let poly = square(10.0);
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &poly));
        assert!(point_in_polygon(Vec2::new(0.0, 5.0), &poly));
        assert!(point_in_polygon(Vec2::new(10.0, 10.0), &poly));
        assert!(!point_in_polygon(Vec2::new(10.1, 5.0), &poly));
    }

    #[test]
    fn rect_in_polygon_allows_flush_contact() {
        let poly = square(10.0);
        let inside = Rect::from_pos_size(Vec2::new(0.0, 0.0), 10.0, 10.0);
        let spill = Rect::from_pos_size(Vec2::new(8.0, 8.0), 3.0, 3.0);
        assert!(rect_in_polygon(&inside, &poly));
        assert!(!rect_in_polygon(&spill, &poly));
    }

    #[test]
    fn polygon_overlap_ignores_edge_touch() {
        let poly = square(10.0);
        let touching = Rect::from_pos_size(Vec2::new(10.0, 0.0), 2.0, 2.0);
        let crossing = Rect::from_pos_size(Vec2::new(9.0, 0.0), 2.0, 2.0);
        assert!(!polygon_overlaps_rect(&poly, &touching, crate::geometry::EPSILON));
        assert!(polygon_overlaps_rect(&poly, &crossing, crate::geometry::EPSILON));
    }

    #[test]
    fn polygon_rect_distance_outside() {
        let poly = square(10.0);
        let r = Rect::from_pos_size(Vec2::new(13.0, 0.0), 2.0, 2.0);
        assert!((polygon_rect_distance(&poly, &r) - 3.0).abs() < 1e-4);
    }
}
