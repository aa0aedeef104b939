//! Obstacle model and spatial index.
//!
//! Walls and restricted zones are bucketed into a uniform grid so a
//! placement query only inspects the obstacles near the query rectangle
//! instead of the whole plan (real extractions can carry 20,000+ wall
//! segments). The index is built once per optimization run and never
//! mutated afterwards; candidate placements are validated against it,
//! not inserted into it.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::polygon::{polygon_overlaps_rect, polygon_segment_distance};
use crate::geometry::{polygon_rect_distance, Rect, EPSILON};

/// A load-bearing or partition wall, modeled as a thick line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
}

impl Wall {
    pub fn new(start: Vec2, end: Vec2, thickness: f32) -> Self {
        Self {
            start,
            end,
            thickness,
        }
    }
}

/// Restricted-zone classification. Both kinds exclude box placement;
/// entry/exit zones must additionally stay unobstructed by corridors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    NoEntry,
    EntryExit,
}

/// A polygonal restricted zone (implicitly closed, >= 3 points).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub points: Vec<Vec2>,
    pub kind: ZoneKind,
}

impl Zone {
    pub fn new(points: Vec<Vec2>, kind: ZoneKind) -> Self {
        Self { points, kind }
    }
}

/// A static obstacle the optimizer must keep clear of.
#[derive(Clone, Debug)]
pub enum Obstacle {
    Wall(Wall),
    Zone(Zone),
}

impl Obstacle {
    /// Bounding box, inflated to the obstacle's full extent.
    pub fn aabb(&self) -> Rect {
        match self {
            Obstacle::Wall(w) => {
                Rect::from_segment_stroke(w.start, w.end, w.thickness * 0.5)
            }
            Obstacle::Zone(z) => {
                let mut min = Vec2::splat(f32::MAX);
                let mut max = Vec2::splat(f32::MIN);
                for &p in &z.points {
                    min = min.min(p);
                    max = max.max(p);
                }
                Rect::new(min, max)
            }
        }
    }

    /// Whether the rectangle's interior collides with this obstacle.
    /// Touching within `eps` is not a collision.
    pub fn blocks_rect(&self, rect: &Rect, eps: f32) -> bool {
        match self {
            Obstacle::Wall(w) => {
                rect.distance_to_segment(w.start, w.end) < w.thickness * 0.5 - eps
            }
            Obstacle::Zone(z) => polygon_overlaps_rect(&z.points, rect, eps),
        }
    }

    /// Minimum Euclidean distance from the rectangle to the obstacle
    /// surface (zero when colliding).
    pub fn clearance(&self, rect: &Rect) -> f32 {
        match self {
            Obstacle::Wall(w) => {
                (rect.distance_to_segment(w.start, w.end) - w.thickness * 0.5).max(0.0)
            }
            Obstacle::Zone(z) => polygon_rect_distance(&z.points, rect),
        }
    }

    /// Minimum distance from a bare segment to the obstacle surface.
    pub fn segment_clearance(&self, a: Vec2, b: Vec2) -> f32 {
        match self {
            Obstacle::Wall(w) => {
                (crate::geometry::segment_segment_distance(a, b, w.start, w.end)
                    - w.thickness * 0.5)
                    .max(0.0)
            }
            Obstacle::Zone(z) => polygon_segment_distance(&z.points, a, b),
        }
    }

    pub fn kind(&self) -> Option<ZoneKind> {
        match self {
            Obstacle::Wall(_) => None,
            Obstacle::Zone(z) => Some(z.kind),
        }
    }
}

/// Uniform grid over the static obstacle set.
///
/// Cell size should be on the order of the smallest target box
/// dimension; build cost is O(n), queries touch only the obstacles
/// bucketed under the cells the query rectangle covers.
#[derive(Debug, Default)]
pub struct ObstacleIndex {
    obstacles: Vec<Obstacle>,
    cell_size: f32,
    cells: HashMap<(i32, i32), SmallVec<[u32; 4]>>,
}

impl ObstacleIndex {
    pub fn build(obstacles: Vec<Obstacle>, cell_size: f32) -> Self {
        let cell_size = cell_size.max(0.25);
        let mut cells: HashMap<(i32, i32), SmallVec<[u32; 4]>> = HashMap::new();

        for (id, obstacle) in obstacles.iter().enumerate() {
            let aabb = obstacle.aabb();
            let (min_cx, min_cy) = to_cell(aabb.min, cell_size);
            let (max_cx, max_cy) = to_cell(aabb.max, cell_size);
            for cx in min_cx..=max_cx {
                for cy in min_cy..=max_cy {
                    cells.entry((cx, cy)).or_default().push(id as u32);
                }
            }
        }

        Self {
            obstacles,
            cell_size,
            cells,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Unique obstacle ids whose cells overlap the query rectangle,
    /// in ascending order for deterministic iteration.
    fn candidates(&self, rect: &Rect) -> SmallVec<[u32; 8]> {
        let mut found: SmallVec<[u32; 8]> = SmallVec::new();
        let (min_cx, min_cy) = to_cell(rect.min, self.cell_size);
        let (max_cx, max_cy) = to_cell(rect.max, self.cell_size);
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Whether the rectangle is free of every obstacle.
    pub fn rect_is_free(&self, rect: &Rect, eps: f32) -> bool {
        self.candidates(rect)
            .iter()
            .all(|&id| !self.obstacles[id as usize].blocks_rect(rect, eps))
    }

    /// Minimum clearance from the rectangle to any obstacle within
    /// `margin`. Returns `f32::INFINITY` when nothing is that close.
    pub fn clearance(&self, rect: &Rect, margin: f32) -> f32 {
        let probe = rect.inflate(margin.max(0.0) + self.cell_size);
        self.candidates(&probe)
            .iter()
            .map(|&id| self.obstacles[id as usize].clearance(rect))
            .fold(f32::INFINITY, f32::min)
    }

    /// Whether a corridor centerline stays at least `half_width` away
    /// from every obstacle.
    pub fn segment_is_clear(&self, a: Vec2, b: Vec2, half_width: f32) -> bool {
        let probe = Rect::from_segment_stroke(a, b, half_width + self.cell_size);
        self.candidates(&probe).iter().all(|&id| {
            self.obstacles[id as usize].segment_clearance(a, b) + EPSILON >= half_width
        })
    }
}

fn to_cell(pos: Vec2, cell_size: f32) -> (i32, i32) {
    (
        (pos.x / cell_size).floor() as i32,
        (pos.y / cell_size).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> Obstacle {
        Obstacle::Wall(Wall::new(
            Vec2::new(x1, y1),
            Vec2::new(x2, y2),
            0.2,
        ))
    }

    #[test]
    fn grid_finds_nearby_wall() {
        let index = ObstacleIndex::build(vec![wall(0.0, 5.0, 10.0, 5.0)], 1.0);
        let hit = Rect::from_pos_size(Vec2::new(4.0, 4.5), 2.0, 2.0);
        let miss = Rect::from_pos_size(Vec2::new(4.0, 7.0), 2.0, 2.0);
        assert!(!index.rect_is_free(&hit, EPSILON));
        assert!(index.rect_is_free(&miss, EPSILON));
    }

    #[test]
    fn index_matches_brute_force() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut obstacles = Vec::new();
        for _ in 0..40 {
            let x = rng.gen_range(0.0..50.0);
            let y = rng.gen_range(0.0..50.0);
            let dx = rng.gen_range(-5.0..5.0);
            let dy = rng.gen_range(-5.0..5.0);
            obstacles.push(wall(x, y, x + dx, y + dy));
        }
        let index = ObstacleIndex::build(obstacles.clone(), 2.0);

        for _ in 0..200 {
            let pos = Vec2::new(rng.gen_range(0.0..48.0), rng.gen_range(0.0..48.0));
            let rect = Rect::from_pos_size(pos, 2.0, 2.5);
            let brute = obstacles.iter().all(|o| !o.blocks_rect(&rect, EPSILON));
            assert_eq!(index.rect_is_free(&rect, EPSILON), brute);
        }
    }

    #[test]
    fn clearance_measures_gap_to_wall() {
        let index = ObstacleIndex::build(vec![wall(0.0, 0.0, 10.0, 0.0)], 1.0);
        let rect = Rect::from_pos_size(Vec2::new(2.0, 2.0), 2.0, 2.0);
        let clearance = index.clearance(&rect, 5.0);
        // 2.0 gap minus half the 0.2 wall thickness
        assert!((clearance - 1.9).abs() < 1e-4);
    }

    #[test]
    fn clearance_is_infinite_without_obstacles() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let rect = Rect::from_pos_size(Vec2::ZERO, 1.0, 1.0);
        assert_eq!(index.clearance(&rect, 3.0), f32::INFINITY);
    }

    #[test]
    fn zone_blocks_rect_but_not_edge_touch() {
        let zone = Obstacle::Zone(Zone::new(
            vec![
                Vec2::new(4.0, 4.0),
                Vec2::new(8.0, 4.0),
                Vec2::new(8.0, 8.0),
                Vec2::new(4.0, 8.0),
            ],
            ZoneKind::NoEntry,
        ));
        let index = ObstacleIndex::build(vec![zone], 2.0);
        let overlapping = Rect::from_pos_size(Vec2::new(7.0, 7.0), 2.0, 2.0);
        let touching = Rect::from_pos_size(Vec2::new(8.0, 4.0), 2.0, 2.0);
        assert!(!index.rect_is_free(&overlapping, EPSILON));
        assert!(index.rect_is_free(&touching, EPSILON));
    }

    #[test]
    fn segment_clear_respects_half_width() {
        let index = ObstacleIndex::build(vec![wall(5.0, 0.0, 5.0, 10.0)], 1.0);
        // Runs parallel at distance 2.0 from the wall centerline
        let a = Vec2::new(3.0, 0.0);
        let b = Vec2::new(3.0, 10.0);
        assert!(index.segment_is_clear(a, b, 1.0));
        assert!(!index.segment_is_clear(a, b, 2.5));
    }
}
