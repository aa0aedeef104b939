//! Soft-constraint fitness evaluation.
//!
//! Infeasible candidates are penalized rather than discarded so the
//! search can walk through locally infeasible regions. The breakdown is
//! kept as tagged terms and only collapsed to a scalar for ranking.

use crate::geometry::{rect_in_polygon, EPSILON};
use crate::obstacles::ObstacleIndex;
use glam::Vec2;

use super::genome::Candidate;

/// Penalty weights for collapsing a breakdown into a scalar score.
/// Violation terms outweigh coverage so a feasible candidate always
/// beats an infeasible one of similar coverage.
const OVERLAP_WEIGHT: f32 = 3.0;
const COLLISION_WEIGHT: f32 = 3.0;
const CLEARANCE_WEIGHT: f32 = 1.0;

/// Tagged evaluation result for one candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FitnessBreakdown {
    /// Summed area of boxes lying inside the outline, m^2.
    pub covered_area: f32,
    /// Summed pairwise box-overlap area, m^2.
    pub overlap_penalty: f32,
    /// Summed area of boxes colliding with obstacles or spilling
    /// outside the outline, m^2.
    pub collision_penalty: f32,
    /// Clearance deficit integrated over box perimeters.
    pub clearance_penalty: f32,
}

impl FitnessBreakdown {
    pub fn score(&self) -> f32 {
        self.covered_area
            - OVERLAP_WEIGHT * self.overlap_penalty
            - COLLISION_WEIGHT * self.collision_penalty
            - CLEARANCE_WEIGHT * self.clearance_penalty
    }

    /// Zero-violation candidates are feasible.
    pub fn is_feasible(&self) -> bool {
        self.overlap_penalty <= EPSILON
            && self.collision_penalty <= EPSILON
            && self.clearance_penalty <= EPSILON
    }
}

/// Per-gene validity, computed once per evaluation and reused when a
/// partial placement has to be extracted from an infeasible candidate.
pub fn gene_is_valid(
    gene_rect: &crate::geometry::Rect,
    outline: &[Vec2],
    index: &ObstacleIndex,
    min_clearance: f32,
) -> bool {
    rect_in_polygon(gene_rect, outline)
        && index.rect_is_free(gene_rect, EPSILON)
        && index.clearance(gene_rect, min_clearance) + EPSILON >= min_clearance
}

/// Evaluate one candidate against the outline and obstacle index.
///
/// Pairwise overlap uses an x-sorted sweep: boxes are compared only
/// while their x-extents overlap, an O(n log n) pass instead of the
/// naive O(n^2) grid.
pub fn evaluate(
    candidate: &Candidate,
    outline: &[Vec2],
    index: &ObstacleIndex,
    min_clearance: f32,
) -> FitnessBreakdown {
    let mut breakdown = FitnessBreakdown::default();

    let rects: Vec<crate::geometry::Rect> = candidate.iter().map(|g| g.rect()).collect();

    for (gene, rect) in candidate.iter().zip(&rects) {
        if !rect_in_polygon(rect, outline) {
            breakdown.collision_penalty += gene.area();
            continue;
        }
        if !index.rect_is_free(rect, EPSILON) {
            breakdown.collision_penalty += gene.area();
            continue;
        }
        breakdown.covered_area += gene.area();

        let clearance = index.clearance(rect, min_clearance);
        if clearance + EPSILON < min_clearance {
            breakdown.clearance_penalty += (min_clearance - clearance) * rect.perimeter();
        }
    }

    // Sweep over x: sort by min.x, compare each box against the sorted
    // successors until their x-extents no longer reach it.
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&a, &b| {
        rects[a]
            .min
            .x
            .partial_cmp(&rects[b].min.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    for (i, &a) in order.iter().enumerate() {
        for &b in order.iter().skip(i + 1) {
            if rects[b].min.x + EPSILON >= rects[a].max.x {
                break;
            }
            if rects[a].overlaps(&rects[b], EPSILON) {
                breakdown.overlap_penalty += rects[a].overlap_area(&rects[b]);
            }
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::{Obstacle, Wall};
    use crate::placement::genome::{Gene, SizeTier};
    use glam::Vec2;

    fn outline_10x10() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    fn gene(x: f32, y: f32, w: f32, h: f32) -> Gene {
        Gene {
            pos: Vec2::new(x, y),
            tier: SizeTier::classify(w * h),
            width: w,
            height: h,
        }
    }

    #[test]
    fn disjoint_boxes_are_feasible() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let candidate = vec![gene(0.5, 0.5, 3.0, 4.0), gene(5.0, 5.0, 3.0, 4.0)];
        let fit = evaluate(&candidate, &outline_10x10(), &index, 0.0);
        assert!(fit.is_feasible());
        assert!((fit.covered_area - 24.0).abs() < 1e-4);
    }

    #[test]
    fn overlap_is_penalized_by_area() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let candidate = vec![gene(0.0, 0.0, 4.0, 4.0), gene(2.0, 0.0, 4.0, 4.0)];
        let fit = evaluate(&candidate, &outline_10x10(), &index, 0.0);
        assert!(!fit.is_feasible());
        assert!((fit.overlap_penalty - 8.0).abs() < 1e-4);
    }

    #[test]
    fn edge_touching_boxes_are_feasible() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let candidate = vec![gene(0.0, 0.0, 4.0, 4.0), gene(4.0, 0.0, 4.0, 4.0)];
        let fit = evaluate(&candidate, &outline_10x10(), &index, 0.0);
        assert!(fit.is_feasible());
        assert_eq!(fit.overlap_penalty, 0.0);
    }

    #[test]
    fn out_of_outline_is_a_collision() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let candidate = vec![gene(8.0, 8.0, 4.0, 4.0)];
        let fit = evaluate(&candidate, &outline_10x10(), &index, 0.0);
        assert!((fit.collision_penalty - 16.0).abs() < 1e-4);
        assert_eq!(fit.covered_area, 0.0);
    }

    #[test]
    fn wall_proximity_violates_clearance() {
        let wall = Obstacle::Wall(Wall::new(
            Vec2::new(0.0, 5.0),
            Vec2::new(10.0, 5.0),
            0.2,
        ));
        let index = ObstacleIndex::build(vec![wall], 1.0);
        // 0.15m gap to the wall face, below the 0.5m minimum
        let candidate = vec![gene(1.0, 5.25, 3.0, 3.0)];
        let fit = evaluate(&candidate, &outline_10x10(), &index, 0.5);
        assert!(fit.clearance_penalty > 0.0);
        assert!(!fit.is_feasible());
    }

    #[test]
    fn feasible_scores_above_infeasible_with_equal_coverage() {
        let index = ObstacleIndex::build(Vec::new(), 1.0);
        let feasible = vec![gene(0.0, 0.0, 4.0, 4.0), gene(4.5, 0.0, 4.0, 4.0)];
        let overlapping = vec![gene(0.0, 0.0, 4.0, 4.0), gene(1.0, 0.0, 4.0, 4.0)];
        let a = evaluate(&feasible, &outline_10x10(), &index, 0.0);
        let b = evaluate(&overlapping, &outline_10x10(), &index, 0.0);
        assert!(a.score() > b.score());
    }
}
