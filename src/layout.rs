//! Plan model, validation, and the end-to-end optimization entry point.

use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::corridors::{self, Corridor};
use crate::error::LayoutError;
use crate::geometry::{polygon_area, segments_intersect, EPSILON};
use crate::obstacles::{Obstacle, ObstacleIndex, Wall, Zone};
use crate::placement::genome::{BoxSpec, TierSpec};
use crate::placement::{self, Ilot, OptimizerConfig};
use crate::stats::{self, Statistics};

/// Input floor plan: outer outline plus static obstacles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanGeometry {
    /// Outer boundary, implicitly closed. Zones are assumed to lie
    /// inside it.
    pub outline: Vec<Vec2>,
    pub walls: Vec<Wall>,
    pub zones: Vec<Zone>,
}

impl PlanGeometry {
    pub fn new(outline: Vec<Vec2>) -> Self {
        Self {
            outline,
            walls: Vec::new(),
            zones: Vec::new(),
        }
    }

    /// Bounding box of the outline, for downstream scaling.
    pub fn bounds(&self) -> crate::geometry::Rect {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for &v in &self.outline {
            min = min.min(v);
            max = max.max(v);
        }
        crate::geometry::Rect::new(min, max)
    }

    /// Outline area minus restricted-zone area, floored at zero.
    pub fn placeable_area(&self) -> f32 {
        let outline = polygon_area(&self.outline).abs();
        let zones: f32 = self
            .zones
            .iter()
            .map(|z| polygon_area(&z.points).abs())
            .sum();
        (outline - zones).max(0.0)
    }
}

/// Degraded-outcome markers on an otherwise valid result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutFlag {
    /// The placeable area cannot fit a single box from the spec.
    NoCapacity,
    /// Fewer boxes than the density target asked for.
    Partial { achieved_density: f32 },
    /// Boxes the corridor router could not reach from the main group.
    Unconnected { ilot_ids: Vec<u32> },
    /// The run stopped on its cancel token or time budget.
    Cancelled,
}

/// A finished layout: placed boxes, routed corridors, summary, flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub ilots: Vec<Ilot>,
    pub corridors: Vec<Corridor>,
    pub statistics: Statistics,
    pub flags: Vec<LayoutFlag>,
    pub generations: u32,
}

/// Run the full pipeline: validate, index obstacles, search placements,
/// route corridors, score.
///
/// Identical inputs and seed produce an identical result.
pub fn optimize_layout(
    plan: &PlanGeometry,
    spec: &BoxSpec,
    density: f32,
    config: &OptimizerConfig,
) -> Result<LayoutResult, LayoutError> {
    let outline = validated_outline(plan)?;
    validate_obstacles(plan)?;
    validate_spec(spec, density)?;

    let placeable_area = plan.placeable_area();
    info!(
        "optimizing layout: {:.1} m2 placeable, density target {:.0}%, seed {}",
        placeable_area,
        density * 100.0,
        config.seed
    );

    let obstacles: Vec<Obstacle> = plan
        .walls
        .iter()
        .map(|&w| Obstacle::Wall(w))
        .chain(plan.zones.iter().cloned().map(Obstacle::Zone))
        .collect();
    let index = ObstacleIndex::build(obstacles, spec.min_dimension());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let placement = placement::optimize(
        &outline,
        placeable_area,
        &index,
        spec,
        density,
        config,
        &mut rng,
    );
    debug!(
        "placement finished after {} generations: {} boxes, {:.1} of {:.1} m2",
        placement.generations,
        placement.ilots.len(),
        placement.achieved_area,
        placement.target_area
    );

    let mut flags = Vec::new();
    if placement.no_capacity {
        flags.push(LayoutFlag::NoCapacity);
    }
    if placement.partial {
        let achieved_density = if placeable_area > 0.0 {
            placement.achieved_area / placeable_area
        } else {
            0.0
        };
        flags.push(LayoutFlag::Partial { achieved_density });
    }

    let routed = corridors::route(&placement.ilots, &index, config.corridor_width);
    if !routed.unconnected.is_empty() {
        flags.push(LayoutFlag::Unconnected {
            ilot_ids: routed.unconnected.clone(),
        });
    }
    if placement.cancelled {
        flags.push(LayoutFlag::Cancelled);
    }

    let statistics = stats::compute(
        &placement.ilots,
        &routed.corridors,
        placeable_area,
        &config.score_weights,
    );
    info!(
        "layout done: {} boxes, {} corridors, {:.1}% utilization",
        statistics.total_ilots, statistics.total_corridors, statistics.utilization_rate
    );

    Ok(LayoutResult {
        ilots: placement.ilots,
        corridors: routed.corridors,
        statistics,
        flags,
        generations: placement.generations,
    })
}

/// Outline with a duplicated closing vertex dropped, checked for
/// degeneracy and self-intersection.
fn validated_outline(plan: &PlanGeometry) -> Result<Vec<Vec2>, LayoutError> {
    let mut outline = plan.outline.clone();
    if outline.len() >= 2 {
        let first = outline[0];
        let last = outline[outline.len() - 1];
        if first.distance(last) <= EPSILON {
            outline.pop();
        }
    }
    if outline.len() < 3 {
        return Err(LayoutError::geometry(format!(
            "outline has {} distinct points, need at least 3",
            outline.len()
        )));
    }
    if outline.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
        return Err(LayoutError::geometry("outline has non-finite coordinates"));
    }
    if polygon_area(&outline).abs() <= EPSILON {
        // Degenerate but well-formed; downstream reports NoCapacity.
        // Collinear edges would trip the crossing check below.
        return Ok(outline);
    }

    // Non-adjacent edge pairs must not cross
    let n = outline.len();
    for i in 0..n {
        let (a1, a2) = (outline[i], outline[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (outline[j], outline[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return Err(LayoutError::geometry(format!(
                    "outline self-intersects between edges {} and {}",
                    i, j
                )));
            }
        }
    }
    Ok(outline)
}

fn validate_obstacles(plan: &PlanGeometry) -> Result<(), LayoutError> {
    for (i, wall) in plan.walls.iter().enumerate() {
        let finite = wall.start.x.is_finite()
            && wall.start.y.is_finite()
            && wall.end.x.is_finite()
            && wall.end.y.is_finite()
            && wall.thickness.is_finite();
        if !finite {
            return Err(LayoutError::geometry(format!(
                "wall {} has non-finite coordinates",
                i
            )));
        }
        if wall.thickness <= 0.0 {
            return Err(LayoutError::geometry(format!(
                "wall {} has non-positive thickness {}",
                i, wall.thickness
            )));
        }
    }
    for (i, zone) in plan.zones.iter().enumerate() {
        if zone.points.len() < 3 {
            return Err(LayoutError::geometry(format!(
                "zone {} has {} points, need at least 3",
                i,
                zone.points.len()
            )));
        }
        if zone
            .points
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(LayoutError::geometry(format!(
                "zone {} has non-finite coordinates",
                i
            )));
        }
    }
    Ok(())
}

fn validate_spec(spec: &BoxSpec, density: f32) -> Result<(), LayoutError> {
    if !(density > 0.0 && density <= 1.0) {
        return Err(LayoutError::spec(format!(
            "density {} outside (0, 1]",
            density
        )));
    }
    match spec {
        BoxSpec::Fixed { width, height } => {
            if *width <= 0.0 || *height <= 0.0 {
                return Err(LayoutError::spec(format!(
                    "fixed box {}x{} has non-positive dimensions",
                    width, height
                )));
            }
        }
        BoxSpec::Tiered(tiers) => {
            if tiers.is_empty() {
                return Err(LayoutError::spec("tiered spec has no tiers"));
            }
            let total: f32 = tiers.iter().map(|t| t.ratio).sum();
            if total <= 0.0 {
                return Err(LayoutError::spec("tier ratios sum to zero"));
            }
            for tier in tiers {
                validate_tier(tier)?;
            }
        }
    }
    Ok(())
}

fn validate_tier(tier: &TierSpec) -> Result<(), LayoutError> {
    if tier.ratio < 0.0 {
        return Err(LayoutError::spec(format!(
            "{:?} tier has negative ratio",
            tier.tier
        )));
    }
    let ranges_ok = tier.width.0 > 0.0
        && tier.width.1 >= tier.width.0
        && tier.height.0 > 0.0
        && tier.height.1 >= tier.height.0;
    if !ranges_ok {
        return Err(LayoutError::spec(format!(
            "{:?} tier has an empty or non-positive size range",
            tier.tier
        )));
    }
    Ok(())
}
