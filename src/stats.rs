//! Layout scoring and summary statistics.
//!
//! Pure functions over the finished placement and corridor set; nothing
//! here feeds back into the search.

use serde::{Deserialize, Serialize};

use crate::corridors::Corridor;
use crate::placement::genome::SizeTier;
use crate::placement::Ilot;

/// Relative weights for the two terms of the efficiency score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight on placeable-area utilization.
    pub utilization: f32,
    /// Weight on corridor economy (less corridor area scores higher).
    pub corridor: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            utilization: 0.6,
            corridor: 0.4,
        }
    }
}

/// Per-tier box counts and area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub tier: SizeTier,
    pub count: usize,
    pub area: f32,
}

/// Summary of a finished layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_ilots: usize,
    pub total_corridors: usize,
    /// Summed box area, m^2.
    pub ilot_area: f32,
    /// Summed corridor area, m^2.
    pub corridor_area: f32,
    /// Outline area minus restricted zones, m^2.
    pub placeable_area: f32,
    /// Box area as a percentage of placeable area, 0..=100.
    pub utilization_rate: f32,
    /// Weighted blend of utilization and corridor economy, 0..=100.
    pub efficiency_score: f32,
    pub category_breakdown: Vec<CategoryStats>,
}

/// Compute the summary for a finished layout. With no placeable area
/// every rate is zero.
pub fn compute(
    ilots: &[Ilot],
    corridors: &[Corridor],
    placeable_area: f32,
    weights: &ScoreWeights,
) -> Statistics {
    let ilot_area: f32 = ilots.iter().map(Ilot::area).sum();
    let corridor_area: f32 = corridors.iter().map(|c| c.area).sum();

    let (utilization_rate, efficiency_score) = if placeable_area > 0.0 {
        let utilization = (ilot_area / placeable_area * 100.0).clamp(0.0, 100.0);
        let economy = ((1.0 - corridor_area / placeable_area) * 100.0).clamp(0.0, 100.0);
        let total = weights.utilization + weights.corridor;
        let efficiency = if total > 0.0 {
            ((weights.utilization * utilization + weights.corridor * economy) / total)
                .clamp(0.0, 100.0)
        } else {
            0.0
        };
        (utilization, efficiency)
    } else {
        (0.0, 0.0)
    };

    let category_breakdown = SizeTier::ALL
        .iter()
        .filter_map(|&tier| {
            let members: Vec<&Ilot> = ilots.iter().filter(|i| i.tier == tier).collect();
            if members.is_empty() {
                return None;
            }
            Some(CategoryStats {
                tier,
                count: members.len(),
                area: members.iter().map(|i| i.area()).sum(),
            })
        })
        .collect();

    Statistics {
        total_ilots: ilots.len(),
        total_corridors: corridors.len(),
        ilot_area,
        corridor_area,
        placeable_area,
        utilization_rate,
        efficiency_score,
        category_breakdown,
    }
}
