//! Candidate encoding for the placement search.
//!
//! A candidate is an ordered, fixed-length list of genes; each gene is a
//! lower-left position plus a size drawn from its tier's range. Tier
//! layout is decided once per run from the requested mix, so crossover
//! can splice two gene lists without re-aligning tiers.

use glam::Vec2;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Size-tier label for a placed box. Default dimensions follow the
/// classic small 2.0x2.5 / medium 3.0x4.0 / large 4.0x5.0 split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    pub const ALL: [SizeTier; 3] = [SizeTier::Small, SizeTier::Medium, SizeTier::Large];

    /// Nominal width/height for the tier.
    pub fn default_dims(self) -> (f32, f32) {
        match self {
            SizeTier::Small => (2.0, 2.5),
            SizeTier::Medium => (3.0, 4.0),
            SizeTier::Large => (4.0, 5.0),
        }
    }

    /// Bucket an arbitrary footprint into the nearest tier.
    pub fn classify(area: f32) -> Self {
        if area < 8.0 {
            SizeTier::Small
        } else if area < 16.0 {
            SizeTier::Medium
        } else {
            SizeTier::Large
        }
    }
}

/// One tier of a mixed box specification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub tier: SizeTier,
    /// Fraction of the box count drawn from this tier.
    pub ratio: f32,
    /// (min, max) width range in meters.
    pub width: (f32, f32),
    /// (min, max) height range in meters.
    pub height: (f32, f32),
}

impl TierSpec {
    pub fn around_default(tier: SizeTier, ratio: f32) -> Self {
        let (w, h) = tier.default_dims();
        Self {
            tier,
            ratio,
            width: (w * 0.8, w * 1.2),
            height: (h * 0.8, h * 1.2),
        }
    }

    fn mean_area(&self) -> f32 {
        let w = (self.width.0 + self.width.1) * 0.5;
        let h = (self.height.0 + self.height.1) * 0.5;
        w * h
    }

    fn min_area(&self) -> f32 {
        self.width.0 * self.height.0
    }
}

/// Named density profile, mapping to a tier mix. Sparser floors favor
/// small boxes; denser floors shift the mix toward large ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityProfile {
    Sparse,
    Normal,
    Dense,
    VeryDense,
}

impl DensityProfile {
    /// (small, medium, large) count fractions for this profile.
    pub fn tier_ratios(self) -> (f32, f32, f32) {
        match self {
            DensityProfile::Sparse => (0.6, 0.3, 0.1),
            DensityProfile::Normal => (0.4, 0.5, 0.1),
            DensityProfile::Dense => (0.3, 0.5, 0.2),
            DensityProfile::VeryDense => (0.2, 0.5, 0.3),
        }
    }
}

/// What the optimizer should place: a single fixed footprint or a
/// tiered size distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoxSpec {
    Fixed { width: f32, height: f32 },
    Tiered(Vec<TierSpec>),
}

impl BoxSpec {
    /// The `Normal` profile mix: 40% small, 50% medium, 10% large.
    pub fn default_mix() -> Self {
        Self::mix_for(DensityProfile::Normal)
    }

    /// Tiered mix for a named density profile.
    pub fn mix_for(profile: DensityProfile) -> Self {
        let (small, medium, large) = profile.tier_ratios();
        BoxSpec::Tiered(vec![
            TierSpec::around_default(SizeTier::Small, small),
            TierSpec::around_default(SizeTier::Medium, medium),
            TierSpec::around_default(SizeTier::Large, large),
        ])
    }

    /// Mean box area, weighted by tier ratios. Drives the target count.
    pub fn mean_area(&self) -> f32 {
        match self {
            BoxSpec::Fixed { width, height } => width * height,
            BoxSpec::Tiered(tiers) => {
                let total: f32 = tiers.iter().map(|t| t.ratio).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                tiers.iter().map(|t| t.ratio * t.mean_area()).sum::<f32>() / total
            }
        }
    }

    /// Smallest box footprint this spec can produce.
    pub fn min_area(&self) -> f32 {
        match self {
            BoxSpec::Fixed { width, height } => width * height,
            BoxSpec::Tiered(tiers) => tiers
                .iter()
                .map(TierSpec::min_area)
                .fold(f32::MAX, f32::min),
        }
    }

    /// Smallest single dimension, used to size the obstacle grid cells.
    pub fn min_dimension(&self) -> f32 {
        match self {
            BoxSpec::Fixed { width, height } => width.min(*height),
            BoxSpec::Tiered(tiers) => tiers
                .iter()
                .map(|t| t.width.0.min(t.height.0))
                .fold(f32::MAX, f32::min),
        }
    }

    /// The tier sequence for an `n`-gene candidate, counts apportioned
    /// by ratio with remainders going to the largest fractional parts.
    pub fn tier_layout(&self, n: usize) -> Vec<SizeTier> {
        match self {
            BoxSpec::Fixed { width, height } => {
                vec![SizeTier::classify(width * height); n]
            }
            BoxSpec::Tiered(tiers) => {
                let total: f32 = tiers.iter().map(|t| t.ratio).sum();
                let mut counts: Vec<usize> = Vec::with_capacity(tiers.len());
                let mut fractions: Vec<(usize, f32)> = Vec::with_capacity(tiers.len());
                let mut assigned = 0usize;
                for (i, t) in tiers.iter().enumerate() {
                    let exact = n as f32 * t.ratio / total;
                    let floor = exact.floor() as usize;
                    counts.push(floor);
                    fractions.push((i, exact - floor as f32));
                    assigned += floor;
                }
                // Largest remainder first; ties by tier order
                fractions.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.0.cmp(&b.0))
                });
                for &(i, _) in fractions.iter().take(n - assigned) {
                    counts[i] += 1;
                }

                let mut layout = Vec::with_capacity(n);
                for (t, &count) in tiers.iter().zip(&counts) {
                    layout.extend(std::iter::repeat(t.tier).take(count));
                }
                layout
            }
        }
    }

    fn sample_dims(&self, tier: SizeTier, rng: &mut StdRng) -> (f32, f32) {
        match self {
            BoxSpec::Fixed { width, height } => (*width, *height),
            BoxSpec::Tiered(tiers) => match tiers.iter().find(|t| t.tier == tier) {
                Some(spec) => (
                    sample_range(rng, spec.width.0, spec.width.1),
                    sample_range(rng, spec.height.0, spec.height.1),
                ),
                None => tier.default_dims(),
            },
        }
    }
}

/// One box assignment inside a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gene {
    pub pos: Vec2,
    pub tier: SizeTier,
    pub width: f32,
    pub height: f32,
}

impl Gene {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// An ordered sequence of box assignments.
pub type Candidate = Vec<Gene>;

/// Draw a fresh random candidate within `bounds`.
pub fn random_candidate(
    spec: &BoxSpec,
    layout: &[SizeTier],
    bounds: &Rect,
    rng: &mut StdRng,
) -> Candidate {
    layout
        .iter()
        .map(|&tier| {
            let (width, height) = spec.sample_dims(tier, rng);
            Gene {
                pos: sample_pos(bounds, width, height, rng),
                tier,
                width,
                height,
            }
        })
        .collect()
}

/// One-point splice of two aligned gene lists.
pub fn crossover(a: &Candidate, b: &Candidate, rng: &mut StdRng) -> Candidate {
    debug_assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return a.clone();
    }
    let cut = rng.gen_range(1..a.len());
    let mut child = Vec::with_capacity(a.len());
    child.extend_from_slice(&a[..cut]);
    child.extend_from_slice(&b[cut..]);
    child
}

/// Perturb a subset of genes by a bounded delta; occasionally resample
/// the size within the tier's range.
pub fn mutate(
    candidate: &mut Candidate,
    spec: &BoxSpec,
    bounds: &Rect,
    mutation_rate: f32,
    rng: &mut StdRng,
) {
    let step = 0.1 * bounds.width().max(bounds.height()).max(1.0);
    for gene in candidate.iter_mut() {
        if rng.gen::<f32>() >= mutation_rate {
            continue;
        }
        if rng.gen::<f32>() < 0.3 {
            let (w, h) = spec.sample_dims(gene.tier, rng);
            gene.width = w;
            gene.height = h;
        }
        let dx = rng.gen_range(-step..=step);
        let dy = rng.gen_range(-step..=step);
        gene.pos = clamp_pos(bounds, gene.pos + Vec2::new(dx, dy), gene.width, gene.height);
    }
}

fn sample_range(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

fn sample_pos(bounds: &Rect, width: f32, height: f32, rng: &mut StdRng) -> Vec2 {
    Vec2::new(
        sample_range(rng, bounds.min.x, (bounds.max.x - width).max(bounds.min.x)),
        sample_range(rng, bounds.min.y, (bounds.max.y - height).max(bounds.min.y)),
    )
}

fn clamp_pos(bounds: &Rect, pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x
            .clamp(bounds.min.x, (bounds.max.x - width).max(bounds.min.x)),
        pos.y
            .clamp(bounds.min.y, (bounds.max.y - height).max(bounds.min.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn tier_layout_apportions_by_ratio() {
        let spec = BoxSpec::default_mix();
        let layout = spec.tier_layout(10);
        let small = layout.iter().filter(|t| **t == SizeTier::Small).count();
        let medium = layout.iter().filter(|t| **t == SizeTier::Medium).count();
        let large = layout.iter().filter(|t| **t == SizeTier::Large).count();
        assert_eq!((small, medium, large), (4, 5, 1));
    }

    #[test]
    fn profiles_apportion_their_own_mixes() {
        let counts = |profile: DensityProfile| {
            let layout = BoxSpec::mix_for(profile).tier_layout(10);
            (
                layout.iter().filter(|t| **t == SizeTier::Small).count(),
                layout.iter().filter(|t| **t == SizeTier::Medium).count(),
                layout.iter().filter(|t| **t == SizeTier::Large).count(),
            )
        };
        assert_eq!(counts(DensityProfile::Sparse), (6, 3, 1));
        assert_eq!(counts(DensityProfile::Normal), (4, 5, 1));
        assert_eq!(counts(DensityProfile::Dense), (3, 5, 2));
        assert_eq!(counts(DensityProfile::VeryDense), (2, 5, 3));
    }

    #[test]
    fn fixed_spec_uses_one_tier() {
        let spec = BoxSpec::Fixed {
            width: 3.0,
            height: 4.0,
        };
        assert_eq!(spec.tier_layout(3), vec![SizeTier::Medium; 3]);
        assert_eq!(spec.mean_area(), 12.0);
    }

    #[test]
    fn random_candidates_stay_in_bounds() {
        let spec = BoxSpec::default_mix();
        let bounds = Rect::from_pos_size(Vec2::ZERO, 20.0, 15.0);
        let layout = spec.tier_layout(12);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let candidate = random_candidate(&spec, &layout, &bounds, &mut rng);
            for gene in &candidate {
                let r = gene.rect();
                assert!(r.min.x >= -1e-4 && r.min.y >= -1e-4);
                assert!(r.max.x <= 20.0 + 1e-4 && r.max.y <= 15.0 + 1e-4);
            }
        }
    }

    #[test]
    fn crossover_preserves_tier_alignment() {
        let spec = BoxSpec::default_mix();
        let bounds = Rect::from_pos_size(Vec2::ZERO, 20.0, 15.0);
        let layout = spec.tier_layout(8);
        let mut rng = StdRng::seed_from_u64(11);
        let a = random_candidate(&spec, &layout, &bounds, &mut rng);
        let b = random_candidate(&spec, &layout, &bounds, &mut rng);
        let child = crossover(&a, &b, &mut rng);
        for (gene, tier) in child.iter().zip(&layout) {
            assert_eq!(gene.tier, *tier);
        }
    }
}
