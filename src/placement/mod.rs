//! Population-based placement search.
//!
//! A genetic-algorithm loop over fixed-length gene lists: seeded random
//! init, parallel fitness evaluation, elitist selection, one-point
//! crossover, bounded mutation. Soft penalties keep infeasible
//! candidates in play; the best feasible candidate seen is always the
//! one returned.

pub mod fitness;
pub mod genome;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::debug;
use rand::{rngs::StdRng, Rng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, EPSILON};
use crate::obstacles::ObstacleIndex;
use crate::stats::ScoreWeights;

use fitness::{evaluate, gene_is_valid, FitnessBreakdown};
use genome::{crossover, mutate, random_candidate, BoxSpec, Candidate, SizeTier};

/// Cooperative cancellation for long optimizations. Checked between
/// generations, never mid-candidate.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tunables for one optimization run.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Required gap between a box and any wall or zone, meters.
    pub min_clearance: f32,
    /// Uniform corridor width handed to the router, meters.
    pub corridor_width: f32,
    pub population: usize,
    pub max_generations: u32,
    /// Stop after this many generations without fitness improvement.
    pub stall_generations: u32,
    pub mutation_rate: f32,
    /// Fraction of the population carried over unchanged each
    /// generation.
    pub elite_fraction: f32,
    /// Seed for the run's random stream; identical inputs and seed
    /// reproduce the layout bit for bit.
    pub seed: u64,
    pub cancel: Option<CancelToken>,
    pub time_budget: Option<Duration>,
    pub score_weights: ScoreWeights,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_clearance: 0.5,
            corridor_width: 1.2,
            population: 60,
            max_generations: 120,
            stall_generations: 15,
            mutation_rate: 0.1,
            elite_fraction: 0.1,
            seed: 42,
            cancel: None,
            time_budget: None,
            score_weights: ScoreWeights::default(),
        }
    }
}

/// A placed box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ilot {
    pub id: u32,
    pub rect: Rect,
    pub tier: SizeTier,
}

impl Ilot {
    pub fn area(&self) -> f32 {
        self.rect.area()
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

/// Outcome of the placement search, before routing and scoring.
#[derive(Clone, Debug)]
pub struct Placement {
    pub ilots: Vec<Ilot>,
    pub fitness: FitnessBreakdown,
    pub generations: u32,
    pub target_area: f32,
    pub achieved_area: f32,
    /// The genome could not be placed in full.
    pub partial: bool,
    /// Placeable area cannot fit a single minimum-size box.
    pub no_capacity: bool,
    pub cancelled: bool,
}

impl Placement {
    fn empty(no_capacity: bool, target_area: f32) -> Self {
        Self {
            ilots: Vec::new(),
            fitness: FitnessBreakdown::default(),
            generations: 0,
            target_area,
            achieved_area: 0.0,
            partial: false,
            no_capacity,
            cancelled: false,
        }
    }
}

/// Run the placement search.
///
/// `density` is the target fraction of placeable area to cover with
/// boxes. The returned placement always satisfies the hard invariants
/// (no overlaps, no obstacle collisions): when even the best candidate
/// carries violations, the violating genes are dropped and the result
/// is marked partial.
pub fn optimize(
    outline: &[Vec2],
    placeable_area: f32,
    index: &ObstacleIndex,
    spec: &BoxSpec,
    density: f32,
    config: &OptimizerConfig,
    rng: &mut StdRng,
) -> Placement {
    let target_area = placeable_area * density;
    let mean_area = spec.mean_area();
    let gene_count = if mean_area > EPSILON {
        (target_area / mean_area).floor() as usize
    } else {
        0
    };

    if placeable_area < spec.min_area() {
        return Placement::empty(true, target_area);
    }
    // A target below one mean box is trivially met with zero boxes;
    // that is not a capacity problem.
    if gene_count == 0 {
        return Placement::empty(false, target_area);
    }

    let bounds = outline_bounds(outline);
    let layout = spec.tier_layout(gene_count);
    let started = Instant::now();

    let mut population: Vec<Candidate> = (0..config.population.max(2))
        .map(|_| random_candidate(spec, &layout, &bounds, rng))
        .collect();

    let mut best: Option<(Candidate, FitnessBreakdown)> = None;
    let mut best_feasible: Option<(Candidate, FitnessBreakdown)> = None;
    let mut stall = 0u32;
    let mut generations = 0u32;
    let mut cancelled = false;

    loop {
        // Candidates are independent within a generation; evaluation is
        // the parallel section, breeding stays sequential on the seeded
        // stream.
        let scores: Vec<FitnessBreakdown> = population
            .par_iter()
            .map(|candidate| evaluate(candidate, outline, index, config.min_clearance))
            .collect();

        let ranked = rank(&scores);
        let leader = ranked[0];

        let improved = match &best {
            Some((_, b)) => scores[leader].score() > b.score() + EPSILON,
            None => true,
        };
        if improved {
            best = Some((population[leader].clone(), scores[leader]));
            stall = 0;
        } else {
            stall += 1;
        }
        if scores[leader].is_feasible() {
            let replace = match &best_feasible {
                Some((_, b)) => scores[leader].score() > b.score() + EPSILON,
                None => true,
            };
            if replace {
                best_feasible = Some((population[leader].clone(), scores[leader]));
            }
        }

        generations += 1;
        if generations % 10 == 0 {
            debug!(
                "generation {}: best score {:.2}, covered {:.1} m2",
                generations,
                scores[leader].score(),
                scores[leader].covered_area
            );
        }

        // The density target is met by construction once the full
        // genome is feasible.
        if scores[leader].is_feasible() {
            break;
        }
        if generations >= config.max_generations || stall >= config.stall_generations {
            break;
        }
        if config
            .cancel
            .as_ref()
            .map_or(false, CancelToken::is_cancelled)
        {
            cancelled = true;
            break;
        }
        if config
            .time_budget
            .map_or(false, |budget| started.elapsed() >= budget)
        {
            cancelled = true;
            break;
        }

        population = breed(&population, &scores, &ranked, spec, &bounds, config, rng);
    }

    // The loop always evaluates at least one generation
    let (candidate, fitness) = match best_feasible.or(best) {
        Some(found) => found,
        None => return Placement::empty(false, target_area),
    };

    let ilots = extract_ilots(&candidate, outline, index, config.min_clearance);
    let achieved_area: f32 = ilots.iter().map(Ilot::area).sum();
    let partial = ilots.len() < candidate.len();

    Placement {
        ilots,
        fitness,
        generations,
        target_area,
        achieved_area,
        partial,
        no_capacity: false,
        cancelled,
    }
}

/// Indices sorted best-first; ties broken by index for determinism.
fn rank(scores: &[FitnessBreakdown]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .score()
            .partial_cmp(&scores[a].score())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

fn breed(
    population: &[Candidate],
    scores: &[FitnessBreakdown],
    ranked: &[usize],
    spec: &BoxSpec,
    bounds: &Rect,
    config: &OptimizerConfig,
    rng: &mut StdRng,
) -> Vec<Candidate> {
    let elite_count = ((population.len() as f32 * config.elite_fraction).ceil() as usize)
        .clamp(1, population.len());

    let mut next = Vec::with_capacity(population.len());
    for &idx in ranked.iter().take(elite_count) {
        next.push(population[idx].clone());
    }

    while next.len() < population.len() {
        let a = tournament(scores, rng);
        let b = tournament(scores, rng);
        let mut child = crossover(&population[a], &population[b], rng);
        mutate(&mut child, spec, bounds, config.mutation_rate, rng);
        next.push(child);
    }
    next
}

/// Tournament-of-three selection.
fn tournament(scores: &[FitnessBreakdown], rng: &mut StdRng) -> usize {
    let mut winner = rng.gen_range(0..scores.len());
    for _ in 0..2 {
        let challenger = rng.gen_range(0..scores.len());
        if scores[challenger].score() > scores[winner].score() {
            winner = challenger;
        }
    }
    winner
}

/// Keep the valid, mutually disjoint prefix-greedy subset of a
/// candidate's genes and number the survivors.
fn extract_ilots(
    candidate: &Candidate,
    outline: &[Vec2],
    index: &ObstacleIndex,
    min_clearance: f32,
) -> Vec<Ilot> {
    let mut kept: Vec<Ilot> = Vec::with_capacity(candidate.len());
    for gene in candidate {
        let rect = gene.rect();
        if !gene_is_valid(&rect, outline, index, min_clearance) {
            continue;
        }
        if kept.iter().any(|ilot| ilot.rect.overlaps(&rect, EPSILON)) {
            continue;
        }
        kept.push(Ilot {
            id: kept.len() as u32,
            rect,
            tier: gene.tier,
        });
    }
    kept
}

fn outline_bounds(outline: &[Vec2]) -> Rect {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for &v in outline {
        min = min.min(v);
        max = max.max(v);
    }
    Rect::new(min, max)
}
