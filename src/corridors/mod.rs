//! Corridor routing between placed boxes.
//!
//! Box centers become graph nodes; every pair that admits an
//! obstacle-free straight or single-bend connection becomes a candidate
//! edge weighted by centerline length. Kruskal's algorithm then keeps a
//! minimum spanning tree, so the corridor network reaches every
//! reachable box with the least total corridor length. Boxes no
//! candidate edge can reach are reported as unconnected rather than
//! silently dropped.

use glam::Vec2;
use log::warn;
use petgraph::graph::UnGraph;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::EPSILON;
use crate::obstacles::ObstacleIndex;
use crate::placement::Ilot;

/// A routed corridor between two boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: u32,
    /// Ids of the two boxes this corridor joins.
    pub connects: (u32, u32),
    /// Centerline polyline, box center to box center.
    pub path: SmallVec<[Vec2; 8]>,
    pub width: f32,
    pub length: f32,
    pub area: f32,
}

/// Routing result: the spanning corridors plus any boxes the router
/// could not reach from the main group.
#[derive(Clone, Debug, Default)]
pub struct RouteOutcome {
    pub corridors: Vec<Corridor>,
    pub unconnected: Vec<u32>,
}

struct CandidateEdge {
    a: usize,
    b: usize,
    length: f32,
    path: SmallVec<[Vec2; 8]>,
}

/// Route corridors of uniform `width` between the boxes.
pub fn route(ilots: &[Ilot], index: &ObstacleIndex, width: f32) -> RouteOutcome {
    if ilots.len() < 2 {
        return RouteOutcome::default();
    }
    let half = width * 0.5;

    let mut edges: Vec<CandidateEdge> = Vec::new();
    for a in 0..ilots.len() {
        for b in (a + 1)..ilots.len() {
            if let Some(path) = connect(ilots, a, b, index, half) {
                edges.push(CandidateEdge {
                    a,
                    b,
                    length: path_length(&path),
                    path,
                });
            }
        }
    }

    // Shortest edges first; the sort is stable so equal lengths keep
    // pair order and the tree stays deterministic.
    edges.sort_by(|x, y| {
        x.length
            .partial_cmp(&y.length)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut components: UnionFind<usize> = UnionFind::new(ilots.len());
    let mut corridors = Vec::with_capacity(ilots.len().saturating_sub(1));
    for edge in &edges {
        if !components.union(edge.a, edge.b) {
            continue;
        }
        let length = edge.length;
        corridors.push(Corridor {
            id: corridors.len() as u32,
            connects: (ilots[edge.a].id, ilots[edge.b].id),
            path: edge.path.clone(),
            width,
            length,
            area: length * width,
        });
    }

    let unconnected = outside_main_component(ilots, &components);
    if !unconnected.is_empty() {
        warn!(
            "{} of {} boxes unreachable by any corridor",
            unconnected.len(),
            ilots.len()
        );
    }

    RouteOutcome {
        corridors,
        unconnected,
    }
}

/// The corridor network as an undirected graph over box ids, edges
/// weighted by corridor length.
pub fn corridor_graph(ilots: &[Ilot], corridors: &[Corridor]) -> UnGraph<u32, f32> {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<_> = ilots.iter().map(|ilot| graph.add_node(ilot.id)).collect();
    let position = |id: u32| ilots.iter().position(|ilot| ilot.id == id);
    for corridor in corridors {
        if let (Some(a), Some(b)) = (position(corridor.connects.0), position(corridor.connects.1)) {
            graph.add_edge(nodes[a], nodes[b], corridor.length);
        }
    }
    graph
}

/// Try to connect two box centers: straight first, then the two
/// axis-aligned single-bend detours.
fn connect(
    ilots: &[Ilot],
    a: usize,
    b: usize,
    index: &ObstacleIndex,
    half: f32,
) -> Option<SmallVec<[Vec2; 8]>> {
    let ca = ilots[a].center();
    let cb = ilots[b].center();
    if ca.distance(cb) <= EPSILON {
        return None;
    }

    if segment_ok(ilots, a, b, ca, cb, index, half) {
        return Some(SmallVec::from_slice(&[ca, cb]));
    }

    for corner in [Vec2::new(cb.x, ca.y), Vec2::new(ca.x, cb.y)] {
        if corner.distance(ca) <= EPSILON || corner.distance(cb) <= EPSILON {
            continue;
        }
        if segment_ok(ilots, a, b, ca, corner, index, half)
            && segment_ok(ilots, a, b, corner, cb, index, half)
        {
            return Some(SmallVec::from_slice(&[ca, corner, cb]));
        }
    }
    None
}

/// A corridor segment is admissible when its stroke stays clear of every
/// obstacle and of every box other than its own two endpoints.
fn segment_ok(
    ilots: &[Ilot],
    a: usize,
    b: usize,
    from: Vec2,
    to: Vec2,
    index: &ObstacleIndex,
    half: f32,
) -> bool {
    if !index.segment_is_clear(from, to, half) {
        return false;
    }
    ilots
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != a && k != b)
        .all(|(_, other)| other.rect.distance_to_segment(from, to) + EPSILON >= half)
}

fn path_length(path: &[Vec2]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Ids of every box outside the largest connected component. Component
/// size ties go to the component holding the lowest box index.
fn outside_main_component(ilots: &[Ilot], components: &UnionFind<usize>) -> Vec<u32> {
    let mut main_root = 0usize;
    let mut main_size = 0usize;
    for i in 0..ilots.len() {
        let root = components.find(i);
        let size = (0..ilots.len()).filter(|&j| components.find(j) == root).count();
        if size > main_size {
            main_root = root;
            main_size = size;
        }
    }

    let mut outside: Vec<u32> = (0..ilots.len())
        .filter(|&i| components.find(i) != main_root)
        .map(|i| ilots[i].id)
        .collect();
    outside.sort_unstable();
    outside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::obstacles::{Obstacle, Wall};
    use crate::placement::genome::SizeTier;
    use petgraph::algo::connected_components;

    fn ilot(id: u32, x: f32, y: f32) -> Ilot {
        Ilot {
            id,
            rect: Rect::from_pos_size(Vec2::new(x, y), 2.0, 2.0),
            tier: SizeTier::Small,
        }
    }

    #[test]
    fn open_floor_spanning_tree_reaches_every_box() {
        let ilots = vec![
            ilot(0, 0.0, 0.0),
            ilot(1, 10.0, 0.0),
            ilot(2, 0.0, 10.0),
            ilot(3, 10.0, 10.0),
        ];
        let index = ObstacleIndex::build(Vec::new(), 2.0);
        let outcome = route(&ilots, &index, 1.2);

        assert_eq!(outcome.corridors.len(), 3);
        assert!(outcome.unconnected.is_empty());
        let graph = corridor_graph(&ilots, &outcome.corridors);
        assert_eq!(connected_components(&graph), 1);
    }

    #[test]
    fn dividing_wall_leaves_isolated_box_flagged() {
        // Full-height wall at x = 10 splits the floor
        let wall = Obstacle::Wall(Wall::new(
            Vec2::new(10.0, -5.0),
            Vec2::new(10.0, 25.0),
            0.3,
        ));
        let index = ObstacleIndex::build(vec![wall], 2.0);
        let ilots = vec![
            ilot(0, 0.0, 0.0),
            ilot(1, 0.0, 8.0),
            ilot(2, 4.0, 4.0),
            ilot(3, 15.0, 4.0),
        ];
        let outcome = route(&ilots, &index, 1.2);

        assert_eq!(outcome.unconnected, vec![3]);
        assert!(outcome
            .corridors
            .iter()
            .all(|c| c.connects.0 != 3 && c.connects.1 != 3));
    }

    #[test]
    fn blocked_direct_path_takes_one_bend() {
        // Wall blocks the diagonal but stops short of the right side
        let wall = Obstacle::Wall(Wall::new(
            Vec2::new(0.0, 10.0),
            Vec2::new(12.0, 10.0),
            0.3,
        ));
        let index = ObstacleIndex::build(vec![wall], 2.0);
        let ilots = vec![ilot(0, 1.0, 1.0), ilot(1, 17.0, 17.0)];
        let outcome = route(&ilots, &index, 1.2);

        assert_eq!(outcome.corridors.len(), 1);
        let corridor = &outcome.corridors[0];
        assert_eq!(corridor.path.len(), 3);
        // First corner option: over then up, on the unblocked side
        assert_eq!(corridor.path[1], Vec2::new(18.0, 2.0));
        assert!(outcome.unconnected.is_empty());
    }

    #[test]
    fn corridor_area_is_length_times_width() {
        let ilots = vec![ilot(0, 0.0, 0.0), ilot(1, 9.0, 0.0)];
        let index = ObstacleIndex::build(Vec::new(), 2.0);
        let outcome = route(&ilots, &index, 1.5);
        let corridor = &outcome.corridors[0];
        assert!((corridor.length - 9.0).abs() < 1e-4);
        assert!((corridor.area - 13.5).abs() < 1e-3);
    }

    #[test]
    fn single_box_needs_no_corridors() {
        let ilots = vec![ilot(0, 0.0, 0.0)];
        let index = ObstacleIndex::build(Vec::new(), 2.0);
        let outcome = route(&ilots, &index, 1.2);
        assert!(outcome.corridors.is_empty());
        assert!(outcome.unconnected.is_empty());
    }
}
