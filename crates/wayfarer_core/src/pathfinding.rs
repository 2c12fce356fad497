//! A* route search over a [`VoxelWorld`].
//!
//! Nodes live in a per-call arena and point at their parents by handle. The
//! open set is a binary heap keyed on `f = g + h` with `h` and insertion order
//! as tie-breakers, so identical inputs always expand nodes in the same order.
//!
//! Closed cells are never reopened. With the cost model in [`crate::voxel`]
//! the heuristic is consistent and the shortcut costs nothing; with a custom
//! world that breaks consistency the path may be slightly longer than optimal.

use crate::config::PathfindingConfig;
use crate::voxel::VoxelWorld;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use wayfarer_data::{CellCoord, Direction, Genome, SpeciesProfile, VoxelLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeHandle(usize);

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: CellCoord,
    g: f64,
    h: f64,
    parent: Option<NodeHandle>,
}

impl SearchNode {
    #[inline]
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    h: f64,
    seq: u64,
    handle: NodeHandle,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed: BinaryHeap is a max-heap and we want the smallest f.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A found route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Start first, goal last.
    pub cells: Vec<CellCoord>,
    /// Sum of traversal costs along the route.
    pub cost: f64,
    /// Nodes closed during the search.
    pub expanded: usize,
}

impl PathResult {
    /// Number of moves.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Direction of the first move, if the route has one.
    pub fn first_step(&self) -> Option<Direction> {
        match self.cells.as_slice() {
            [a, b, ..] => Direction::between(*a, *b),
            _ => None,
        }
    }
}

/// A nearby cell in a different layer that the agent could enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTransition {
    pub cell: CellCoord,
    pub layer: VoxelLayer,
    /// Manhattan distance from the scan centre.
    pub distance: u32,
}

#[derive(Debug, Clone, Default)]
pub struct VoxelPathfinder {
    config: PathfindingConfig,
}

impl VoxelPathfinder {
    pub fn new(config: PathfindingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    #[inline]
    fn heuristic(&self, from: CellCoord, to: CellCoord) -> f64 {
        let lateral = from.x.abs_diff(to.x) + from.y.abs_diff(to.y);
        lateral as f64 + self.config.vertical_weight * from.z.abs_diff(to.z) as f64
    }

    /// Route from `start` to `goal`, or `None` when the goal is unreachable
    /// within `max_distance` accumulated cost.
    pub fn find_path<W>(
        &self,
        world: &W,
        start: CellCoord,
        goal: CellCoord,
        species: &SpeciesProfile,
        genome: &Genome,
        max_distance: f64,
    ) -> Option<PathResult>
    where
        W: VoxelWorld + ?Sized,
    {
        if world.cell_at(start).is_none() || world.cell_at(goal).is_none() {
            return None;
        }
        if start == goal {
            return Some(PathResult {
                cells: vec![start],
                cost: 0.0,
                expanded: 0,
            });
        }

        let mut nodes: Vec<SearchNode> = Vec::new();
        let mut best: HashMap<CellCoord, NodeHandle> = HashMap::new();
        let mut closed: HashSet<CellCoord> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        let root = SearchNode {
            cell: start,
            g: 0.0,
            h: self.heuristic(start, goal),
            parent: None,
        };
        nodes.push(root);
        best.insert(start, NodeHandle(0));
        open.push(OpenEntry {
            f: root.f(),
            h: root.h,
            seq,
            handle: NodeHandle(0),
        });

        while let Some(entry) = open.pop() {
            let node = nodes[entry.handle.0];
            if closed.contains(&node.cell) || best.get(&node.cell) != Some(&entry.handle) {
                continue;
            }
            if node.g > max_distance {
                continue;
            }
            if node.cell == goal {
                let result = PathResult {
                    cells: Self::reconstruct(&nodes, entry.handle),
                    cost: node.g,
                    expanded: closed.len(),
                };
                tracing::debug!(
                    steps = result.steps(),
                    cost = result.cost,
                    expanded = result.expanded,
                    "Path found"
                );
                return Some(result);
            }
            closed.insert(node.cell);

            for (direction, next) in world.adjacent_cells(node.cell) {
                if closed.contains(&next) {
                    continue;
                }
                let step = world.traversal_cost(next, direction, species, genome);
                if !step.is_finite() {
                    continue;
                }
                let g = node.g + step;
                if g > max_distance {
                    continue;
                }
                if let Some(existing) = best.get(&next) {
                    if nodes[existing.0].g <= g {
                        continue;
                    }
                }
                let handle = NodeHandle(nodes.len());
                let child = SearchNode {
                    cell: next,
                    g,
                    h: self.heuristic(next, goal),
                    parent: Some(entry.handle),
                };
                nodes.push(child);
                best.insert(next, handle);
                seq += 1;
                open.push(OpenEntry {
                    f: child.f(),
                    h: child.h,
                    seq,
                    handle,
                });
            }
        }

        tracing::debug!(?start, ?goal, expanded = closed.len(), "No path");
        None
    }

    /// [`find_path`](Self::find_path) on world-space positions, bounded by the
    /// configured `max_distance`.
    pub fn find_path_world<W>(
        &self,
        world: &W,
        start: (f64, f64, f64),
        goal: (f64, f64, f64),
        voxel_size: f64,
        species: &SpeciesProfile,
        genome: &Genome,
    ) -> Option<PathResult>
    where
        W: VoxelWorld + ?Sized,
    {
        let s = CellCoord::from_world(start.0, start.1, start.2, voxel_size)?;
        let g = CellCoord::from_world(goal.0, goal.1, goal.2, voxel_size)?;
        self.find_path(world, s, g, species, genome, self.config.max_distance)
    }

    fn reconstruct(nodes: &[SearchNode], goal: NodeHandle) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        let mut cursor = Some(goal);
        while let Some(handle) = cursor {
            let node = &nodes[handle.0];
            cells.push(node.cell);
            cursor = node.parent;
        }
        cells.reverse();
        cells
    }

    /// Legal single-step moves from `position`. Empty means stuck.
    pub fn valid_moves<W>(
        &self,
        world: &W,
        position: CellCoord,
        species: &SpeciesProfile,
        genome: &Genome,
    ) -> BTreeMap<Direction, CellCoord>
    where
        W: VoxelWorld + ?Sized,
    {
        if world.cell_at(position).is_none() {
            return BTreeMap::new();
        }
        world
            .adjacent_cells(position)
            .into_iter()
            .filter(|(d, c)| world.traversal_cost(*c, *d, species, genome).is_finite())
            .collect()
    }

    /// Enterable cells within `radius` (Chebyshev) of `near` whose layer is not
    /// `from_layer`, nearest first. A scan, not a search: reachability from
    /// `near` is not checked.
    pub fn layer_transitions<W>(
        &self,
        world: &W,
        from_layer: VoxelLayer,
        near: CellCoord,
        species: &SpeciesProfile,
        genome: &Genome,
        radius: i32,
    ) -> Vec<LayerTransition>
    where
        W: VoxelWorld + ?Sized,
    {
        let r = radius.max(0);
        let mut found = Vec::new();
        for dz in -r..=r {
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let Some(cell) = near.checked_offset(dx, dy, dz) else {
                        continue;
                    };
                    let Some(voxel) = world.cell_at(cell) else {
                        continue;
                    };
                    if voxel.layer == from_layer {
                        continue;
                    }
                    let enterable = Direction::ALL
                        .into_iter()
                        .any(|d| world.traversal_cost(cell, d, species, genome).is_finite());
                    if enterable {
                        found.push(LayerTransition {
                            cell,
                            layer: voxel.layer,
                            distance: near.manhattan(cell),
                        });
                    }
                }
            }
        }
        found.sort_by_key(|t| t.distance);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelGrid;
    use wayfarer_data::{ActivationKind, Locomotion, Material, Voxel};

    fn genome() -> Genome {
        let topology = vec![2, 3, 1];
        Genome::new(
            topology.clone(),
            vec![0.0; Genome::weight_count_for(&topology)],
            vec![0.0; Genome::bias_count_for(&topology)],
            vec![
                ActivationKind::Identity,
                ActivationKind::Relu,
                ActivationKind::Tanh,
            ],
        )
    }

    fn flyer() -> SpeciesProfile {
        SpeciesProfile::new(
            uuid::Uuid::nil(),
            "swift",
            Locomotion {
                flies: true,
                ..Default::default()
            },
        )
    }

    fn walker() -> SpeciesProfile {
        SpeciesProfile::new(uuid::Uuid::nil(), "ant", Locomotion::WALKER)
    }

    fn floor_world(w: u16, d: u16, h: u16) -> VoxelGrid {
        let mut grid = VoxelGrid::empty(w, d, h);
        for x in 0..w as i32 {
            for y in 0..d as i32 {
                grid.set(
                    CellCoord::new(x, y, 0),
                    Voxel::new(Material::Bedrock, VoxelLayer::Underground),
                );
                grid.set(
                    CellCoord::new(x, y, 1),
                    Voxel::new(Material::Air, VoxelLayer::Surface),
                );
            }
        }
        grid
    }

    fn assert_connected(world: &VoxelGrid, path: &PathResult, species: &SpeciesProfile) {
        let g = genome();
        let mut cost = 0.0;
        for pair in path.cells.windows(2) {
            let d = Direction::between(pair[0], pair[1]).expect("cells must be face-adjacent");
            let c = world.traversal_cost(pair[1], d, species, &g);
            assert!(c.is_finite());
            cost += c;
        }
        assert!((cost - path.cost).abs() < 1e-9);
    }

    #[test]
    fn test_open_grid_path_matches_manhattan() {
        let world = VoxelGrid::empty(8, 8, 4);
        let pf = VoxelPathfinder::default();
        let start = CellCoord::new(0, 0, 0);
        let goal = CellCoord::new(3, 4, 0);
        let path = pf
            .find_path(&world, start, goal, &flyer(), &genome(), 100.0)
            .unwrap();
        assert_eq!(path.steps(), 7);
        assert_eq!(path.cells.first(), Some(&start));
        assert_eq!(path.cells.last(), Some(&goal));
        assert_eq!(path.cost, 7.0);
        assert_connected(&world, &path, &flyer());
    }

    #[test]
    fn test_vertical_route_is_optimal() {
        let world = VoxelGrid::empty(6, 6, 6);
        let pf = VoxelPathfinder::default();
        let path = pf
            .find_path(
                &world,
                CellCoord::new(0, 0, 0),
                CellCoord::new(2, 1, 3),
                &flyer(),
                &genome(),
                100.0,
            )
            .unwrap();
        assert_eq!(path.steps(), 6);
        assert!((path.cost - (3.0 + 3.0 * 1.2)).abs() < 1e-9);
    }

    #[test]
    fn test_boxed_in_start_has_no_path() {
        let mut world = floor_world(5, 5, 4);
        let start = CellCoord::new(2, 2, 1);
        for d in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Up,
        ] {
            world.set(
                start.step(d),
                Voxel::new(Material::Bedrock, VoxelLayer::Underground),
            );
        }
        let pf = VoxelPathfinder::default();
        let result = pf.find_path(
            &world,
            start,
            CellCoord::new(0, 0, 1),
            &walker(),
            &genome(),
            100.0,
        );
        assert!(result.is_none());
        assert!(pf.valid_moves(&world, start, &walker(), &genome()).is_empty());
    }

    #[test]
    fn test_walker_detours_around_wall() {
        let mut world = floor_world(7, 7, 3);
        // Wall along x = 3 except at y = 6
        for y in 0..6 {
            for z in 1..3 {
                world.set(
                    CellCoord::new(3, y, z),
                    Voxel::new(Material::Bedrock, VoxelLayer::Underground),
                );
            }
        }
        let pf = VoxelPathfinder::default();
        let start = CellCoord::new(1, 0, 1);
        let goal = CellCoord::new(5, 0, 1);
        let path = pf
            .find_path(&world, start, goal, &walker(), &genome(), 100.0)
            .unwrap();
        assert_eq!(path.steps(), 4 + 12);
        assert!(path.cells.iter().all(|c| c.z == 1));
        assert_connected(&world, &path, &walker());
    }

    #[test]
    fn test_max_distance_prunes() {
        let world = VoxelGrid::empty(8, 8, 1);
        let pf = VoxelPathfinder::default();
        let start = CellCoord::new(0, 0, 0);
        let goal = CellCoord::new(3, 4, 0);
        assert!(pf
            .find_path(&world, start, goal, &flyer(), &genome(), 5.0)
            .is_none());
        assert!(pf
            .find_path(&world, start, goal, &flyer(), &genome(), 7.0)
            .is_some());
    }

    #[test]
    fn test_degenerate_endpoints() {
        let world = VoxelGrid::empty(4, 4, 4);
        let pf = VoxelPathfinder::default();
        let c = CellCoord::new(1, 1, 1);
        let same = pf.find_path(&world, c, c, &flyer(), &genome(), 10.0).unwrap();
        assert_eq!(same.cells, vec![c]);
        assert_eq!(same.steps(), 0);
        assert!(same.first_step().is_none());

        let outside = CellCoord::new(9, 9, 9);
        assert!(pf
            .find_path(&world, c, outside, &flyer(), &genome(), 10.0)
            .is_none());
        assert!(pf
            .find_path(&world, outside, c, &flyer(), &genome(), 10.0)
            .is_none());
    }

    #[test]
    fn test_search_is_deterministic() {
        let world = VoxelGrid::generate(20, 20, 10, 5);
        let pf = VoxelPathfinder::default();
        let species = flyer();
        let start = CellCoord::new(0, 0, 8);
        let goal = CellCoord::new(19, 17, 8);
        let a = pf.find_path(&world, start, goal, &species, &genome(), 200.0);
        let b = pf.find_path(&world, start, goal, &species, &genome(), 200.0);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_find_path_world_converts_positions() {
        let world = VoxelGrid::empty(8, 8, 2);
        let pf = VoxelPathfinder::default();
        let path = pf
            .find_path_world(
                &world,
                (0.5, 0.5, 0.5),
                (3.9, 0.2, 0.1),
                1.0,
                &flyer(),
                &genome(),
            )
            .unwrap();
        assert_eq!(path.steps(), 3);
        assert_eq!(path.first_step(), Some(Direction::East));
    }

    #[test]
    fn test_valid_moves_on_floor() {
        let world = floor_world(4, 4, 3);
        let pf = VoxelPathfinder::default();
        let moves = pf.valid_moves(&world, CellCoord::new(0, 0, 1), &walker(), &genome());
        let dirs: Vec<_> = moves.keys().copied().collect();
        assert_eq!(dirs, vec![Direction::North, Direction::East]);
    }

    #[test]
    fn test_layer_transitions_nearest_first() {
        let world = floor_world(6, 6, 5);
        let pf = VoxelPathfinder::default();
        let near = CellCoord::new(3, 3, 3);
        let found = pf.layer_transitions(
            &world,
            VoxelLayer::Aerial,
            near,
            &flyer(),
            &genome(),
            2,
        );
        assert!(!found.is_empty());
        assert!(found.iter().all(|t| t.layer == VoxelLayer::Surface));
        assert!(found.iter().all(|t| t.cell != near));
        assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(found[0].cell, CellCoord::new(3, 3, 1));
        // Bedrock is never enterable
        assert!(found.iter().all(|t| t.cell.z != 0));
    }

    #[test]
    fn test_queries_at_coordinate_limit_are_empty() {
        let world = VoxelGrid::empty(4, 4, 4);
        let pf = VoxelPathfinder::default();
        let far = CellCoord::new(i32::MAX, 0, 0);
        assert!(pf.valid_moves(&world, far, &walker(), &genome()).is_empty());
        assert!(world.adjacent_cells(far).is_empty());
        let found = pf.layer_transitions(
            &world,
            VoxelLayer::Aerial,
            CellCoord::new(i32::MAX, i32::MIN, i32::MAX),
            &flyer(),
            &genome(),
            2,
        );
        assert!(found.is_empty());
        assert!(pf
            .find_path(&world, far, CellCoord::new(0, 0, 0), &flyer(), &genome(), 100.0)
            .is_none());
    }
}
