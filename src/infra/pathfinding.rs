//! Weighted best-first search over the terrain grid.
//!
//! This is not an optimal shortest-path search: cells are ranked by distance
//! to the target plus their own terrain cost, never by the cost already paid
//! to reach them. Routes are good enough to walk and cheap to compute.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::infra::{Cell, PathError, Plan, Position};
use crate::state::Grid;

/// Heuristic weight of accurate searches.
pub const ACCURATE_WEIGHT: f64 = 0.7;

/// Heuristic weight of greedy searches.
pub const GREEDY_WEIGHT: f64 = 1.0;

/// Accurate searches between cells further apart than this (Chebyshev) run
/// greedy instead, which bounds the work done on long routes.
pub const GREEDY_DISTANCE_THRESHOLD: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Priorities accumulate along the discovery chain, so the search widens
    /// before committing to a direction.
    Accurate,
    /// Priorities are recomputed from scratch for every cell.
    Greedy,
}

impl SearchMode {
    pub fn weight(&self) -> f64 {
        match self {
            SearchMode::Accurate => ACCURATE_WEIGHT,
            SearchMode::Greedy => GREEDY_WEIGHT,
        }
    }

    /// The mode a search between `start` and `target` actually runs with.
    pub fn effective(self, start: Position, target: Position) -> SearchMode {
        if self == SearchMode::Accurate && start.chebyshev(&target) > GREEDY_DISTANCE_THRESHOLD {
            SearchMode::Greedy
        } else {
            self
        }
    }
}

struct SearchNode {
    /// Position and priority of the cell.
    cell: Cell,
    came_from: Option<usize>,
}

#[derive(Clone, Eq, PartialEq)]
struct FrontierEntry {
    priority: OrderedFloat<f64>,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on priority, earliest discovery first on ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable search state. Every discovered cell lives in an arena and points
/// back at the cell it was discovered from by index.
#[derive(Default)]
pub struct Pathfinder {
    nodes: Vec<SearchNode>,
    index: HashMap<Position, usize>,
    excluded: HashSet<Position>,
    frontier: BinaryHeap<FrontierEntry>,
    expansions: usize,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells taken off the frontier by the previous search.
    pub fn last_expansions(&self) -> usize {
        self.expansions
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.excluded.clear();
        self.frontier.clear();
        self.expansions = 0;
    }

    /// Find a route from `start` to `target`, never entering `excluded`.
    #[tracing::instrument(level = "trace", skip(self, grid, excluded), fields(start_x = start.x, start_y = start.y, target_x = target.x, target_y = target.y))]
    pub fn find(
        &mut self,
        grid: &Grid,
        start: Position,
        target: Position,
        mode: SearchMode,
        excluded: &[Position],
    ) -> Result<Plan, PathError> {
        if start == target || excluded.iter().any(|pos| *pos == start || *pos == target) {
            return Err(PathError::InvalidLocation { start, target });
        }

        self.clear();
        self.excluded.extend(excluded.iter().copied());

        let mode = mode.effective(start, target);
        self.discover(start, None);
        self.expand(grid, 0, target, mode);

        while let Some(entry) = self.frontier.pop() {
            let Some(pos) = self.nodes.get(entry.node).map(|node| node.cell.pos) else {
                return Err(PathError::InternalInvariant(format!(
                    "frontier entry {} missing from arena of {} nodes",
                    entry.node,
                    self.nodes.len()
                )));
            };
            self.expansions += 1;

            if pos == target {
                trace!(expansions = self.expansions, "Path found");
                return self.reconstruct(grid, start, entry.node);
            }

            self.expand(grid, entry.node, target, mode);
        }

        trace!(expansions = self.expansions, "Frontier exhausted");
        Err(PathError::Unreachable {
            target,
            visited: self.expansions,
        })
    }

    fn expand(&mut self, grid: &Grid, from: usize, target: Position, mode: SearchMode) {
        let origin = self.nodes[from].cell;
        for neighbor in origin.pos.neighbors() {
            if !grid.contains(&neighbor)
                || self.excluded.contains(&neighbor)
                || self.index.contains_key(&neighbor)
            {
                continue;
            }

            let estimate = mode.weight() * neighbor.euclidean(&target) + grid.cost(&neighbor);
            let priority = match mode {
                SearchMode::Accurate => origin.cost + estimate,
                SearchMode::Greedy => estimate,
            };
            self.discover(neighbor, Some((from, priority)));
        }
    }

    /// Add a cell to the arena; cells with a parent also join the frontier.
    fn discover(&mut self, pos: Position, parent: Option<(usize, f64)>) {
        let node = self.nodes.len();
        let (came_from, priority) = match parent {
            Some((from, priority)) => (Some(from), priority),
            None => (None, 0.0),
        };
        self.nodes.push(SearchNode {
            cell: Cell::new(pos, priority),
            came_from,
        });
        self.index.insert(pos, node);

        if came_from.is_some() {
            self.frontier.push(FrontierEntry {
                priority: OrderedFloat(priority),
                node,
            });
        }
    }

    fn reconstruct(&self, grid: &Grid, start: Position, found: usize) -> Result<Plan, PathError> {
        let mut route = Vec::new();
        let mut current = Some(found);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.came_from.is_none() {
                break;
            }
            route.push(node.cell.pos);
            current = node.came_from;
        }
        route.reverse();

        let Some(&last) = route.last() else {
            return Err(PathError::InvalidPath(start));
        };
        let move_cost: f64 = route.iter().map(|pos| grid.cost(pos)).sum();
        trace!(steps = route.len(), move_cost, "Route to {:?} rebuilt", last);
        Ok(Plan::new(start, route, move_cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MapRecord;
    use crate::state::Terrain;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn uniform_grid(width: i32, height: i32, code: i32) -> Grid {
        let mut grid = Grid::new(width, height);
        grid.update(&MapRecord {
            width,
            height,
            fields: vec![vec![code; width as usize]; height as usize],
        });
        grid
    }

    fn assert_walkable(plan: &Plan, start: Position, target: Position) {
        let mut previous = start;
        for step in plan.steps() {
            assert!(
                previous.is_adjacent(&step),
                "Step {:?} does not follow {:?}",
                step,
                previous
            );
            previous = step;
        }
        assert_eq!(previous, target, "Route must end on the target");
    }

    #[test]
    fn test_all_pairs_reach_target() {
        let grid = uniform_grid(5, 5, 1);
        let mut pathfinder = Pathfinder::new();

        for sy in 0..5 {
            for sx in 0..5 {
                for ty in 0..5 {
                    for tx in 0..5 {
                        let start = Position::new(sx, sy);
                        let target = Position::new(tx, ty);
                        if start == target {
                            continue;
                        }
                        for mode in [SearchMode::Accurate, SearchMode::Greedy] {
                            let plan = pathfinder.find(&grid, start, target, mode, &[]).unwrap();
                            assert_eq!(plan.target(), Some(target));
                            assert_walkable(&plan, start, target);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_random_terrain_reaches_target() {
        let mut rng = StdRng::seed_from_u64(1911);
        let mut pathfinder = Pathfinder::new();

        for _ in 0..25 {
            let width = rng.random_range(2..16);
            let height = rng.random_range(2..16);
            let mut grid = Grid::new(width, height);
            for y in 0..height {
                for x in 0..width {
                    let terrain = match rng.random_range(0..4) {
                        0 => Terrain::Unknown,
                        1 => Terrain::Standard,
                        2 => Terrain::Water,
                        _ => Terrain::Marsh,
                    };
                    grid.set(Position::new(x, y), terrain);
                }
            }

            let start = Position::new(rng.random_range(0..width), rng.random_range(0..height));
            let target = Position::new(rng.random_range(0..width), rng.random_range(0..height));
            if start == target {
                continue;
            }

            let plan = pathfinder
                .find(&grid, start, target, SearchMode::Accurate, &[])
                .unwrap();
            assert_walkable(&plan, start, target);
            assert!(pathfinder.last_expansions() <= (width * height) as usize);

            let expected: f64 = plan.steps().map(|pos| grid.cost(&pos)).sum();
            assert!((plan.move_cost() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_start_and_target_is_invalid() {
        let grid = uniform_grid(4, 4, 1);
        let mut pathfinder = Pathfinder::new();
        let pos = Position::new(2, 2);

        for mode in [SearchMode::Accurate, SearchMode::Greedy] {
            let result = pathfinder.find(&grid, pos, pos, mode, &[]);
            assert_eq!(
                result.unwrap_err(),
                PathError::InvalidLocation {
                    start: pos,
                    target: pos
                }
            );
        }
    }

    #[test]
    fn test_excluded_endpoint_is_invalid() {
        let grid = uniform_grid(4, 4, 1);
        let mut pathfinder = Pathfinder::new();
        let start = Position::new(0, 0);
        let target = Position::new(3, 3);

        let result = pathfinder.find(&grid, start, target, SearchMode::Greedy, &[start]);
        assert!(matches!(result, Err(PathError::InvalidLocation { .. })));

        let result = pathfinder.find(&grid, start, target, SearchMode::Greedy, &[target]);
        assert!(matches!(result, Err(PathError::InvalidLocation { .. })));
    }

    #[test]
    fn test_route_avoids_excluded_cells() {
        let grid = uniform_grid(5, 5, 1);
        let mut pathfinder = Pathfinder::new();
        let start = Position::new(0, 2);
        let target = Position::new(4, 2);
        let wall = [Position::new(2, 1), Position::new(2, 2), Position::new(2, 3)];

        let plan = pathfinder
            .find(&grid, start, target, SearchMode::Accurate, &wall)
            .unwrap();

        assert_walkable(&plan, start, target);
        for step in plan.steps() {
            assert!(!wall.contains(&step), "Route enters excluded cell {:?}", step);
        }
    }

    #[test]
    fn test_walled_off_target_is_unreachable() {
        let grid = uniform_grid(5, 5, 1);
        let mut pathfinder = Pathfinder::new();
        let wall = [Position::new(1, 0), Position::new(0, 1)];

        let result = pathfinder.find(
            &grid,
            Position::new(4, 4),
            Position::new(0, 0),
            SearchMode::Greedy,
            &wall,
        );

        match result {
            Err(PathError::Unreachable { target, visited }) => {
                assert_eq!(target, Position::new(0, 0));
                // Everything but the start, the target and the two walls
                assert_eq!(visited, 21);
            }
            other => panic!("expected unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_greedy_expansions_stay_bounded() {
        let grid = uniform_grid(20, 20, 1);
        let mut pathfinder = Pathfinder::new();

        let plan = pathfinder
            .find(
                &grid,
                Position::new(0, 0),
                Position::new(19, 19),
                SearchMode::Greedy,
                &[],
            )
            .unwrap();

        assert_eq!(plan.len(), 38);
        assert_eq!(plan.move_cost(), 38.0);
        assert!(
            pathfinder.last_expansions() <= 80,
            "Greedy search visited {} cells",
            pathfinder.last_expansions()
        );
    }

    #[test]
    fn test_long_accurate_search_runs_greedy() {
        let near = SearchMode::Accurate.effective(Position::new(0, 0), Position::new(8, 3));
        let far = SearchMode::Accurate.effective(Position::new(0, 0), Position::new(9, 3));

        assert_eq!(near, SearchMode::Accurate);
        assert_eq!(far, SearchMode::Greedy);
        assert_eq!(
            SearchMode::Greedy.effective(Position::new(0, 0), Position::new(1, 0)),
            SearchMode::Greedy
        );
    }

    #[test]
    fn test_pathfinder_reused_across_searches() {
        let grid = uniform_grid(6, 6, 2);
        let mut pathfinder = Pathfinder::new();

        let first = pathfinder
            .find(&grid, Position::new(0, 0), Position::new(5, 0), SearchMode::Greedy, &[])
            .unwrap();
        let second = pathfinder
            .find(&grid, Position::new(5, 5), Position::new(0, 5), SearchMode::Greedy, &[])
            .unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(first.move_cost(), 10.0);
        assert_eq!(second.target(), Some(Position::new(0, 5)));
        assert_eq!(second.len(), 5);
    }
}
