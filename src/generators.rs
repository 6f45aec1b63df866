use rand::{self, Rng, XorShiftRng};

use crate::cells::{CellColour, Direction, GridCoordinate, DIRECTIONS, DIRECTIONS_COUNT};
use crate::grid::{CoordinateOptionSmallVec, Grid};

/// Where the incremental carve is in its lifecycle.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CarveState {
    Idle,
    Carving,
    Done,
}

/// Carves a perfect maze into a `Grid` with the randomized depth-first-search
/// (recursive backtracker) algorithm, one step per call so the process can be
/// animated on a timer.
///
/// The walk is kept on an explicit stack of grid coordinates rather than cell
/// references, so replacing the grid mid-carve can never leave the carver
/// holding dangling cells. Every coordinate on the stack names a visited
/// cell, and the stack is empty exactly when carving is Done or not started.
pub struct Carver {
    path: Vec<GridCoordinate>,
    state: CarveState,
    rng: XorShiftRng,
}

impl Carver {
    pub fn new() -> Carver {
        Carver::with_rng(rand::weak_rng())
    }

    /// A carver with a caller supplied RNG, which makes the carve
    /// deterministic for a fixed seed.
    pub fn with_rng(rng: XorShiftRng) -> Carver {
        Carver {
            path: Vec::new(),
            state: CarveState::Idle,
            rng,
        }
    }

    pub fn state(&self) -> CarveState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == CarveState::Done
    }

    /// The current walk from the seed cell, deepest cell last.
    pub fn path(&self) -> &[GridCoordinate] {
        &self.path
    }

    /// Seed the walk at the grid origin, discarding any previous walk.
    pub fn start(&mut self, grid: &mut Grid) {
        self.path.clear();

        let origin = GridCoordinate::new(0, 0);
        if let Some(cell) = grid.cell_mut(origin) {
            cell.mark_visited();
        }
        self.path.push(origin);
        self.state = CarveState::Carving;
    }

    /// Perform one carving step.
    ///
    /// Pops the current cell, and when it still has unvisited neighbours
    /// opens the shared wall to a randomly chosen one, then pushes the
    /// current cell back followed by the neighbour - the popped cell stays
    /// available as a future backtrack point. When the pop empties the stack
    /// the carve is Done: every reachable cell has been visited exactly once
    /// and the maze is a spanning tree.
    pub fn step(&mut self, grid: &mut Grid) -> CarveState {
        let current = match self.path.pop() {
            Some(coord) => coord,
            None => {
                self.state = CarveState::Done;
                return self.state;
            }
        };

        if let Some(neighbours) = grid.unvisited_neighbours(current) {
            let (direction, neighbour) = self.sample_neighbour(&neighbours);

            grid.open_wall(current, direction);
            if let Some(cell) = grid.cell_mut(neighbour) {
                cell.mark_visited();
            }
            self.path.push(current);
            self.path.push(neighbour);
        }

        match self.path.last().cloned() {
            None => {
                self.state = CarveState::Done;
            }
            Some(frontier) => {
                // Recolour for the animated view only: the cell just
                // processed joins the lime trail, the stack top is the red
                // frontier.
                if let Some(cell) = grid.cell_mut(current) {
                    cell.set_colour(CellColour::Lime);
                }
                if let Some(cell) = grid.cell_mut(frontier) {
                    cell.set_colour(CellColour::Red);
                }
                self.state = CarveState::Carving;
            }
        }

        self.state
    }

    /// Step until Done, without any animation pacing. Returns the number of
    /// steps taken, which for a started w×h carve is exactly 2·w·h − 1: one
    /// push step per cell beyond the seed and one pop step per cell.
    pub fn run_to_completion(&mut self, grid: &mut Grid) -> usize {
        let mut steps = 0;
        loop {
            steps += 1;
            if self.step(grid) == CarveState::Done {
                return steps;
            }
        }
    }

    /// Choose uniformly at random among the 4 direction slots, retrying until
    /// an occupied slot comes up. With fewer than 4 neighbours present this
    /// still samples over all 4 slots and rejects the empty ones.
    ///
    /// Only call with at least one occupied slot or the loop never exits.
    fn sample_neighbour(&mut self,
                        neighbours: &CoordinateOptionSmallVec)
                        -> (Direction, GridCoordinate) {
        loop {
            let direction = DIRECTIONS[self.rng.gen::<usize>() % DIRECTIONS_COUNT];
            if let Some(coord) = neighbours[direction.index()] {
                return (direction, coord);
            }
        }
    }
}

impl Default for Carver {
    fn default() -> Carver {
        Carver::new()
    }
}

#[cfg(test)]
mod tests {

    use quickcheck::{quickcheck, TestResult};
    use rand::{SeedableRng, XorShiftRng};

    use super::*;
    use crate::cells::Direction;
    use crate::units::{Height, Width};

    fn seeded_carver(seed: u32) -> Carver {
        Carver::with_rng(XorShiftRng::from_seed([seed, 0x193a_6754, 0xa8a7_d469, 0x9783_5e1c]))
    }

    fn grid(width: usize, height: usize) -> Grid {
        Grid::new(Width(width), Height(height)).expect("test grid dimensions are valid")
    }

    /// Interior wall pairs opened by carving. The forced entrance and exit
    /// openings sit on the grid boundary so they never show up here.
    fn opened_wall_pairs(g: &Grid) -> usize {
        let mut opened = 0;
        for coord in g.iter() {
            let cell = g.cell(coord).unwrap();
            if g.neighbour_at_direction(coord, Direction::Right).is_some()
                && !cell.wall(Direction::Right) {
                opened += 1;
            }
            if g.neighbour_at_direction(coord, Direction::Bottom).is_some()
                && !cell.wall(Direction::Bottom) {
                opened += 1;
            }
        }
        opened
    }

    fn assert_walls_symmetric(g: &Grid) {
        for coord in g.iter() {
            let cell = g.cell(coord).unwrap();
            for &direction in &DIRECTIONS {
                if let Some(neighbour_coord) = g.neighbour_at_direction(coord, direction) {
                    let neighbour = g.cell(neighbour_coord).unwrap();
                    assert_eq!(cell.wall(direction),
                               neighbour.wall(direction.opposite()),
                               "one-way passage between {:?} and {:?}",
                               coord,
                               neighbour_coord);
                }
            }
        }
    }

    #[test]
    fn new_carver_is_idle_with_an_empty_path() {
        let carver = Carver::new();
        assert_eq!(carver.state(), CarveState::Idle);
        assert!(carver.path().is_empty());
    }

    #[test]
    fn start_seeds_the_walk_at_the_origin() {
        let mut g = grid(3, 3);
        let mut carver = seeded_carver(1);
        carver.start(&mut g);

        assert_eq!(carver.state(), CarveState::Carving);
        assert_eq!(carver.path(), &[GridCoordinate::new(0, 0)]);
        assert!(g.cell(GridCoordinate::new(0, 0)).unwrap().is_visited());
    }

    #[test]
    fn one_by_one_carve_completes_in_one_step_with_no_opened_pairs() {
        let mut g = grid(1, 1);
        let mut carver = seeded_carver(2);
        carver.start(&mut g);

        assert_eq!(carver.step(&mut g), CarveState::Done);
        assert!(carver.path().is_empty());
        assert_eq!(opened_wall_pairs(&g), 0);
        assert!(g.cell(GridCoordinate::new(0, 0)).unwrap().is_visited());
    }

    #[test]
    fn each_carving_step_pushes_one_new_cell_or_pops_one() {
        let mut g = grid(4, 4);
        let mut carver = seeded_carver(3);
        carver.start(&mut g);

        let mut depth = carver.path().len();
        while carver.step(&mut g) == CarveState::Carving {
            let new_depth = carver.path().len();
            assert!(new_depth == depth + 1 || new_depth == depth - 1);
            depth = new_depth;
        }
        assert_eq!(carver.path().len(), 0);
    }

    #[test]
    fn every_cell_on_the_path_is_visited() {
        let mut g = grid(5, 5);
        let mut carver = seeded_carver(4);
        carver.start(&mut g);

        for _ in 0..20 {
            if carver.step(&mut g) == CarveState::Done {
                break;
            }
            for &coord in carver.path() {
                assert!(g.cell(coord).unwrap().is_visited());
            }
        }
    }

    #[test]
    fn seeded_five_by_five_carve_is_a_spanning_tree() {
        let mut g = grid(5, 5);
        let mut carver = seeded_carver(5);
        carver.start(&mut g);

        let steps = carver.run_to_completion(&mut g);
        assert_eq!(steps, 2 * 5 * 5 - 1);
        assert!(carver.is_done());
        assert!(carver.path().is_empty());

        assert!(g.iter().all(|coord| g.cell(coord).unwrap().is_visited()));
        assert_eq!(opened_wall_pairs(&g), 5 * 5 - 1);
        assert_walls_symmetric(&g);
    }

    #[test]
    fn entrance_and_exit_survive_a_full_carve() {
        let mut g = grid(6, 4);
        let mut carver = seeded_carver(6);
        carver.start(&mut g);
        carver.run_to_completion(&mut g);

        assert!(!g.cell(GridCoordinate::new(0, 0)).unwrap().wall(Direction::Left));
        assert!(!g.cell(GridCoordinate::new(5, 3)).unwrap().wall(Direction::Right));
    }

    #[test]
    fn identical_seeds_carve_identical_mazes() {
        let carve = || {
            let mut g = grid(5, 5);
            let mut carver = seeded_carver(7);
            carver.start(&mut g);
            carver.run_to_completion(&mut g);
            format!("{}", g)
        };
        assert_eq!(carve(), carve());
    }

    #[test]
    fn frontier_cell_is_red_and_trail_is_lime_mid_carve() {
        let mut g = grid(5, 5);
        let mut carver = seeded_carver(8);
        carver.start(&mut g);

        for _ in 0..5 {
            assert_eq!(carver.step(&mut g), CarveState::Carving);
        }
        let frontier = *carver.path().last().unwrap();
        assert_eq!(g.cell(frontier).unwrap().colour(), CellColour::Red);

        let lime_cells = g.iter()
            .filter(|&coord| g.cell(coord).unwrap().colour() == CellColour::Lime)
            .count();
        assert!(lime_cells > 0);
    }

    #[test]
    fn quickcheck_carved_grids_are_spanning_trees() {

        fn prop(width: u8, height: u8) -> TestResult {
            if width == 0 || height == 0 || width > 12 || height > 12 {
                return TestResult::discard();
            }
            let (w, h) = (width as usize, height as usize);

            let mut g = grid(w, h);
            let mut carver = Carver::with_rng(XorShiftRng::from_seed([u32::from(width) + 1,
                                                                     u32::from(height) + 1,
                                                                     0x193a_6754,
                                                                     0x9783_5e1c]));
            carver.start(&mut g);
            let steps = carver.run_to_completion(&mut g);

            let all_visited = g.iter().all(|coord| g.cell(coord).unwrap().is_visited());
            TestResult::from_bool(all_visited
                                  && carver.path().is_empty()
                                  && steps == 2 * w * h - 1
                                  && opened_wall_pairs(&g) == w * h - 1)
        }
        quickcheck(prop as fn(u8, u8) -> TestResult);
    }
}
