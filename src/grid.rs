use std::fmt;

use error_chain::bail;
use itertools::iproduct;
use smallvec::SmallVec;

use crate::cells::{Cell, Direction, GridCoordinate, DIRECTIONS};
use crate::errors::*;
use crate::units::{Height, Width};

/// Neighbour query result with one slot per direction, `None` where the
/// neighbour is out of bounds or filtered out.
pub type CoordinateOptionSmallVec = SmallVec<[Option<GridCoordinate>; 4]>;

/// A width×height rectangle of `Cell`s in row major order.
///
/// Two openings are forced once at construction and never revisited: the
/// entrance at (0,0) on the Left boundary and the exit at
/// (width-1, height-1) on the Right boundary.
#[derive(Debug, Clone)]
pub struct Grid {
    width: Width,
    height: Height,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a fresh grid of fully walled, unvisited cells.
    ///
    /// Dimensions of zero are rejected, there is no meaningful maze over an
    /// empty grid.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        if width.0 < 1 {
            bail!(ErrorKind::InvalidDimension("width", width.0));
        }
        if height.0 < 1 {
            bail!(ErrorKind::InvalidDimension("height", height.0));
        }

        let cells: Vec<Cell> = iproduct!(0..height.0, 0..width.0)
            .map(|(y, x)| Cell::new(GridCoordinate::new(x as u32, y as u32)))
            .collect();

        let mut grid = Grid {
            width,
            height,
            cells,
        };

        let entrance = GridCoordinate::new(0, 0);
        let exit = GridCoordinate::new(width.0 as u32 - 1, height.0 as u32 - 1);
        if let Some(cell) = grid.cell_mut(entrance) {
            cell.set_wall(Direction::Left, false);
        }
        if let Some(cell) = grid.cell_mut(exit) {
            cell.set_wall(Direction::Right, false);
        }

        Ok(grid)
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, coord: GridCoordinate) -> Option<&Cell> {
        self.grid_coordinate_to_index(coord)
            .map(move |index| &self.cells[index])
    }

    pub fn cell_mut(&mut self, coord: GridCoordinate) -> Option<&mut Cell> {
        self.grid_coordinate_to_index(coord)
            .map(move |index| &mut self.cells[index])
    }

    /// The adjacent coordinate one cell away, `None` when that would fall
    /// outside the grid.
    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: Direction)
                                  -> Option<GridCoordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        let GridCoordinate { x, y } = coord;
        let neighbour = match direction {
            Direction::Left => {
                if x > 0 {
                    Some(GridCoordinate::new(x - 1, y))
                } else {
                    None
                }
            }
            Direction::Right => Some(GridCoordinate::new(x + 1, y)),
            Direction::Top => {
                if y > 0 {
                    Some(GridCoordinate::new(x, y - 1))
                } else {
                    None
                }
            }
            Direction::Bottom => Some(GridCoordinate::new(x, y + 1)),
        };
        neighbour.filter(|&neighbour_coord| self.is_valid_coordinate(neighbour_coord))
    }

    /// For each of the 4 directions the adjacent cell if it exists within
    /// bounds and is unvisited, else a missing slot. The whole result is
    /// `None` when no slot is occupied, distinguishing "no candidates" from
    /// "candidates exist in some directions".
    pub fn unvisited_neighbours(&self, coord: GridCoordinate) -> Option<CoordinateOptionSmallVec> {
        let neighbours: CoordinateOptionSmallVec = DIRECTIONS
            .iter()
            .map(|&direction| {
                self.neighbour_at_direction(coord, direction)
                    .filter(|&neighbour_coord| {
                        self.cell(neighbour_coord)
                            .map_or(false, |cell| !cell.is_visited())
                    })
            })
            .collect();

        if neighbours.iter().any(|slot| slot.is_some()) {
            Some(neighbours)
        } else {
            None
        }
    }

    /// Clear the shared wall between a cell and its neighbour in the given
    /// direction, on both sides, so no one-way passage can exist. A no-op when
    /// the neighbour is out of bounds.
    pub fn open_wall(&mut self, coord: GridCoordinate, direction: Direction) {
        if let Some(neighbour_coord) = self.neighbour_at_direction(coord, direction) {
            if let Some(cell) = self.cell_mut(coord) {
                cell.set_wall(direction, false);
            }
            if let Some(cell) = self.cell_mut(neighbour_coord) {
                cell.set_wall(direction.opposite(), false);
            }
        }
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            row_width: self.width.0,
            cells_count: self.size(),
        }
    }

    fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        const CORNER: &str = "+";
        const WALL_HORIZONTAL: &str = "---";
        const OPEN_HORIZONTAL: &str = "   ";
        const WALL_VERTICAL: &str = "|";
        const OPEN_VERTICAL: &str = " ";
        const BODY: &str = "   ";

        let wall_at = |x: usize, y: usize, direction: Direction| -> bool {
            self.cell(GridCoordinate::new(x as u32, y as u32))
                .map_or(true, |cell| cell.wall(direction))
        };

        // The top boundary is only drawn once, every other horizontal line is
        // the Bottom flag of the row above it (the flags stay symmetric).
        let mut output = String::from(CORNER);
        for x in 0..self.width.0 {
            output.push_str(if wall_at(x, 0, Direction::Top) {
                WALL_HORIZONTAL
            } else {
                OPEN_HORIZONTAL
            });
            output.push_str(CORNER);
        }
        output.push('\n');

        for y in 0..self.height.0 {

            output.push_str(if wall_at(0, y, Direction::Left) {
                WALL_VERTICAL
            } else {
                OPEN_VERTICAL
            });
            for x in 0..self.width.0 {
                output.push_str(BODY);
                output.push_str(if wall_at(x, y, Direction::Right) {
                    WALL_VERTICAL
                } else {
                    OPEN_VERTICAL
                });
            }
            output.push('\n');

            output.push_str(CORNER);
            for x in 0..self.width.0 {
                output.push_str(if wall_at(x, y, Direction::Bottom) {
                    WALL_HORIZONTAL
                } else {
                    OPEN_HORIZONTAL
                });
                output.push_str(CORNER);
            }
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    row_width: usize,
    cells_count: usize,
}

impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = index_to_grid_coordinate(self.row_width, self.current_cell_number);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn index_to_grid_coordinate(row_width: usize, one_dimensional_index: usize) -> GridCoordinate {
    let y = one_dimensional_index / row_width;
    let x = one_dimensional_index - (y * row_width);
    GridCoordinate::new(x as u32, y as u32)
}
