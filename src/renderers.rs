use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::WindowCanvas;

use crate::cells::{Cell, CellColour, Direction, GridCoordinate, DIRECTIONS};
use crate::grid::Grid;
use crate::units::CellPixels;

const WALL_COLOUR: Color = Color { r: 0, g: 0, b: 0, a: 0xff };

/// How to place the grid on the drawing surface.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RenderOptions {
    surface_width: u32,
    surface_height: u32,
    cell_pixels: CellPixels,
}

pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            options: RenderOptions {
                surface_width: 600,
                surface_height: 600,
                cell_pixels: CellPixels(30),
            },
        }
    }

    pub fn surface_size(mut self, width: u32, height: u32) -> RenderOptionsBuilder {
        self.options.surface_width = width;
        self.options.surface_height = height;
        self
    }

    pub fn cell_side_pixels_length(mut self, cell_pixels: CellPixels) -> RenderOptionsBuilder {
        self.options.cell_pixels = cell_pixels;
        self
    }

    pub fn build(self) -> RenderOptions {
        self.options
    }
}

impl Default for RenderOptionsBuilder {
    fn default() -> RenderOptionsBuilder {
        RenderOptionsBuilder::new()
    }
}

/// Draw the whole grid, centred on the surface. Reads the grid, never
/// mutates it; a grid larger than the surface overflows the edges with no
/// clamping. Individual drawing call failures are discarded - a redraw
/// happens every frame and must never take the process down.
pub fn render_grid(renderer: &mut WindowCanvas, grid: &Grid, options: &RenderOptions) {
    let offset_x = centring_offset(options.surface_width, grid.width().0, options.cell_pixels);
    let offset_y = centring_offset(options.surface_height, grid.height().0, options.cell_pixels);

    for coord in grid.iter() {
        if let Some(cell) = grid.cell(coord) {
            draw_cell(renderer, cell, options.cell_pixels, offset_x, offset_y);
        }
    }
}

/// Fill the cell square in its current colour, then stroke a line along each
/// boundary whose wall flag is still set.
pub fn draw_cell(renderer: &mut WindowCanvas,
                 cell: &Cell,
                 cell_pixels: CellPixels,
                 offset_x: i32,
                 offset_y: i32) {
    let CellPixels(side) = cell_pixels;
    let origin = cell_origin(cell.coordinate(), cell_pixels, offset_x, offset_y);

    renderer.set_draw_color(fill_colour(cell.colour()));
    let _ = renderer.fill_rect(Rect::new(origin.0, origin.1, side, side));

    renderer.set_draw_color(WALL_COLOUR);
    for &direction in &DIRECTIONS {
        if cell.wall(direction) {
            let (from, to) = wall_segment(origin, side as i32, direction);
            let _ = renderer.draw_line(Point::new(from.0, from.1), Point::new(to.0, to.1));
        }
    }
}

/// Pixel offset that centres `cells_count` cells on a surface axis. Negative
/// when the grid does not fit.
pub fn centring_offset(surface_length: u32,
                       cells_count: usize,
                       CellPixels(side): CellPixels)
                       -> i32 {
    ((i64::from(surface_length) - cells_count as i64 * i64::from(side)) / 2) as i32
}

/// Top left pixel of a cell's square on the surface.
pub fn cell_origin(coord: GridCoordinate,
                   CellPixels(side): CellPixels,
                   offset_x: i32,
                   offset_y: i32)
                   -> (i32, i32) {
    (coord.x as i32 * side as i32 + offset_x, coord.y as i32 * side as i32 + offset_y)
}

/// End points of the wall line along one boundary of a cell square.
pub fn wall_segment((x, y): (i32, i32),
                    side: i32,
                    direction: Direction)
                    -> ((i32, i32), (i32, i32)) {
    match direction {
        Direction::Left => ((x, y), (x, y + side)),
        Direction::Right => ((x + side, y), (x + side, y + side)),
        Direction::Top => ((x, y), (x + side, y)),
        Direction::Bottom => ((x, y + side), (x + side, y + side)),
    }
}

fn fill_colour(colour: CellColour) -> Color {
    match colour {
        CellColour::White => Color::RGB(0xff, 0xff, 0xff),
        CellColour::Lime => Color::RGB(0, 0xff, 0),
        CellColour::Red => Color::RGB(0xff, 0, 0),
    }
}
