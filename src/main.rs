#![cfg_attr(feature="clippy", feature(plugin))]
#![cfg_attr(feature="clippy", plugin(clippy))]

use std::time::{Duration, Instant};

use docopt::Docopt;
use serde_derive::Deserialize;

use mazecarve::{
    renderers::{self, RenderOptionsBuilder},
    scheduler::{FrameTiming, Scheduler},
    sdl,
    session::MazeSession,
    units::{CellPixels, Height, Width},
};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;

const USAGE: &str = "Mazecarve

Usage:
    mazecarve_driver -h | --help
    mazecarve_driver [--grid-width=<w>] [--grid-height=<h>] [--tick-ms=<t>] [--cell-pixels=<n>]

Options:
    -h --help           Show this screen.
    --grid-width=<w>    The grid width in cells [default: 15].
    --grid-height=<h>   The grid height in cells [default: 15].
    --tick-ms=<t>       Milliseconds between two carving steps [default: 50].
    --cell-pixels=<n>   Pixel count to render one cell side [default: 30].
";

#[derive(Debug, Deserialize)]
struct CarveArgs {
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_tick_ms: u64,
    flag_cell_pixels: u32,
}

// The `errors` module holds everything the `error_chain!` macro creates, with
// the library's errors chained in so `?` works across the crate boundary.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazecarve::errors::Error, ::mazecarve::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
        }
    }
}
use crate::errors::*;

const SURFACE_WIDTH: u32 = 600;
const SURFACE_HEIGHT: u32 = 600;
const WINDOW_TITLE: &str = "Mazecarve";

fn main() -> Result<()> {

    let args: CarveArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let width = Width(args.flag_grid_width);
    let height = Height(args.flag_grid_height);
    let tick = Duration::from_millis(args.flag_tick_ms);
    let render_options = RenderOptionsBuilder::new()
        .surface_size(SURFACE_WIDTH, SURFACE_HEIGHT)
        .cell_side_pixels_length(CellPixels(args.flag_cell_pixels))
        .build();

    let sdl_setup = sdl::init();
    let window = sdl_setup
        .video_subsystem
        .window(WINDOW_TITLE, SURFACE_WIDTH, SURFACE_HEIGHT)
        .position_centered()
        .build()
        .expect("Failed to build the sdl2 window");
    let mut renderer = window
        .into_canvas()
        .present_vsync()
        .accelerated()
        .build()
        .expect("Failed to build the sdl2 renderer");

    let mut scheduler = Scheduler::new();
    let mut session = MazeSession::new();

    session.request_maze(&mut scheduler, Instant::now(), width, height, tick)?;

    // The render task owns the sdl renderer. It redraws the whole of the
    // latest grid state every display frame, independent of the carve tick
    // rate, and keeps the FPS readout in the window title current.
    scheduler.schedule_every_frame(Box::new(
        move |session: &mut MazeSession, timing: FrameTiming| {
            renderer.set_draw_color(Color::RGB(0xff, 0xff, 0xff));
            renderer.clear();
            if let Some(grid) = session.grid() {
                renderers::render_grid(&mut renderer, grid, &render_options);
            }
            renderer.present();

            if let Some(fps) = timing.fps() {
                let window = renderer.window_mut();
                let _ = window.set_title(&format!("{} - {:.0} FPS", WINDOW_TITLE, fps));
            }
        },
    ));

    println!("Carving a {}x{} maze, one step every {}ms.",
             args.flag_grid_width,
             args.flag_grid_height,
             args.flag_tick_ms);
    println!("Space carves a fresh maze, q or escape quits.");

    let mut events = sdl_setup
        .sdl_context
        .event_pump()
        .expect("Failed to get the sdl2 event pump");
    let mut was_carving = session.active_carve().is_some();

    'event: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } |
                Event::KeyDown { keycode: Some(Keycode::Escape), .. } |
                Event::KeyDown { keycode: Some(Keycode::Q), .. } => break 'event,
                Event::KeyDown { keycode: Some(Keycode::Space), .. } => {
                    // Generate trigger: cancels any in-flight carve before
                    // the replacement grid goes in.
                    session.request_maze(&mut scheduler, Instant::now(), width, height, tick)?;
                    was_carving = true;
                }
                _ => continue,
            }
        }

        let now = Instant::now();
        scheduler.run_due(now, &mut session);
        scheduler.run_frame(now, &mut session);

        let carving_now = session.active_carve().is_some();
        if was_carving && !carving_now {
            if let Some(grid) = session.grid() {
                println!("{}", grid);
            }
        }
        was_carving = carving_now;
    }

    Ok(())
}
