//! **mazecarve** is an animated maze carving and visualisation library.
//!
//! A `Grid` of walled cells is carved into a perfect maze by a `Carver` that
//! performs one randomized depth-first-search step at a time, so the carving
//! can be animated on a timer. The `Scheduler` decouples the stepping and the
//! per-frame redraw from any particular runtime's timer primitives.

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod renderers;
pub mod scheduler;
pub mod session;
pub mod sdl;
pub mod units;
