use std::time::{Duration, Instant};

use error_chain::bail;

use crate::errors::*;
use crate::generators::{CarveState, Carver};
use crate::grid::Grid;
use crate::scheduler::{CancelHandle, Scheduler, TaskStatus};
use crate::units::{Height, Width};

/// The application's maze state: the grid being carved, the carver walking
/// it, and the handle of the in-flight carve ticker.
///
/// Everything the animation callbacks need lives here and is passed to them
/// by reference, there is no ambient global state. At most one carve runs at
/// a time: a new request always cancels the previous ticker before touching
/// grid or path state.
pub struct MazeSession {
    grid: Option<Grid>,
    carver: Carver,
    carve_task: Option<CancelHandle>,
}

impl MazeSession {
    pub fn new() -> MazeSession {
        MazeSession::with_carver(Carver::new())
    }

    /// A session around a caller supplied carver, e.g. one with a fixed RNG
    /// seed.
    pub fn with_carver(carver: Carver) -> MazeSession {
        MazeSession {
            grid: None,
            carver,
            carve_task: None,
        }
    }

    /// The grid currently on display, if any generate request has been made.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn carve_state(&self) -> CarveState {
        self.carver.state()
    }

    /// The ticker handle of an in-flight carve. `None` once carving finishes
    /// or before the first request.
    pub fn active_carve(&self) -> Option<CancelHandle> {
        self.carve_task
    }

    /// Handle a generate request: validate the inputs, cancel any in-flight
    /// carve, replace the grid outright and schedule a fresh carve ticker at
    /// the requested interval.
    ///
    /// Validation happens before cancellation, so a rejected request leaves a
    /// previous carve animating untouched.
    pub fn request_maze(&mut self,
                        scheduler: &mut Scheduler<MazeSession>,
                        now: Instant,
                        width: Width,
                        height: Height,
                        tick: Duration)
                        -> Result<()> {
        if tick == Duration::new(0, 0) {
            bail!(ErrorKind::InvalidInterval(0));
        }
        let mut grid = Grid::new(width, height)?;

        if let Some(task) = self.carve_task.take() {
            scheduler.cancel(task);
        }

        self.carver.start(&mut grid);
        self.grid = Some(grid);
        self.carve_task = Some(scheduler.schedule_repeating(
            now,
            tick,
            Box::new(|session: &mut MazeSession| session.carve_tick()),
        ));

        Ok(())
    }

    /// One carve ticker firing: advance the carver a single step and report
    /// whether the ticker should stay scheduled.
    pub fn carve_tick(&mut self) -> TaskStatus {
        let state = match self.grid.as_mut() {
            Some(grid) => self.carver.step(grid),
            None => CarveState::Done,
        };

        if state == CarveState::Carving {
            TaskStatus::Continue
        } else {
            self.carve_task = None;
            TaskStatus::Finished
        }
    }
}

impl Default for MazeSession {
    fn default() -> MazeSession {
        MazeSession::new()
    }
}
