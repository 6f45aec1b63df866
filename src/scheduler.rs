use std::time::{Duration, Instant};

use smallvec::SmallVec;

/// What a repeating task wants after a step: keep its slot on the timer or
/// self-cancel.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum TaskStatus {
    Continue,
    Finished,
}

/// Opaque handle for cancelling a scheduled task. Cancelling a handle whose
/// task already finished is a no-op.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CancelHandle(u64);

pub type StepFn<Ctx> = Box<dyn FnMut(&mut Ctx) -> TaskStatus>;
pub type FrameFn<Ctx> = Box<dyn FnMut(&mut Ctx, FrameTiming)>;

/// Timing of the current display frame relative to the previous one.
#[derive(Copy, Clone, Debug)]
pub struct FrameTiming {
    pub delta: Option<Duration>,
}

impl FrameTiming {
    /// Instantaneous frames-per-second figure from the time between the two
    /// most recent frames. `None` on the very first frame or a zero delta.
    pub fn fps(&self) -> Option<f64> {
        self.delta.and_then(|delta| {
            let seconds = delta.as_secs() as f64 + f64::from(delta.subsec_nanos()) * 1e-9;
            if seconds > 0.0 {
                Some(1.0 / seconds)
            } else {
                None
            }
        })
    }
}

struct RepeatingTask<Ctx> {
    id: u64,
    interval: Duration,
    next_due: Instant,
    step: StepFn<Ctx>,
}

struct FrameTask<Ctx> {
    id: u64,
    frame: FrameFn<Ctx>,
}

/// Single-threaded cooperative scheduler: interval-driven step functions plus
/// per-display-frame callbacks, decoupled from any runtime timer primitive.
///
/// The owner drives it from its own loop by calling `run_due` and `run_frame`
/// with the current time. Tasks only receive the context value, never the
/// scheduler itself, so a step can neither reschedule nor observe other
/// tasks - cancellation from the outside goes through a `CancelHandle`, and a
/// task stops itself by returning `TaskStatus::Finished`.
pub struct Scheduler<Ctx> {
    next_task_id: u64,
    repeating: Vec<RepeatingTask<Ctx>>,
    frame_tasks: Vec<FrameTask<Ctx>>,
    previous_frame: Option<Instant>,
}

impl<Ctx> Scheduler<Ctx> {
    pub fn new() -> Scheduler<Ctx> {
        Scheduler {
            next_task_id: 0,
            repeating: Vec::new(),
            frame_tasks: Vec::new(),
            previous_frame: None,
        }
    }

    /// Schedule `step` to run once every `interval`, first firing one whole
    /// interval after `now`. The interval must be non-zero - zero intervals
    /// are rejected before they get here (`ErrorKind::InvalidInterval`).
    pub fn schedule_repeating(&mut self,
                              now: Instant,
                              interval: Duration,
                              step: StepFn<Ctx>)
                              -> CancelHandle {
        let id = self.fresh_task_id();
        self.repeating.push(RepeatingTask {
            id,
            interval,
            next_due: now + interval,
            step,
        });
        CancelHandle(id)
    }

    /// Schedule `frame` to run on every display frame, for the lifetime of
    /// the scheduler or until cancelled.
    pub fn schedule_every_frame(&mut self, frame: FrameFn<Ctx>) -> CancelHandle {
        let id = self.fresh_task_id();
        self.frame_tasks.push(FrameTask { id, frame });
        CancelHandle(id)
    }

    pub fn cancel(&mut self, handle: CancelHandle) {
        self.repeating.retain(|task| task.id != handle.0);
        self.frame_tasks.retain(|task| task.id != handle.0);
    }

    pub fn is_scheduled(&self, handle: CancelHandle) -> bool {
        self.repeating.iter().any(|task| task.id == handle.0)
            || self.frame_tasks.iter().any(|task| task.id == handle.0)
    }

    /// Fire every repeating task as many times as whole intervals have
    /// elapsed, so a stalled loop catches up rather than silently slowing the
    /// tick rate. A task that reports Finished is dropped immediately and
    /// fires no further catch-up steps.
    pub fn run_due(&mut self, now: Instant, ctx: &mut Ctx) {
        let mut finished: SmallVec<[u64; 2]> = SmallVec::new();

        for task in &mut self.repeating {
            while task.next_due <= now {
                task.next_due += task.interval;
                if (task.step)(ctx) == TaskStatus::Finished {
                    finished.push(task.id);
                    break;
                }
            }
        }

        if !finished.is_empty() {
            self.repeating.retain(|task| !finished.contains(&task.id));
        }
    }

    /// Run every per-frame callback once, passing the time elapsed since the
    /// previous `run_frame` call.
    pub fn run_frame(&mut self, now: Instant, ctx: &mut Ctx) {
        let timing = FrameTiming {
            delta: self.previous_frame.map(|previous| now - previous),
        };
        self.previous_frame = Some(now);

        for task in &mut self.frame_tasks {
            (task.frame)(ctx, timing);
        }
    }

    fn fresh_task_id(&mut self) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        id
    }
}

impl<Ctx> Default for Scheduler<Ctx> {
    fn default() -> Scheduler<Ctx> {
        Scheduler::new()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[derive(Default)]
    struct Counters {
        ticks: usize,
        frames: usize,
        last_fps: Option<f64>,
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn repeating_task_does_not_fire_before_its_interval() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        scheduler.schedule_repeating(start, millis(10), Box::new(|counters: &mut Counters| {
            counters.ticks += 1;
            TaskStatus::Continue
        }));

        scheduler.run_due(start, &mut counters);
        scheduler.run_due(start + millis(9), &mut counters);
        assert_eq!(counters.ticks, 0);

        scheduler.run_due(start + millis(10), &mut counters);
        assert_eq!(counters.ticks, 1);
    }

    #[test]
    fn repeating_task_catches_up_on_missed_intervals() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        scheduler.schedule_repeating(start, millis(10), Box::new(|counters: &mut Counters| {
            counters.ticks += 1;
            TaskStatus::Continue
        }));

        scheduler.run_due(start + millis(35), &mut counters);
        assert_eq!(counters.ticks, 3);

        scheduler.run_due(start + millis(40), &mut counters);
        assert_eq!(counters.ticks, 4);
    }

    #[test]
    fn cancelled_task_never_fires_again() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        let handle = scheduler.schedule_repeating(start,
                                                  millis(10),
                                                  Box::new(|counters: &mut Counters| {
            counters.ticks += 1;
            TaskStatus::Continue
        }));

        scheduler.run_due(start + millis(10), &mut counters);
        assert_eq!(counters.ticks, 1);
        assert!(scheduler.is_scheduled(handle));

        scheduler.cancel(handle);
        assert!(!scheduler.is_scheduled(handle));
        scheduler.run_due(start + millis(100), &mut counters);
        assert_eq!(counters.ticks, 1);
    }

    #[test]
    fn finished_task_is_removed_and_stops_catching_up() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        let handle = scheduler.schedule_repeating(start,
                                                  millis(10),
                                                  Box::new(|counters: &mut Counters| {
            counters.ticks += 1;
            if counters.ticks == 2 {
                TaskStatus::Finished
            } else {
                TaskStatus::Continue
            }
        }));

        // 5 intervals are due but the task finishes itself on the second
        scheduler.run_due(start + millis(50), &mut counters);
        assert_eq!(counters.ticks, 2);
        assert!(!scheduler.is_scheduled(handle));

        scheduler.run_due(start + millis(100), &mut counters);
        assert_eq!(counters.ticks, 2);
    }

    #[test]
    fn independent_tasks_have_independent_intervals() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut slow_and_fast = (0usize, 0usize);

        scheduler.schedule_repeating(start, millis(30), Box::new(|counts: &mut (usize, usize)| {
            counts.0 += 1;
            TaskStatus::Continue
        }));
        scheduler.schedule_repeating(start, millis(10), Box::new(|counts: &mut (usize, usize)| {
            counts.1 += 1;
            TaskStatus::Continue
        }));

        scheduler.run_due(start + millis(30), &mut slow_and_fast);
        assert_eq!(slow_and_fast, (1, 3));
    }

    #[test]
    fn frame_tasks_see_the_instantaneous_fps() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        scheduler.schedule_every_frame(Box::new(|counters: &mut Counters, timing: FrameTiming| {
            counters.frames += 1;
            counters.last_fps = timing.fps();
        }));

        scheduler.run_frame(start, &mut counters);
        assert_eq!(counters.frames, 1);
        assert!(counters.last_fps.is_none());

        scheduler.run_frame(start + millis(20), &mut counters);
        assert_eq!(counters.frames, 2);
        let fps = counters.last_fps.expect("a second frame has a delta");
        assert!((fps - 50.0).abs() < 0.001);
    }

    #[test]
    fn frame_tasks_can_be_cancelled() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut counters = Counters::default();

        let handle = scheduler.schedule_every_frame(Box::new(|counters: &mut Counters, _| {
            counters.frames += 1;
        }));

        scheduler.run_frame(start, &mut counters);
        scheduler.cancel(handle);
        scheduler.run_frame(start + millis(16), &mut counters);
        assert_eq!(counters.frames, 1);
    }
}
