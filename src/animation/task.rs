//! Animation task configuration, timing, and cancellable handles.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use web_time::Duration;

use crate::error::MotifError;
use crate::registry::Disposable;
use crate::util::easing::EasingFunction;

/// How many times a task plays after its first cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play `n` additional cycles (0 plays once).
    Count(u32),
    /// Loop until cancelled. Such a task never completes on its own.
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

/// Lifecycle of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Created, waiting for its delay to elapse.
    Pending,
    /// Writing interpolated values each frame.
    Running,
    /// Reached its final value naturally.
    Completed,
    /// Stopped before completion. No further writes happen.
    Cancelled,
}

impl TaskStatus {
    /// Whether the task can still write to its target.
    pub fn is_live(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

/// Timing parameters for a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Length of one cycle.
    pub duration: Duration,
    /// Easing applied within each cycle.
    pub ease: EasingFunction,
    /// Wait before the first cycle starts.
    pub delay: Duration,
    /// Extra delay per item index when started as a batch.
    pub stagger: Duration,
    /// Additional cycles after the first.
    pub repeat: Repeat,
    /// Play every other cycle backwards.
    pub yoyo: bool,
    /// Write the start values when the task is created instead of when
    /// its delay runs out. `None` lets the effect decide.
    pub immediate_render: Option<bool>,
    /// Optional name for logging.
    pub name: Option<String>,
}

impl TaskConfig {
    /// Config with the given cycle duration and default easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Set the easing curve.
    #[must_use]
    pub fn ease(mut self, ease: EasingFunction) -> Self {
        self.ease = ease;
        self
    }

    /// Set the start delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the per-item batch stagger.
    #[must_use]
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Set the repeat count.
    #[must_use]
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Enable or disable yoyo playback.
    #[must_use]
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Force or suppress writing the start values at creation.
    #[must_use]
    pub fn immediate_render(mut self, immediate: bool) -> Self {
        self.immediate_render = Some(immediate);
        self
    }

    /// Name the task.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Delay for the `index`-th item of a batch.
    pub fn delay_for(&self, index: usize) -> Duration {
        self.delay + self.stagger * index as u32
    }

    /// Interpolation state after `elapsed` time of active playback.
    pub fn sample(&self, elapsed: Duration) -> Sample {
        let cycle_secs = self.duration.as_secs_f64();
        let total_cycles = match self.repeat {
            Repeat::Count(n) => Some(u64::from(n) + 1),
            Repeat::Infinite => None,
        };

        if cycle_secs == 0.0 {
            // Zero-length cycles jump straight to their end.
            return match total_cycles {
                Some(total) => self.final_sample(total),
                None => self.cycle_sample(0, 1.0, false),
            };
        }

        let position = elapsed.as_secs_f64() / cycle_secs;
        let cycle = position.floor() as u64;
        if let Some(total) = total_cycles {
            if cycle >= total {
                return self.final_sample(total);
            }
        }
        let local = (position - cycle as f64) as f32;
        self.cycle_sample(cycle, local, false)
    }

    fn final_sample(&self, total_cycles: u64) -> Sample {
        self.cycle_sample(total_cycles - 1, 1.0, true)
    }

    fn cycle_sample(&self, cycle: u64, raw_t: f32, finished: bool) -> Sample {
        let reversed = self.yoyo && cycle % 2 == 1;
        let eased_t = if reversed {
            self.ease.evaluate(1.0 - raw_t)
        } else {
            self.ease.evaluate(raw_t)
        };
        Sample {
            cycle,
            raw_t,
            eased_t,
            reversed,
            finished,
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            ease: EasingFunction::DEFAULT,
            delay: Duration::ZERO,
            stagger: Duration::ZERO,
            repeat: Repeat::default(),
            yoyo: false,
            immediate_render: None,
            name: None,
        }
    }
}

/// Interpolation state of a task at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Zero-based cycle index.
    pub cycle: u64,
    /// Progress within the cycle, monotonic in `[0, 1]`.
    pub raw_t: f32,
    /// Eased value passed to the effect, direction already applied.
    pub eased_t: f32,
    /// Whether this cycle plays backwards (yoyo).
    pub reversed: bool,
    /// Whether the task has played all its cycles.
    pub finished: bool,
}

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// State shared between a task in the runtime and its handles.
#[derive(Debug)]
pub(crate) struct TaskControl {
    id: TaskId,
    name: Option<String>,
    status: Cell<TaskStatus>,
}

/// Cancellable reference to a started task.
///
/// Handles are cheap to clone and never borrow the runtime, so they can be
/// cancelled from anywhere, including from inside other callbacks.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    control: Rc<TaskControl>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: Option<String>) -> Self {
        Self {
            control: Rc::new(TaskControl {
                id,
                name,
                status: Cell::new(TaskStatus::Pending),
            }),
        }
    }

    /// Task identifier.
    pub fn id(&self) -> TaskId {
        self.control.id
    }

    /// Task name, if one was configured.
    pub fn name(&self) -> Option<&str> {
        self.control.name.as_deref()
    }

    /// Current status.
    pub fn status(&self) -> TaskStatus {
        self.control.status.get()
    }

    /// Whether the task can still write to its target.
    pub fn is_live(&self) -> bool {
        self.status().is_live()
    }

    /// Stop the task at its current progress.
    ///
    /// Idempotent. Once this returns the task never writes again; the
    /// runtime drops it on its next tick. Returns whether this call did
    /// the cancelling.
    pub fn cancel(&self) -> bool {
        if self.is_live() {
            self.control.status.set(TaskStatus::Cancelled);
            log::debug!("{} cancelled", self.label());
            true
        } else {
            false
        }
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.control.status.set(status);
    }

    /// Whether two handles refer to the same task.
    pub fn same_task(&self, other: &TaskHandle) -> bool {
        Rc::ptr_eq(&self.control, &other.control)
    }

    fn label(&self) -> String {
        match &self.control.name {
            Some(name) => format!("{} ({name})", self.control.id),
            None => self.control.id.to_string(),
        }
    }
}

impl Disposable for TaskHandle {
    fn label(&self) -> String {
        TaskHandle::label(self)
    }

    fn is_live(&self) -> bool {
        TaskHandle::is_live(self)
    }

    fn dispose(&self) -> Result<(), MotifError> {
        let _ = self.cancel();
        Ok(())
    }

    fn resource_key(&self) -> Option<usize> {
        Some(Rc::as_ptr(&self.control) as usize)
    }
}
