//! Timelines: tasks sequenced against one shared start.
//!
//! A [`Timeline`] is built up front and then played through
//! [`AnimationController::play`](crate::controller::AnimationController::play).
//! Each step becomes an ordinary task delayed by its offset into the
//! timeline, so pausing, reduced motion and teardown behave exactly as
//! they do for single tasks.

use std::fmt;
use std::rc::Rc;

use web_time::Duration;

use super::effect::{Effect, Tween};
use super::property::PropertyValues;
use super::target::{IntoTargetRef, TargetRef};
use super::task::{Repeat, TaskConfig, TaskHandle, TaskStatus};
use crate::error::MotifError;
use crate::registry::Disposable;

/// Where a step sits on its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// When the previous step ends, plus a gap.
    AfterPrevious(Duration),
    /// When the previous step starts, plus an offset.
    WithPrevious(Duration),
    /// At a fixed offset from the start of the timeline.
    At(Duration),
}

impl Default for Position {
    fn default() -> Self {
        Position::AfterPrevious(Duration::ZERO)
    }
}

struct Step {
    target: TargetRef,
    effect: Box<dyn Effect>,
    config: TaskConfig,
    offset: Duration,
}

/// An ordered set of steps played as one unit.
///
/// Steps on the same element do not overwrite each other the way
/// separately started tasks do, so a timeline can move an element out
/// and back again. Only the first step on an element writes its start
/// values up front; later ones pick up from wherever the element is when
/// their turn comes, unless their config says otherwise.
#[derive(Default)]
pub struct Timeline {
    steps: Vec<Step>,
    last_start: Duration,
    last_end: Duration,
    end: Duration,
}

impl Timeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step after the previous one.
    #[must_use]
    pub fn add(
        self,
        target: &impl IntoTargetRef,
        effect: impl Effect + 'static,
        config: TaskConfig,
    ) -> Self {
        self.add_at(Position::default(), target, effect, config)
    }

    /// Insert a step at `position`.
    #[must_use]
    pub fn add_at(
        mut self,
        position: Position,
        target: &impl IntoTargetRef,
        effect: impl Effect + 'static,
        mut config: TaskConfig,
    ) -> Self {
        let target = target.target_ref();
        let offset = match position {
            Position::AfterPrevious(gap) => self.last_end + gap,
            Position::WithPrevious(shift) => self.last_start + shift,
            Position::At(at) => at,
        };
        if config.immediate_render.is_none()
            && self.steps.iter().any(|s| s.target.ptr_eq(&target))
        {
            config.immediate_render = Some(false);
        }

        self.last_start = offset;
        self.last_end = offset + span(&config);
        self.end = self.end.max(self.last_end);
        self.steps.push(Step {
            target,
            effect: Box::new(effect),
            config,
            offset,
        });
        self
    }

    /// Append a tween between explicit values.
    #[must_use]
    pub fn from_to(
        self,
        target: &impl IntoTargetRef,
        from: PropertyValues,
        to: PropertyValues,
        config: TaskConfig,
    ) -> Self {
        self.add(target, Tween::from_to(from, to), config)
    }

    /// Append a tween from wherever the element is when the step starts.
    #[must_use]
    pub fn to(self, target: &impl IntoTargetRef, to: PropertyValues, config: TaskConfig) -> Self {
        self.add(target, Tween::to(to), config)
    }

    /// Time from the start until the last finite step ends. An infinite
    /// step counts as one cycle.
    pub fn duration(&self) -> Duration {
        self.end
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the timeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps as tasks, each delayed by its offset.
    pub(crate) fn into_steps(
        self,
    ) -> impl Iterator<Item = (TargetRef, Box<dyn Effect>, TaskConfig)> {
        self.steps.into_iter().map(|step| {
            let config = TaskConfig {
                delay: step.offset + step.config.delay,
                stagger: Duration::ZERO,
                ..step.config
            };
            (step.target, step.effect, config)
        })
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("steps", &self.steps.len())
            .field("duration", &self.end)
            .finish()
    }
}

/// Length of a step on its timeline, delay included.
fn span(config: &TaskConfig) -> Duration {
    let cycles = match config.repeat {
        Repeat::Count(n) => n.saturating_add(1),
        Repeat::Infinite => 1,
    };
    config.delay
        + config
            .duration
            .checked_mul(cycles)
            .unwrap_or(Duration::MAX)
}

/// Handle to a playing timeline.
#[derive(Debug, Clone)]
pub struct TimelineHandle {
    tasks: Rc<[TaskHandle]>,
}

impl TimelineHandle {
    pub(crate) fn new(tasks: Vec<TaskHandle>) -> Self {
        Self {
            tasks: tasks.into(),
        }
    }

    /// One handle per step, in the order the steps were added.
    pub fn tasks(&self) -> &[TaskHandle] {
        &self.tasks
    }

    /// Whether any step can still write.
    pub fn is_live(&self) -> bool {
        self.tasks.iter().any(TaskHandle::is_live)
    }

    /// Whether every step ran to its end.
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.status() == TaskStatus::Completed)
    }

    /// Cancel every step. Returns whether any step was still live.
    pub fn kill(&self) -> bool {
        self.tasks
            .iter()
            .fold(false, |killed, task| task.cancel() || killed)
    }
}

impl Disposable for TimelineHandle {
    fn label(&self) -> String {
        format!("timeline ({} steps)", self.tasks.len())
    }

    fn is_live(&self) -> bool {
        TimelineHandle::is_live(self)
    }

    fn dispose(&self) -> Result<(), MotifError> {
        let _ = self.kill();
        Ok(())
    }

    fn resource_key(&self) -> Option<usize> {
        Some(Rc::as_ptr(&self.tasks).cast::<TaskHandle>() as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::animation::Property;
    use crate::controller::AnimationController;
    use crate::headless::{ManualClock, RecordingTarget};
    use crate::options::MotionOptions;
    use crate::policy::MotionPolicy;
    use crate::util::easing::EasingFunction;

    fn linear(ms: u64) -> TaskConfig {
        TaskConfig::new(Duration::from_millis(ms)).ease(EasingFunction::Linear)
    }

    fn controller(reduce: bool) -> (AnimationController, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let ctrl = AnimationController::new(
            MotionOptions::default(),
            MotionPolicy::fixed(reduce),
            clock.clone(),
        );
        (ctrl, clock)
    }

    #[test]
    fn positions_place_steps() {
        let target = Rc::new(RecordingTarget::new());
        let timeline = Timeline::new()
            .to(&target, PropertyValues::new().x(10.0), linear(100))
            .to(&target, PropertyValues::new().y(10.0), linear(200))
            .add_at(
                Position::WithPrevious(Duration::from_millis(50)),
                &target,
                Tween::to(PropertyValues::new().scale(2.0)),
                linear(100),
            )
            .add_at(
                Position::AfterPrevious(Duration::from_millis(25)),
                &target,
                Tween::to(PropertyValues::new().rotate(90.0)),
                linear(100).repeat(Repeat::Count(1)),
            );
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.duration(), Duration::from_millis(475));

        let delays: Vec<_> = timeline.into_steps().map(|(_, _, c)| c.delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(150),
                Duration::from_millis(275),
            ]
        );
    }

    #[test]
    fn steps_play_in_sequence() {
        let (ctrl, clock) = controller(false);
        let target = Rc::new(RecordingTarget::new());
        let handle = ctrl.play(
            Timeline::new()
                .from_to(
                    &target,
                    PropertyValues::new().opacity(0.0),
                    PropertyValues::new().opacity(1.0),
                    linear(100),
                )
                .to(&target, PropertyValues::new().opacity(0.5), linear(100)),
        );
        assert_eq!(target.value(Property::Opacity), Some(0.0));

        clock.advance(Duration::from_millis(100));
        assert!(ctrl.tick());
        assert_eq!(target.value(Property::Opacity), Some(1.0));
        assert!(handle.is_live());

        clock.advance(Duration::from_millis(50));
        let _ = ctrl.tick();
        assert!((target.value(Property::Opacity).unwrap() - 0.75).abs() < 1e-4);

        clock.advance(Duration::from_millis(50));
        assert!(!ctrl.tick());
        assert_eq!(target.value(Property::Opacity), Some(0.5));
        assert!(handle.is_complete());
    }

    #[test]
    fn replacing_a_named_timeline_kills_the_old_one() {
        let (ctrl, clock) = controller(false);
        let target = Rc::new(RecordingTarget::new());
        let first = ctrl.register_animation(
            "intro",
            ctrl.play(Timeline::new().to(&target, PropertyValues::new().x(50.0), linear(500))),
        );
        clock.advance(Duration::from_millis(100));
        let _ = ctrl.tick();

        let second = ctrl.register_animation(
            "intro",
            ctrl.play(Timeline::new().to(&target, PropertyValues::new().y(50.0), linear(500))),
        );
        assert!(!first.is_live());
        assert!(second.is_live());

        let x = target.value(Property::X);
        clock.advance(Duration::from_millis(500));
        let _ = ctrl.tick();
        assert_eq!(target.value(Property::X), x);
        assert_eq!(target.value(Property::Y), Some(50.0));
    }

    #[test]
    fn reduced_motion_lands_on_the_final_state() {
        let (ctrl, _clock) = controller(true);
        let target = Rc::new(RecordingTarget::new());
        let handle = ctrl.play(
            Timeline::new()
                .to(&target, PropertyValues::new().x(100.0), linear(300))
                .to(&target, PropertyValues::new().x(20.0), linear(300)),
        );
        assert!(handle.is_complete());
        assert_eq!(target.value(Property::X), Some(20.0));
        assert!(!ctrl.tick());
    }

    #[test]
    fn kill_cancels_every_step() {
        let (ctrl, clock) = controller(false);
        let target = Rc::new(RecordingTarget::new());
        let handle = ctrl.play(
            Timeline::new()
                .to(&target, PropertyValues::new().x(10.0), linear(100))
                .to(&target, PropertyValues::new().y(10.0), linear(100)),
        );
        assert!(handle.kill());
        assert!(!handle.kill());
        assert!(handle.tasks().iter().all(|t| t.status() == TaskStatus::Cancelled));
        clock.advance(Duration::from_millis(50));
        assert!(!ctrl.tick());
        assert_eq!(target.write_count(), 0);
    }
}
