//! The animation runtime advances every live task once per frame.

use std::rc::Rc;

use web_time::{Duration, Instant};

use super::effect::Effect;
use super::target::{live_target, TargetRef};
use super::task::{Repeat, TaskConfig, TaskHandle, TaskId, TaskStatus};
use crate::policy::MotionPolicy;

/// A task owned by the runtime.
struct AnimationTask {
    handle: TaskHandle,
    target: TargetRef,
    effect: Box<dyn Effect>,
    config: TaskConfig,
    /// When the task was created; playback starts after `delay`.
    created: Instant,
    /// Total time the task spent paused.
    paused_for: Duration,
    begun: bool,
    /// Tasks of one timeline never overwrite each other.
    group: Option<u64>,
}

impl AnimationTask {
    /// Active playback time at `now`, or `None` while still delayed.
    fn active_elapsed(&self, now: Instant) -> Option<Duration> {
        let elapsed = now
            .saturating_duration_since(self.created)
            .saturating_sub(self.paused_for);
        elapsed.checked_sub(self.config.delay)
    }
}

/// Drives tasks: delays, staggering, repeat/yoyo cycles, overwrite, and
/// cooperative cancellation.
///
/// Single-threaded. Tasks are stored in creation order; cancelled and
/// finished tasks are dropped on the next [`tick`](Self::tick).
/// Targets must not call back into the runtime from their write methods.
pub struct AnimationRuntime {
    tasks: Vec<AnimationTask>,
    next_id: u64,
    next_group: u64,
    paused_at: Option<Instant>,
    policy: Rc<MotionPolicy>,
}

impl AnimationRuntime {
    /// Runtime consulting `policy` before every task start.
    pub fn new(policy: Rc<MotionPolicy>) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            next_group: 0,
            paused_at: None,
            policy,
        }
    }

    /// The reduced-motion policy in effect.
    pub fn policy(&self) -> &Rc<MotionPolicy> {
        &self.policy
    }

    /// Start a task on `target` at `now`.
    ///
    /// Missing or detached targets produce an already-cancelled handle.
    /// Under reduced motion the end state is written immediately: finite
    /// tasks complete, infinite ones are cancelled. Either way the new task
    /// takes its channels away from older tasks on the same target.
    pub fn start(
        &mut self,
        target: TargetRef,
        effect: Box<dyn Effect>,
        config: TaskConfig,
        now: Instant,
    ) -> TaskHandle {
        self.spawn(target, effect, config, now, None)
    }

    /// Start tasks that belong together, such as the steps of a timeline.
    ///
    /// Members overwrite older tasks but never each other, so a later step
    /// can animate a property an earlier step animated before it.
    pub fn start_group(
        &mut self,
        steps: impl IntoIterator<Item = (TargetRef, Box<dyn Effect>, TaskConfig)>,
        now: Instant,
    ) -> Vec<TaskHandle> {
        self.next_group += 1;
        let group = Some(self.next_group);
        steps
            .into_iter()
            .map(|(target, effect, config)| self.spawn(target, effect, config, now, group))
            .collect()
    }

    fn spawn(
        &mut self,
        target: TargetRef,
        mut effect: Box<dyn Effect>,
        config: TaskConfig,
        now: Instant,
        group: Option<u64>,
    ) -> TaskHandle {
        let handle = self.next_handle(&config);

        let Some(element) = live_target(&target) else {
            handle.set_status(TaskStatus::Cancelled);
            log::debug!("{}: target missing, nothing to animate", handle.id());
            return handle;
        };

        self.overwrite(&target, effect.as_ref(), group);

        if self.policy.should_reduce_motion() {
            effect.begin(element.as_ref());
            effect.render(element.as_ref(), 1.0);
            let status = match config.repeat {
                Repeat::Infinite => TaskStatus::Cancelled,
                Repeat::Count(_) => TaskStatus::Completed,
            };
            handle.set_status(status);
            log::debug!("{}: reduced motion, applied end state", handle.id());
            return handle;
        }

        let immediate = config
            .immediate_render
            .unwrap_or_else(|| effect.renders_immediately());
        if immediate {
            // Delayed items sit at their start values until they play.
            effect.begin(element.as_ref());
            effect.render(element.as_ref(), 0.0);
        }

        log::debug!(
            "{} started: {} over {:?} ({})",
            handle.id(),
            effect.name(),
            config.duration,
            config.ease
        );
        self.tasks.push(AnimationTask {
            handle: handle.clone(),
            target,
            effect,
            config,
            created: now,
            paused_for: Duration::ZERO,
            begun: immediate,
            group,
        });
        handle
    }

    /// Start one task per target, delaying item `i` by `stagger * i`.
    pub fn start_batch(
        &mut self,
        targets: &[TargetRef],
        mut make_effect: impl FnMut(usize) -> Box<dyn Effect>,
        config: &TaskConfig,
        now: Instant,
    ) -> Vec<TaskHandle> {
        targets
            .iter()
            .enumerate()
            .map(|(i, target)| {
                let item = TaskConfig {
                    delay: config.delay_for(i),
                    stagger: Duration::ZERO,
                    ..config.clone()
                };
                self.start(target.clone(), make_effect(i), item, now)
            })
            .collect()
    }

    /// Cancel a task. Idempotent; returns whether it was still live.
    pub fn cancel(&mut self, handle: &TaskHandle) -> bool {
        handle.cancel()
    }

    /// Cancel every live task.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.handle.cancel();
        }
    }

    /// Freeze all task clocks at `now`.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Resume after [`pause`](Self::pause); tasks continue where they froze.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            let frozen = now.saturating_duration_since(paused_at);
            for task in &mut self.tasks {
                // Tasks created while paused only missed the part after
                // their creation.
                let missed = if task.created > paused_at {
                    now.saturating_duration_since(task.created)
                } else {
                    frozen
                };
                task.paused_for += missed;
            }
        }
    }

    /// Whether the runtime is paused.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Number of tasks still pending or running.
    pub fn live_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.handle.is_live()).count()
    }

    /// Whether a task is held by the runtime and live.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks
            .iter()
            .any(|t| t.handle.id() == id && t.handle.is_live())
    }

    /// Advance every task to `now` and write its frame.
    ///
    /// Returns `true` if tasks remain and another frame is needed. A paused
    /// runtime needs no frames until [`resume`](Self::resume).
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.paused_at.is_some() {
            return false;
        }

        for task in &mut self.tasks {
            if !task.handle.is_live() {
                continue;
            }
            let Some(elapsed) = task.active_elapsed(now) else {
                continue;
            };
            let Some(element) = live_target(&task.target) else {
                let _ = task.handle.cancel();
                continue;
            };

            if !task.begun {
                task.effect.begin(element.as_ref());
                task.begun = true;
            }
            if task.handle.status() == TaskStatus::Pending {
                task.handle.set_status(TaskStatus::Running);
            }

            let sample = task.config.sample(elapsed);
            task.effect.render(element.as_ref(), sample.eased_t);
            if sample.finished {
                task.handle.set_status(TaskStatus::Completed);
                log::debug!("{} completed", task.handle.id());
            }
        }

        self.tasks.retain(|t| t.handle.is_live());
        !self.tasks.is_empty()
    }

    fn next_handle(&mut self, config: &TaskConfig) -> TaskHandle {
        self.next_id += 1;
        TaskHandle::new(TaskId(self.next_id), config.name.clone())
    }

    /// Strip the channels `effect` writes from older tasks on `target`.
    /// The newest task wins; older tasks left with nothing are cancelled.
    fn overwrite(&mut self, target: &TargetRef, effect: &dyn Effect, group: Option<u64>) {
        let channels = effect.channels();
        for task in &mut self.tasks {
            if !task.handle.is_live() || !task.target.ptr_eq(target) {
                continue;
            }
            if group.is_some() && task.group == group {
                continue;
            }
            let claimed: Vec<_> = task
                .effect
                .channels()
                .into_iter()
                .filter(|c| channels.contains(c))
                .collect();
            if claimed.is_empty() {
                continue;
            }
            let mut remaining = true;
            for channel in claimed {
                remaining = task.effect.release(channel);
            }
            if !remaining {
                let _ = task.handle.cancel();
            }
        }
    }
}

impl std::fmt::Debug for AnimationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRuntime")
            .field("tasks", &self.tasks.len())
            .field("paused", &self.paused_at.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::effect::Tween;
    use crate::animation::property::{Property, PropertyValues};
    use crate::animation::target::IntoTargetRef;
    use crate::headless::RecordingTarget;
    use crate::options::PolicyOptions;
    use crate::policy::MotionEnvironment;
    use crate::util::easing::EasingFunction;

    fn runtime(reduce: bool) -> AnimationRuntime {
        AnimationRuntime::new(Rc::new(MotionPolicy::fixed(reduce)))
    }

    fn fade_in() -> Box<dyn Effect> {
        Box::new(Tween::from_to(
            PropertyValues::new().opacity(0.0),
            PropertyValues::new().opacity(1.0),
        ))
    }

    fn linear(ms: u64) -> TaskConfig {
        TaskConfig::new(Duration::from_millis(ms)).ease(EasingFunction::Linear)
    }

    #[test]
    fn task_runs_to_completion() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let handle = rt.start(target.target_ref(), fade_in(), linear(100), start);
        assert_eq!(handle.status(), TaskStatus::Pending);

        assert!(rt.tick(start + Duration::from_millis(50)));
        assert_eq!(handle.status(), TaskStatus::Running);
        let mid = target.value(Property::Opacity).unwrap();
        assert!((mid - 0.5).abs() < 1e-4);

        assert!(!rt.tick(start + Duration::from_millis(100)));
        assert_eq!(handle.status(), TaskStatus::Completed);
        assert_eq!(target.value(Property::Opacity), Some(1.0));
        assert_eq!(rt.live_count(), 0);
    }

    #[test]
    fn cancel_stops_writes_immediately() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let handle = rt.start(target.target_ref(), fade_in(), linear(100), start);
        let _ = rt.tick(start + Duration::from_millis(20));
        let writes = target.write_count();

        assert!(rt.cancel(&handle));
        assert!(!rt.cancel(&handle));
        assert!(!rt.tick(start + Duration::from_millis(60)));
        assert_eq!(target.write_count(), writes);
        assert_eq!(handle.status(), TaskStatus::Cancelled);
    }

    #[test]
    fn infinite_task_never_completes() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let config = linear(200).repeat(Repeat::Infinite).yoyo(true);
        let handle = rt.start(target.target_ref(), fade_in(), config, start);

        for ms in (0..20_000).step_by(170) {
            assert!(rt.tick(start + Duration::from_millis(ms)));
            assert_ne!(handle.status(), TaskStatus::Completed);
        }
        assert!(handle.cancel());
        assert!(!rt.tick(start + Duration::from_secs(30)));
    }

    #[test]
    fn reduced_motion_applies_end_state_immediately() {
        let mut rt = runtime(true);
        let target = Rc::new(RecordingTarget::new());
        let handle = rt.start(target.target_ref(), fade_in(), linear(1000), Instant::now());

        assert_eq!(handle.status(), TaskStatus::Completed);
        assert_eq!(target.write_count(), 1);
        assert_eq!(target.value(Property::Opacity), Some(1.0));
        assert_eq!(rt.live_count(), 0);

        let looping = rt.start(
            target.target_ref(),
            fade_in(),
            linear(1000).repeat(Repeat::Infinite),
            Instant::now(),
        );
        assert_eq!(looping.status(), TaskStatus::Cancelled);
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let weak = target.target_ref();
        drop(target);
        let handle = rt.start(weak, fade_in(), linear(100), Instant::now());
        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(rt.live_count(), 0);

        let detached = Rc::new(RecordingTarget::detached());
        let handle = rt.start(detached.target_ref(), fade_in(), linear(100), Instant::now());
        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(detached.write_count(), 0);
    }

    #[test]
    fn dropped_target_cancels_running_task() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let handle = rt.start(target.target_ref(), fade_in(), linear(100), start);
        drop(target);
        assert!(!rt.tick(start + Duration::from_millis(10)));
        assert_eq!(handle.status(), TaskStatus::Cancelled);
    }

    #[test]
    fn staggered_batch_starts_in_order() {
        let mut rt = runtime(false);
        let targets: Vec<_> = (0..5).map(|_| Rc::new(RecordingTarget::new())).collect();
        let refs: Vec<_> = targets.iter().map(IntoTargetRef::target_ref).collect();
        let start = Instant::now();
        let config = linear(300).stagger(Duration::from_millis(100));
        let handles = rt.start_batch(&refs, |_| fade_in(), &config, start);

        // Every item sits at its start values before its turn comes.
        for target in &targets {
            assert_eq!(target.value(Property::Opacity), Some(0.0));
        }

        for step in 0..=5u64 {
            let now = start + Duration::from_millis(step * 100 + 1);
            let _ = rt.tick(now);
            for (i, handle) in handles.iter().enumerate() {
                let begun = handle.status() != TaskStatus::Pending;
                assert_eq!(begun, (i as u64) <= step, "item {i} at step {step}");
            }
        }
        assert!(handles.iter().all(|h| h.status() != TaskStatus::Pending));
    }

    #[test]
    fn tween_to_waits_for_its_turn() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let config = linear(100).delay(Duration::from_millis(50));
        let _handle = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().x(10.0))),
            config.clone(),
            start,
        );
        assert_eq!(target.write_count(), 0);

        let _forced = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().y(10.0))),
            config.immediate_render(true),
            start,
        );
        assert_eq!(target.write_count(), 1);
        assert_eq!(target.value(Property::Y), Some(0.0));
    }

    #[test]
    fn immediate_render_can_be_turned_off() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let config = linear(100).immediate_render(false);
        let handle = rt.start(target.target_ref(), fade_in(), config, Instant::now());
        assert_eq!(target.write_count(), 0);
        assert_eq!(handle.status(), TaskStatus::Pending);
    }

    #[test]
    fn newer_task_overwrites_shared_properties() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let first = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().x(100.0).opacity(0.5))),
            linear(100),
            start,
        );
        let second = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().x(-100.0))),
            linear(100),
            start,
        );
        assert!(first.is_live(), "opacity is still driven by the first task");

        let _ = rt.tick(start + Duration::from_millis(100));
        assert_eq!(target.value(Property::X), Some(-100.0));
        assert_eq!(target.value(Property::Opacity), Some(0.5));

        let third = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().x(0.0))),
            linear(100),
            start,
        );
        assert!(third.is_live());
        assert_eq!(second.status(), TaskStatus::Completed);
    }

    #[test]
    fn overwrite_cancels_fully_claimed_task() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let first = rt.start(target.target_ref(), fade_in(), linear(100), start);
        let _second = rt.start(target.target_ref(), fade_in(), linear(100), start);
        assert_eq!(first.status(), TaskStatus::Cancelled);
    }

    #[test]
    fn pause_freezes_progress() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let _handle = rt.start(target.target_ref(), fade_in(), linear(100), start);
        let _ = rt.tick(start + Duration::from_millis(25));

        rt.pause(start + Duration::from_millis(25));
        assert!(!rt.tick(start + Duration::from_millis(500)));
        assert!((target.value(Property::Opacity).unwrap() - 0.25).abs() < 1e-4);

        rt.resume(start + Duration::from_millis(1025));
        let _ = rt.tick(start + Duration::from_millis(1050));
        assert!((target.value(Property::Opacity).unwrap() - 0.5).abs() < 1e-4);
        assert!(!rt.is_paused());
    }

    #[test]
    fn paused_runtime_asks_for_no_frames() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let handle = rt.start(target.target_ref(), fade_in(), linear(100), start);
        rt.pause(start);
        assert!(handle.cancel());
        assert!(!rt.tick(start + Duration::from_millis(16)));
        assert!(!rt.tick(start + Duration::from_millis(32)));

        rt.resume(start + Duration::from_millis(40));
        assert!(!rt.tick(start + Duration::from_millis(56)));
        assert_eq!(rt.live_count(), 0);
    }

    struct Toggle(Rc<Cell<bool>>);

    impl MotionEnvironment for Toggle {
        fn prefers_reduced_motion(&self) -> bool {
            self.0.get()
        }

        fn hardware_concurrency(&self) -> Option<u32> {
            None
        }

        fn device_memory_gb(&self) -> Option<f64> {
            None
        }
    }

    #[test]
    fn reduced_start_still_overwrites_running_task() {
        let reduce = Rc::new(Cell::new(false));
        let policy = Rc::new(MotionPolicy::new(
            Toggle(reduce.clone()),
            PolicyOptions::default(),
        ));
        let mut rt = AnimationRuntime::new(policy.clone());
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let running = rt.start(target.target_ref(), fade_in(), linear(1000), start);
        let _ = rt.tick(start + Duration::from_millis(250));
        assert_eq!(running.status(), TaskStatus::Running);

        reduce.set(true);
        assert!(policy.refresh());
        let latest = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().opacity(0.0))),
            linear(1000),
            start + Duration::from_millis(250),
        );
        assert_eq!(latest.status(), TaskStatus::Completed);
        assert_eq!(running.status(), TaskStatus::Cancelled);

        assert!(!rt.tick(start + Duration::from_millis(500)));
        assert_eq!(target.value(Property::Opacity), Some(0.0));
    }

    #[test]
    fn group_members_do_not_overwrite_each_other() {
        let mut rt = runtime(false);
        let target = Rc::new(RecordingTarget::new());
        let start = Instant::now();
        let outside = rt.start(
            target.target_ref(),
            Box::new(Tween::to(PropertyValues::new().x(50.0))),
            linear(1000),
            start,
        );
        let out_and_back: Vec<(TargetRef, Box<dyn Effect>, TaskConfig)> = vec![
            (
                target.target_ref(),
                Box::new(Tween::to(PropertyValues::new().x(100.0))),
                linear(100),
            ),
            (
                target.target_ref(),
                Box::new(Tween::to(PropertyValues::new().x(0.0))),
                linear(100).delay(Duration::from_millis(100)),
            ),
        ];
        let steps = rt.start_group(out_and_back, start);
        assert_eq!(outside.status(), TaskStatus::Cancelled);
        assert!(steps.iter().all(TaskHandle::is_live));

        let _ = rt.tick(start + Duration::from_millis(100));
        assert_eq!(target.value(Property::X), Some(100.0));
        assert!(!rt.tick(start + Duration::from_millis(200)));
        assert_eq!(target.value(Property::X), Some(0.0));
    }
}
