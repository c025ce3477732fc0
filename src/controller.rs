//! Animation controller: the injected entry point consumers hold.
//!
//! Ties one [`AnimationRuntime`], a [`MotionPolicy`], the configured
//! [`MotionOptions`] and a [`Clock`] together. Clones share state, so a
//! controller can be handed to every component of a page.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use web_time::Instant;

use crate::animation::{
    AnimationRuntime, Clock, Effect, IntoTargetRef, PropertyValues, SystemClock, TargetRef,
    TaskConfig, TaskHandle, Timeline, TimelineHandle, Tween,
};
use crate::options::MotionOptions;
use crate::policy::{MotionEnvironment, MotionPolicy};
use crate::registry::{Disposable, TriggerRegistry};

struct ControllerInner {
    runtime: RefCell<AnimationRuntime>,
    policy: Rc<MotionPolicy>,
    options: MotionOptions,
    clock: Box<dyn Clock>,
    /// Tasks, timelines and triggers registered under a caller-chosen id.
    named: RefCell<FxHashMap<String, Box<dyn Disposable>>>,
    /// Asks the host for frames after new work is queued.
    waker: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Shared handle to the animation runtime, policy and options.
#[derive(Clone)]
pub struct AnimationController {
    inner: Rc<ControllerInner>,
}

impl AnimationController {
    /// Controller from explicit parts.
    pub fn new(
        options: MotionOptions,
        policy: MotionPolicy,
        clock: impl Clock + 'static,
    ) -> Self {
        let policy = Rc::new(policy);
        Self {
            inner: Rc::new(ControllerInner {
                runtime: RefCell::new(AnimationRuntime::new(policy.clone())),
                policy,
                options,
                clock: Box::new(clock),
                named: RefCell::new(FxHashMap::default()),
                waker: RefCell::new(None),
            }),
        }
    }

    /// Controller on the system clock with a policy reading `environment`
    /// using the thresholds in `options.policy`.
    pub fn with_environment(
        options: MotionOptions,
        environment: impl MotionEnvironment + 'static,
    ) -> Self {
        let policy = MotionPolicy::new(environment, options.policy.clone());
        Self::new(options, policy, SystemClock)
    }

    /// Configured options.
    pub fn options(&self) -> &MotionOptions {
        &self.inner.options
    }

    /// The reduced-motion policy.
    pub fn policy(&self) -> &MotionPolicy {
        &self.inner.policy
    }

    /// Shorthand for [`MotionPolicy::should_reduce_motion`].
    pub fn should_reduce_motion(&self) -> bool {
        self.inner.policy.should_reduce_motion()
    }

    /// Current instant on the controller's clock.
    pub fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    /// Install the hook that asks the host for animation frames. It is
    /// called whenever a task starts or playback resumes, and must only
    /// schedule a frame, never tick synchronously.
    pub fn set_frame_waker(&self, waker: impl Fn() + 'static) {
        *self.inner.waker.borrow_mut() = Some(Rc::new(waker));
    }

    fn wake(&self) {
        let waker = self.inner.waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    /// New registry for a mounting component.
    pub fn scope(&self, owner: impl Into<String>) -> TriggerRegistry {
        TriggerRegistry::new(owner)
    }

    /// Start a task running `effect` on `target`.
    pub fn animate(
        &self,
        target: &impl IntoTargetRef,
        effect: impl Effect + 'static,
        config: TaskConfig,
    ) -> TaskHandle {
        let now = self.now();
        let handle = self.inner.runtime.borrow_mut().start(
            target.target_ref(),
            Box::new(effect),
            config,
            now,
        );
        if handle.is_live() {
            self.wake();
        }
        handle
    }

    /// Tween `target` from `from` to `to`.
    pub fn from_to(
        &self,
        target: &impl IntoTargetRef,
        from: PropertyValues,
        to: PropertyValues,
        config: TaskConfig,
    ) -> TaskHandle {
        self.animate(target, Tween::from_to(from, to), config)
    }

    /// Tween `target` from its current values to `to`.
    pub fn to(
        &self,
        target: &impl IntoTargetRef,
        to: PropertyValues,
        config: TaskConfig,
    ) -> TaskHandle {
        self.animate(target, Tween::to(to), config)
    }

    /// Start one task per target, staggered by `config.stagger`.
    pub fn animate_batch(
        &self,
        targets: &[TargetRef],
        make_effect: impl FnMut(usize) -> Box<dyn Effect>,
        config: &TaskConfig,
    ) -> Vec<TaskHandle> {
        let now = self.now();
        let handles = self
            .inner
            .runtime
            .borrow_mut()
            .start_batch(targets, make_effect, config, now);
        if handles.iter().any(TaskHandle::is_live) {
            self.wake();
        }
        handles
    }

    /// Play `timeline` from now.
    ///
    /// Register the handle under an id to have the next timeline played
    /// under that id replace this one.
    pub fn play(&self, timeline: Timeline) -> TimelineHandle {
        let now = self.now();
        let tasks = self
            .inner
            .runtime
            .borrow_mut()
            .start_group(timeline.into_steps(), now);
        if tasks.iter().any(TaskHandle::is_live) {
            self.wake();
        }
        TimelineHandle::new(tasks)
    }

    /// Track `resource` (a task, timeline or scroll trigger) under `id` so
    /// it can be killed by name.
    ///
    /// Whatever was registered under the same id before is disposed. Under
    /// reduced motion the resource is disposed instead of stored.
    pub fn register_animation<R: Disposable + Clone + 'static>(
        &self,
        id: impl Into<String>,
        resource: R,
    ) -> R {
        let id = id.into();
        if self.should_reduce_motion() {
            dispose_named(&id, &resource);
            return resource;
        }
        let previous = {
            let mut named = self.inner.named.borrow_mut();
            named.retain(|_, r| r.is_live());
            named.insert(id.clone(), Box::new(resource.clone()))
        };
        if let Some(previous) = previous {
            let same = previous.resource_key().is_some()
                && previous.resource_key() == resource.resource_key();
            if !same {
                dispose_named(&id, previous.as_ref());
            }
        }
        resource
    }

    /// Dispose whatever is registered under `id`. Returns whether it was
    /// still live.
    pub fn kill_animation(&self, id: &str) -> bool {
        let removed = self.inner.named.borrow_mut().remove(id);
        removed.is_some_and(|resource| {
            let live = resource.is_live();
            dispose_named(id, resource.as_ref());
            live
        })
    }

    /// Cancel every task, named or not, and dispose every named resource.
    pub fn kill_all_animations(&self) {
        let named = std::mem::take(&mut *self.inner.named.borrow_mut());
        for (id, resource) in named {
            dispose_named(&id, resource.as_ref());
        }
        self.inner.runtime.borrow_mut().cancel_all();
    }

    /// Freeze every task.
    pub fn pause_all_animations(&self) {
        let now = self.now();
        self.inner.runtime.borrow_mut().pause(now);
    }

    /// Continue after [`pause_all_animations`](Self::pause_all_animations).
    pub fn resume_all_animations(&self) {
        let now = self.now();
        self.inner.runtime.borrow_mut().resume(now);
        self.wake();
    }

    /// Whether the runtime is paused.
    pub fn is_paused(&self) -> bool {
        self.inner.runtime.borrow().is_paused()
    }

    /// Advance every task to the clock's current instant.
    ///
    /// Returns `true` while tasks remain.
    pub fn tick(&self) -> bool {
        let now = self.now();
        self.inner.runtime.borrow_mut().tick(now)
    }

    /// Number of live tasks.
    pub fn live_count(&self) -> usize {
        self.inner.runtime.borrow().live_count()
    }
}

fn dispose_named(id: &str, resource: &dyn Disposable) {
    if let Err(e) = resource.dispose() {
        log::warn!("{id}: {e}");
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("runtime", &self.inner.runtime.borrow())
            .field("policy", &self.inner.policy)
            .field("named", &self.inner.named.borrow().len())
            .field("waker", &self.inner.waker.borrow().is_some())
            .finish_non_exhaustive()
    }
}
