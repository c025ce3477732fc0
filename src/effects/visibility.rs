//! Reveal-on-scroll: visibility subscriptions that start staggered reveals.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::reveal::{hidden_state, staggered_reveal};
use crate::animation::{AnimationTarget, IntoTargetRef, TargetRef, TaskHandle, TaskStatus};
use crate::controller::AnimationController;
use crate::error::MotifError;
use crate::observer::{observe, ObserveOptions, SubscriptionHandle, ViewportObserver};
use crate::options::RevealOptions;
use crate::registry::Disposable;

struct GroupState {
    items: Vec<TargetRef>,
    reveal: RevealOptions,
    tasks: RefCell<Vec<TaskHandle>>,
    subscription: RefCell<Option<SubscriptionHandle>>,
}

impl GroupState {
    fn cancel_tasks(&self) {
        for task in self.tasks.borrow_mut().drain(..) {
            let _ = task.cancel();
        }
    }

    fn hide_items(&self) {
        let hidden = hidden_state(&self.reveal);
        for item in &self.items {
            if let Some(element) = item.upgrade().filter(|e| e.is_attached()) {
                element.write(&hidden);
            }
        }
    }
}

/// A group of items revealed one after another when their container
/// scrolls into view: item `i` starts `i * stagger_delay` after the
/// crossing.
///
/// Leaving the viewport hides the items again unless the observation is
/// `trigger_once`.
#[derive(Clone)]
pub struct StaggeredVisibility {
    state: Rc<GroupState>,
}

impl StaggeredVisibility {
    /// Watch `container` and reveal `items` when it becomes visible.
    ///
    /// Items are put in their hidden state right away, except under
    /// reduced motion where they are left as they are. The first item
    /// starts `options.delay` after the crossing. Returns `None`, leaving
    /// the items untouched, when observation is disabled or the container
    /// is not attached yet.
    pub fn observe<V: ViewportObserver>(
        ctrl: &AnimationController,
        viewport: &V,
        container: &V::Element,
        items: Vec<TargetRef>,
        options: &ObserveOptions,
    ) -> Option<Self> {
        let defaults = &ctrl.options().reveal;
        let reveal = RevealOptions {
            delay_ms: defaults.delay_ms + options.delay.as_millis() as u64,
            stagger_ms: ctrl.options().observer.stagger_delay_ms,
            ..defaults.clone()
        };
        let state = Rc::new(GroupState {
            items,
            reveal,
            tasks: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
        });

        let weak: Weak<GroupState> = Rc::downgrade(&state);
        let controller = ctrl.clone();
        let subscription = observe(viewport, container, options, move |visible| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.cancel_tasks();
            if visible {
                let tasks = staggered_reveal(&controller, &state.items, &state.reveal);
                *state.tasks.borrow_mut() = tasks;
            } else if !controller.should_reduce_motion() {
                state.hide_items();
            }
        })?;

        if !ctrl.should_reduce_motion() {
            state.hide_items();
        }
        *state.subscription.borrow_mut() = Some(subscription);
        Some(Self { state })
    }

    /// Indices of the items whose reveal has started.
    pub fn visible_items(&self) -> Vec<usize> {
        self.state
            .tasks
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t.status(), TaskStatus::Running | TaskStatus::Completed))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether a reveal has been started since the last time the
    /// container left the viewport.
    pub fn is_triggered(&self) -> bool {
        !self.state.tasks.borrow().is_empty()
    }

    /// Whether the container is still being observed.
    pub fn is_observing(&self) -> bool {
        self.state
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(SubscriptionHandle::is_active)
    }

    /// Stop observing and cancel any reveal in flight.
    pub fn stop(&self) {
        let subscription = self.state.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.unobserve();
        }
        self.state.cancel_tasks();
    }
}

impl fmt::Debug for StaggeredVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaggeredVisibility")
            .field("items", &self.state.items.len())
            .field("visible", &self.visible_items())
            .field("observing", &self.is_observing())
            .finish()
    }
}

impl Disposable for StaggeredVisibility {
    fn label(&self) -> String {
        format!("staggered visibility ({} items)", self.state.items.len())
    }

    fn is_live(&self) -> bool {
        self.is_observing() || self.state.tasks.borrow().iter().any(TaskHandle::is_live)
    }

    fn dispose(&self) -> Result<(), MotifError> {
        self.stop();
        Ok(())
    }

    fn resource_key(&self) -> Option<usize> {
        Some(Rc::as_ptr(&self.state) as usize)
    }
}

/// Reveal a single element the first time it scrolls into view.
pub fn reveal_on_visible<V>(
    ctrl: &AnimationController,
    viewport: &V,
    element: &Rc<V::Element>,
    options: &ObserveOptions,
) -> Option<StaggeredVisibility>
where
    V: ViewportObserver,
    V::Element: AnimationTarget + Sized + 'static,
{
    StaggeredVisibility::observe(
        ctrl,
        viewport,
        element.as_ref(),
        vec![element.target_ref()],
        options,
    )
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;
    use crate::animation::Property;
    use crate::headless::{ManualClock, ManualViewport, RecordingTarget};
    use crate::options::MotionOptions;
    use crate::policy::MotionPolicy;
    use crate::registry::TriggerRegistry;

    struct Page {
        ctrl: AnimationController,
        clock: Rc<ManualClock>,
        viewport: ManualViewport,
        container: Rc<RecordingTarget>,
        items: Vec<Rc<RecordingTarget>>,
    }

    impl Page {
        fn new(reduce: bool, count: usize) -> Self {
            let clock = Rc::new(ManualClock::new());
            Self {
                ctrl: AnimationController::new(
                    MotionOptions::default(),
                    MotionPolicy::fixed(reduce),
                    clock.clone(),
                ),
                clock,
                viewport: ManualViewport::new(),
                container: Rc::new(RecordingTarget::new()),
                items: (0..count).map(|_| Rc::new(RecordingTarget::new())).collect(),
            }
        }

        fn refs(&self) -> Vec<TargetRef> {
            self.items.iter().map(IntoTargetRef::target_ref).collect()
        }

        fn advance(&self, ms: u64) {
            self.clock.advance(Duration::from_millis(ms));
            let _ = self.ctrl.tick();
        }
    }

    #[test]
    fn items_appear_one_stagger_apart() {
        let page = Page::new(false, 4);
        let group = StaggeredVisibility::observe(
            &page.ctrl,
            &page.viewport,
            page.container.as_ref(),
            page.refs(),
            &ObserveOptions::new(0.1).once(),
        )
        .unwrap();
        assert_eq!(page.items[0].value(Property::Opacity), Some(0.0));
        assert!(!group.is_triggered());

        page.viewport.report(&page.container, 0.5);
        page.advance(1);
        assert_eq!(group.visible_items(), vec![0]);
        page.advance(100);
        assert_eq!(group.visible_items(), vec![0, 1]);
        page.advance(200);
        assert_eq!(group.visible_items(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn leaving_hides_items_when_repeatable() {
        let page = Page::new(false, 2);
        let group = StaggeredVisibility::observe(
            &page.ctrl,
            &page.viewport,
            page.container.as_ref(),
            page.refs(),
            &ObserveOptions::new(0.1),
        )
        .unwrap();
        page.viewport.report(&page.container, 1.0);
        page.advance(2000);
        assert_eq!(page.items[1].value(Property::Opacity), Some(1.0));

        page.viewport.report(&page.container, 0.0);
        assert!(!group.is_triggered());
        assert_eq!(page.items[1].value(Property::Opacity), Some(0.0));
        assert!(group.is_observing());
    }

    #[test]
    fn disposal_cancels_pending_items() {
        let page = Page::new(false, 3);
        let registry = TriggerRegistry::new("features");
        let group = registry
            .register_opt(StaggeredVisibility::observe(
                &page.ctrl,
                &page.viewport,
                page.container.as_ref(),
                page.refs(),
                &ObserveOptions::new(0.1).once(),
            ))
            .unwrap();
        page.viewport.report(&page.container, 1.0);
        page.advance(1);

        assert_eq!(registry.dispose_all(), 0);
        let writes = page.items[2].write_count();
        page.advance(1000);
        assert_eq!(page.items[2].write_count(), writes);
        assert_eq!(group.visible_items(), Vec::<usize>::new());
        assert_eq!(page.viewport.observation_count(), 0);
        assert_eq!(page.ctrl.live_count(), 0);
    }

    #[test]
    fn reduced_motion_shows_everything_at_once() {
        let page = Page::new(true, 3);
        let element = page.items[0].clone();
        let reveal =
            reveal_on_visible(&page.ctrl, &page.viewport, &element, &ObserveOptions::default())
                .unwrap();
        assert_eq!(element.write_count(), 0, "not hidden under reduced motion");

        page.viewport.report(&element, 1.0);
        assert_eq!(reveal.visible_items(), vec![0]);
        assert_eq!(element.value(Property::Opacity), Some(1.0));
    }

    #[test]
    fn observer_delay_postpones_the_first_item() {
        let page = Page::new(false, 2);
        let group = StaggeredVisibility::observe(
            &page.ctrl,
            &page.viewport,
            page.container.as_ref(),
            page.refs(),
            &ObserveOptions::new(0.1).once().delay(Duration::from_millis(200)),
        )
        .unwrap();
        page.viewport.report(&page.container, 1.0);
        assert!(group.is_triggered());

        page.advance(150);
        assert!(group.visible_items().is_empty());
        assert_eq!(page.items[0].value(Property::Opacity), Some(0.0));
        page.advance(100);
        assert_eq!(group.visible_items(), vec![0]);
    }

    #[test]
    fn disabled_observation_leaves_items_alone() {
        let page = Page::new(false, 2);
        let group = StaggeredVisibility::observe(
            &page.ctrl,
            &page.viewport,
            page.container.as_ref(),
            page.refs(),
            &ObserveOptions::default().disabled(true),
        );
        assert!(group.is_none());
        assert_eq!(page.viewport.observation_count(), 0);
        assert!(page.items.iter().all(|i| i.write_count() == 0));
    }

    #[test]
    fn detached_container_is_not_observed() {
        let page = Page::new(false, 2);
        let container = RecordingTarget::detached();
        let group = StaggeredVisibility::observe(
            &page.ctrl,
            &page.viewport,
            &container,
            page.refs(),
            &ObserveOptions::default(),
        );
        assert!(group.is_none());
        assert_eq!(page.items[0].write_count(), 0);
    }
}
