//! Scroll-linked parallax.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
#[cfg(feature = "web")]
use std::rc::Weak;

use web_time::Instant;

use super::Rect;
use crate::animation::{IntoTargetRef, PropertyValues, TargetRef};
use crate::controller::AnimationController;
use crate::error::MotifError;
use crate::options::{Direction, ParallaxOptions};
use crate::registry::Disposable;

/// Progress of an element through the viewport.
///
/// 0 when its top edge reaches the bottom of the viewport, 1 when its
/// bottom edge leaves through the top.
pub fn scroll_progress(rect: Rect, viewport_height: f32) -> f32 {
    let span = viewport_height + rect.height;
    if span <= 0.0 {
        return 0.0;
    }
    ((viewport_height - rect.top) / span).clamp(0.0, 1.0)
}

struct TriggerState {
    target: TargetRef,
    options: ParallaxOptions,
    /// Motion is suppressed; the element stays at rest.
    still: bool,
    displayed: Cell<Option<f32>>,
    last_update: Cell<Option<Instant>>,
    killed: Cell<bool>,
    detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Moves an element by its scroll progress.
///
/// The host feeds [`update`](Self::update) from its scroll listener; the
/// web binding does this itself and hands the listener's teardown to
/// [`on_kill`](Self::on_kill).
#[derive(Clone)]
pub struct ScrollTrigger {
    state: Rc<TriggerState>,
}

impl ScrollTrigger {
    /// Parallax trigger for `target`.
    ///
    /// Under reduced motion the trigger never moves the element.
    pub fn parallax(
        ctrl: &AnimationController,
        target: &impl IntoTargetRef,
        options: ParallaxOptions,
    ) -> Self {
        Self {
            state: Rc::new(TriggerState {
                target: target.target_ref(),
                options,
                still: ctrl.should_reduce_motion(),
                displayed: Cell::new(None),
                last_update: Cell::new(None),
                killed: Cell::new(false),
                detach: RefCell::new(None),
            }),
        }
    }

    /// Register the teardown for whatever feeds this trigger.
    pub fn on_kill(&self, detach: impl FnOnce() + 'static) {
        if self.state.killed.get() {
            detach();
        } else {
            *self.state.detach.borrow_mut() = Some(Box::new(detach));
        }
    }

    /// Progress currently applied to the element.
    pub fn progress(&self) -> Option<f32> {
        self.state.displayed.get()
    }

    /// Whether the trigger is still reacting to scrolling.
    pub fn is_active(&self) -> bool {
        !self.state.killed.get()
    }

    /// Translation for `progress` along the configured direction.
    pub fn offset_for(&self, progress: f32) -> PropertyValues {
        let distance = progress * self.state.options.speed * 100.0;
        match self.state.options.direction {
            Direction::Up => PropertyValues::new().y(distance),
            Direction::Down => PropertyValues::new().y(-distance),
            Direction::Left => PropertyValues::new().x(distance),
            Direction::Right => PropertyValues::new().x(-distance),
        }
    }

    /// React to a scroll position: `rect` is the element's box and
    /// `viewport_height` the window's inner height.
    ///
    /// With scrubbing the applied progress eases toward the scroll
    /// position instead of jumping to it. Returns the applied progress,
    /// or `None` once killed or when the element is gone.
    pub fn update(&self, rect: Rect, viewport_height: f32, now: Instant) -> Option<f32> {
        let state = &self.state;
        if state.killed.get() || state.still {
            return None;
        }
        let element = state.target.upgrade().filter(|t| t.is_attached())?;

        let goal = scroll_progress(rect, viewport_height);
        let scrub = state.options.scrub_secs;
        let applied = match (state.displayed.get(), state.last_update.get()) {
            (Some(shown), Some(last)) if scrub > 0.0 => {
                let dt = now.saturating_duration_since(last).as_secs_f32();
                shown + (goal - shown) * (1.0 - (-dt / scrub).exp())
            }
            _ => goal,
        };
        state.displayed.set(Some(applied));
        state.last_update.set(Some(now));
        element.write(&self.offset_for(applied));
        Some(applied)
    }

    /// Non-owning reference, for listeners that feed this trigger.
    #[cfg(feature = "web")]
    pub(crate) fn downgrade(&self) -> WeakScrollTrigger {
        WeakScrollTrigger(Rc::downgrade(&self.state))
    }

    /// Stop reacting to scrolling and run the registered teardown.
    pub fn kill(&self) {
        self.state.killed.set(true);
        let detach = self.state.detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
    }
}

/// Weak counterpart of [`ScrollTrigger`].
#[cfg(feature = "web")]
#[derive(Clone)]
pub(crate) struct WeakScrollTrigger(Weak<TriggerState>);

#[cfg(feature = "web")]
impl WeakScrollTrigger {
    pub(crate) fn upgrade(&self) -> Option<ScrollTrigger> {
        self.0.upgrade().map(|state| ScrollTrigger { state })
    }
}

impl fmt::Debug for ScrollTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTrigger")
            .field("options", &self.state.options)
            .field("progress", &self.progress())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Disposable for ScrollTrigger {
    fn label(&self) -> String {
        "scroll trigger".to_owned()
    }

    fn is_live(&self) -> bool {
        self.is_active()
    }

    fn dispose(&self) -> Result<(), MotifError> {
        self.kill();
        Ok(())
    }

    fn resource_key(&self) -> Option<usize> {
        Some(Rc::as_ptr(&self.state) as usize)
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;
    use crate::animation::Property;
    use crate::headless::{ManualClock, RecordingTarget};
    use crate::options::MotionOptions;
    use crate::policy::MotionPolicy;

    fn controller(reduce: bool) -> AnimationController {
        AnimationController::new(
            MotionOptions::default(),
            MotionPolicy::fixed(reduce),
            ManualClock::new(),
        )
    }

    #[test]
    fn progress_spans_entry_to_exit() {
        let rect = |top| Rect::new(0.0, top, 100.0, 200.0);
        assert_eq!(scroll_progress(rect(800.0), 800.0), 0.0);
        assert_eq!(scroll_progress(rect(-200.0), 800.0), 1.0);
        assert!((scroll_progress(rect(300.0), 800.0) - 0.5).abs() < 1e-6);
        assert_eq!(scroll_progress(rect(2000.0), 800.0), 0.0);
    }

    #[test]
    fn unscrubbed_trigger_tracks_scroll() {
        let target = Rc::new(RecordingTarget::new());
        let options = ParallaxOptions {
            scrub_secs: 0.0,
            direction: Direction::Right,
            ..ParallaxOptions::default()
        };
        let trigger = ScrollTrigger::parallax(&controller(false), &target, options);
        let applied = trigger.update(Rect::new(0.0, 300.0, 100.0, 200.0), 800.0, Instant::now());
        assert_eq!(applied, Some(0.5));
        assert_eq!(target.value(Property::X), Some(-25.0));
    }

    #[test]
    fn scrub_lags_behind_the_scroll_position() {
        let target = Rc::new(RecordingTarget::new());
        let trigger =
            ScrollTrigger::parallax(&controller(false), &target, ParallaxOptions::default());
        let start = Instant::now();
        let _ = trigger.update(Rect::new(0.0, 800.0, 100.0, 200.0), 800.0, start);

        let later = start + Duration::from_millis(100);
        let applied = trigger
            .update(Rect::new(0.0, -200.0, 100.0, 200.0), 800.0, later)
            .unwrap();
        assert!(applied > 0.0 && applied < 0.2);
        let settled = trigger
            .update(Rect::new(0.0, -200.0, 100.0, 200.0), 800.0, later + Duration::from_secs(20))
            .unwrap();
        assert!((settled - 1.0).abs() < 1e-3);
    }

    #[test]
    fn kill_runs_teardown_once_and_stops_updates() {
        let target = Rc::new(RecordingTarget::new());
        let trigger =
            ScrollTrigger::parallax(&controller(false), &target, ParallaxOptions::default());
        let detached = Rc::new(Cell::new(0));
        let counter = detached.clone();
        trigger.on_kill(move || counter.set(counter.get() + 1));

        trigger.dispose().unwrap();
        trigger.dispose().unwrap();
        assert_eq!(detached.get(), 1);
        assert!(!trigger.is_live());
        assert_eq!(trigger.update(Rect::default(), 800.0, Instant::now()), None);
        assert_eq!(target.write_count(), 0);
    }

    #[test]
    fn reduced_motion_keeps_element_still() {
        let target = Rc::new(RecordingTarget::new());
        let trigger =
            ScrollTrigger::parallax(&controller(true), &target, ParallaxOptions::default());
        let rect = Rect::new(0.0, 300.0, 100.0, 200.0);
        assert_eq!(trigger.update(rect, 800.0, Instant::now()), None);
        assert_eq!(target.write_count(), 0);
    }
}
