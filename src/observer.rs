//! Viewport visibility observation.
//!
//! [`observe`] turns the raw intersection reports of a
//! [`ViewportObserver`] primitive into a boolean callback that fires only
//! when the element crosses the configured threshold. The returned
//! [`SubscriptionHandle`] is the matching teardown.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::Duration;

use crate::error::MotifError;
use crate::options::ObserverOptions;
use crate::registry::Disposable;

/// One report from the intersection primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Whether any part of the element intersects the (margin-grown) viewport.
    pub is_intersecting: bool,
    /// Visible fraction of the element in `[0, 1]`.
    pub ratio: f32,
}

/// Receives raw entries from a primitive.
pub type EntrySink = Box<dyn FnMut(IntersectionEntry)>;

/// Stops a primitive observation. Called at most once.
pub type Disconnect = Box<dyn FnOnce()>;

/// Observation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    threshold: f32,
    /// Margin grown around the viewport, CSS syntax.
    pub root_margin: String,
    /// Stop reporting after the first time the element becomes visible.
    pub trigger_once: bool,
    /// Extra wait before anything started by a crossing begins to play.
    /// Crossings are still reported immediately.
    pub delay: Duration,
    /// Skip observation entirely; [`observe`] returns `None`.
    pub disabled: bool,
}

impl ObserveOptions {
    /// Options with `threshold` clamped to `[0, 1]`.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: clamp_threshold(threshold),
            root_margin: "0px".to_owned(),
            trigger_once: false,
            delay: Duration::ZERO,
            disabled: false,
        }
    }

    /// Set the root margin.
    #[must_use]
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }

    /// Report only the first entry into view.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.trigger_once = true;
        self
    }

    /// Delay whatever the crossing starts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Turn observation off.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Visible fraction required to count as visible.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether an entry counts as visible under these options.
    pub fn is_visible(&self, entry: IntersectionEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.threshold
    }
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self::from(&ObserverOptions::default())
    }
}

impl From<&ObserverOptions> for ObserveOptions {
    fn from(options: &ObserverOptions) -> Self {
        Self {
            threshold: clamp_threshold(options.threshold),
            root_margin: options.root_margin.clone(),
            trigger_once: options.trigger_once,
            delay: Duration::from_millis(options.delay_ms),
            disabled: options.disabled,
        }
    }
}

fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

/// A viewport-intersection primitive.
pub trait ViewportObserver {
    /// The element type this primitive watches.
    type Element: ?Sized;

    /// Whether the element is part of the rendered document.
    fn is_attached(&self, element: &Self::Element) -> bool;

    /// Start delivering entries for `element` into `sink`.
    ///
    /// Returns the teardown that stops delivery.
    fn connect(
        &self,
        element: &Self::Element,
        options: &ObserveOptions,
        sink: EntrySink,
    ) -> Result<Disconnect, MotifError>;
}

/// Status of a visibility subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Delivering crossings.
    Active,
    /// Torn down; the callback never runs again.
    Disposed,
}

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Unique subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

struct SubscriptionControl {
    id: SubscriptionId,
    status: Cell<SubscriptionStatus>,
    disconnect: RefCell<Option<Disconnect>>,
}

impl SubscriptionControl {
    fn disconnect(&self) {
        self.status.set(SubscriptionStatus::Disposed);
        let pending = self.disconnect.borrow_mut().take();
        if let Some(disconnect) = pending {
            disconnect();
        }
    }
}

impl Drop for SubscriptionControl {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.get_mut().take() {
            disconnect();
        }
    }
}

/// Handle to an active visibility observation.
#[derive(Clone)]
pub struct SubscriptionHandle {
    control: Rc<SubscriptionControl>,
}

impl SubscriptionHandle {
    /// Subscription identifier.
    pub fn id(&self) -> SubscriptionId {
        self.control.id
    }

    /// Current status.
    pub fn status(&self) -> SubscriptionStatus {
        self.control.status.get()
    }

    /// Whether crossings are still delivered.
    pub fn is_active(&self) -> bool {
        self.status() == SubscriptionStatus::Active
    }

    /// Stop observing. Idempotent and safe after the element is gone.
    pub fn unobserve(&self) {
        if self.is_active() {
            log::debug!("{} unobserved", self.control.id);
        }
        self.control.disconnect();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.control.id)
            .field("status", &self.status())
            .finish()
    }
}

impl Disposable for SubscriptionHandle {
    fn label(&self) -> String {
        self.control.id.to_string()
    }

    fn is_live(&self) -> bool {
        self.is_active()
    }

    fn dispose(&self) -> Result<(), MotifError> {
        self.unobserve();
        Ok(())
    }
}

/// Watch `element` and call `on_change(is_visible)` on every crossing.
///
/// Returns `None` without side effects if observation is disabled or the
/// element is not attached yet; call again after mount. The initial report only fires when the
/// element starts out visible. With `trigger_once` the callback fires at
/// most once and the subscription goes inactive afterwards.
pub fn observe<V: ViewportObserver>(
    viewport: &V,
    element: &V::Element,
    options: &ObserveOptions,
    mut on_change: impl FnMut(bool) + 'static,
) -> Option<SubscriptionHandle> {
    if options.disabled {
        log::debug!("observe skipped: disabled");
        return None;
    }
    if !viewport.is_attached(element) {
        log::debug!("observe skipped: element not attached");
        return None;
    }

    let control = Rc::new(SubscriptionControl {
        id: SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed)),
        status: Cell::new(SubscriptionStatus::Active),
        disconnect: RefCell::new(None),
    });

    let weak: Weak<SubscriptionControl> = Rc::downgrade(&control);
    let filter = options.clone();
    let mut last: Option<bool> = None;
    let sink: EntrySink = Box::new(move |entry| {
        let Some(control) = weak.upgrade() else {
            return;
        };
        if control.status.get() != SubscriptionStatus::Active {
            return;
        }
        let visible = filter.is_visible(entry);
        let crossed = match last {
            Some(previous) => previous != visible,
            None => visible,
        };
        last = Some(visible);
        if !crossed {
            return;
        }
        if filter.trigger_once {
            // Delivery stops now; the primitive is released by
            // `unobserve` or when the last handle drops.
            control.status.set(SubscriptionStatus::Disposed);
        }
        on_change(visible);
    });

    match viewport.connect(element, options, sink) {
        Ok(disconnect) => {
            *control.disconnect.borrow_mut() = Some(disconnect);
            log::debug!(
                "{} observing (threshold {}, margin {})",
                control.id,
                options.threshold,
                options.root_margin
            );
            Some(SubscriptionHandle { control })
        }
        Err(e) => {
            log::warn!("observe failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::headless::{ManualViewport, RecordingTarget};

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, impl FnMut(bool) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(ObserveOptions::new(1.5).threshold(), 1.0);
        assert_eq!(ObserveOptions::new(-0.2).threshold(), 0.0);
        assert_eq!(ObserveOptions::new(f32::NAN).threshold(), 0.0);
    }

    #[test]
    fn fires_only_on_crossings() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::new();
        let (seen, on_change) = recorder();
        let handle = observe(&viewport, &element, &ObserveOptions::new(0.5), on_change).unwrap();

        viewport.report(&element, 0.0);
        viewport.report(&element, 0.3);
        viewport.report(&element, 0.6);
        viewport.report(&element, 0.9);
        viewport.report(&element, 0.2);
        viewport.report(&element, 0.0);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(handle.is_active());
    }

    #[test]
    fn detached_element_is_a_silent_no_op() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::detached();
        let (seen, on_change) = recorder();
        assert!(observe(&viewport, &element, &ObserveOptions::default(), on_change).is_none());
        viewport.report(&element, 1.0);
        assert!(seen.borrow().is_empty());
        assert_eq!(viewport.observation_count(), 0);

        // Retry after mount works.
        element.attach();
        let (seen, on_change) = recorder();
        let _handle = observe(&viewport, &element, &ObserveOptions::default(), on_change).unwrap();
        viewport.report(&element, 1.0);
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn unobserve_is_idempotent() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::new();
        let (seen, on_change) = recorder();
        let handle = observe(&viewport, &element, &ObserveOptions::default(), on_change).unwrap();
        assert_eq!(viewport.observation_count(), 1);

        handle.unobserve();
        handle.unobserve();
        assert_eq!(handle.status(), SubscriptionStatus::Disposed);
        assert_eq!(viewport.observation_count(), 0);
        viewport.report(&element, 1.0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn trigger_once_stops_after_first_entry() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::new();
        let (seen, on_change) = recorder();
        let handle =
            observe(&viewport, &element, &ObserveOptions::new(0.1).once(), on_change).unwrap();

        viewport.report(&element, 0.5);
        viewport.report(&element, 0.0);
        viewport.report(&element, 0.5);
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(!handle.is_active());

        handle.unobserve();
        assert_eq!(viewport.observation_count(), 0);
    }

    #[test]
    fn disabled_observation_never_connects() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::new();
        let (seen, on_change) = recorder();
        let options = ObserveOptions::default().disabled(true);
        assert!(observe(&viewport, &element, &options, on_change).is_none());
        assert_eq!(viewport.observation_count(), 0);
        viewport.report(&element, 1.0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn options_carry_delay_from_config() {
        let config = ObserverOptions {
            delay_ms: 250,
            disabled: true,
            ..ObserverOptions::default()
        };
        let options = ObserveOptions::from(&config);
        assert_eq!(options.delay, Duration::from_millis(250));
        assert!(options.disabled);
        assert_eq!(ObserveOptions::new(0.2).delay, Duration::ZERO);
    }

    #[test]
    fn dropping_last_handle_disconnects() {
        let viewport = ManualViewport::new();
        let element = RecordingTarget::new();
        let handle = observe(&viewport, &element, &ObserveOptions::default(), |_| {}).unwrap();
        assert_eq!(viewport.observation_count(), 1);
        drop(handle);
        assert_eq!(viewport.observation_count(), 0);
    }
}
