//! In-process host for running the animation lifecycle without a browser.
//!
//! [`RecordingTarget`] stands in for an element and records every write,
//! [`ManualViewport`] is an intersection primitive driven by explicit
//! reports, and [`ManualClock`] is a clock that only moves when told to.
//! Server-side previews, the `motif` binary and the test suites use these.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::{Duration, Instant};

use crate::animation::{AnimationTarget, Clock, Property, PropertyValues};
use crate::error::MotifError;
use crate::observer::{Disconnect, EntrySink, IntersectionEntry, ObserveOptions, ViewportObserver};

static NEXT_ELEMENT: AtomicU64 = AtomicU64::new(1);

/// An element that stores the values written to it.
#[derive(Debug)]
pub struct RecordingTarget {
    id: u64,
    attached: Cell<bool>,
    values: RefCell<PropertyValues>,
    text: RefCell<String>,
    frames: RefCell<Vec<PropertyValues>>,
    writes: Cell<usize>,
}

impl RecordingTarget {
    /// An attached element with no values set.
    pub fn new() -> Self {
        Self {
            id: NEXT_ELEMENT.fetch_add(1, Ordering::Relaxed),
            attached: Cell::new(true),
            values: RefCell::new(PropertyValues::new()),
            text: RefCell::new(String::new()),
            frames: RefCell::new(Vec::new()),
            writes: Cell::new(0),
        }
    }

    /// An element that is not part of the document yet.
    pub fn detached() -> Self {
        let target = Self::new();
        target.attached.set(false);
        target
    }

    /// Insert the element into the document.
    pub fn attach(&self) {
        self.attached.set(true);
    }

    /// Remove the element from the document.
    pub fn detach(&self) {
        self.attached.set(false);
    }

    /// Stable identity used by [`ManualViewport`].
    pub fn element_id(&self) -> u64 {
        self.id
    }

    /// Last written value of a property.
    pub fn value(&self, property: Property) -> Option<f32> {
        self.values.borrow().get(property)
    }

    /// Current text content.
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Every property frame written so far, oldest first.
    pub fn frames(&self) -> Vec<PropertyValues> {
        self.frames.borrow().clone()
    }

    /// Number of writes (property frames and text updates).
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationTarget for RecordingTarget {
    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn read(&self, property: Property) -> Option<f32> {
        self.value(property)
    }

    fn write(&self, values: &PropertyValues) {
        let mut current = self.values.borrow_mut();
        for (p, v) in values.iter() {
            current.set(p, v);
        }
        self.frames.borrow_mut().push(values.clone());
        self.writes.set(self.writes.get() + 1);
    }

    fn write_text(&self, text: &str) {
        text.clone_into(&mut self.text.borrow_mut());
        self.writes.set(self.writes.get() + 1);
    }
}

struct Observation {
    key: u64,
    element: u64,
    sink: Rc<RefCell<EntrySink>>,
}

/// Intersection primitive fed by explicit [`report`](Self::report) calls.
#[derive(Default)]
pub struct ManualViewport {
    observations: Rc<RefCell<Vec<Observation>>>,
    next_key: Cell<u64>,
}

impl ManualViewport {
    /// Viewport with no observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that `element` is now `ratio` visible.
    pub fn report(&self, element: &RecordingTarget, ratio: f32) {
        let entry = IntersectionEntry {
            is_intersecting: ratio > 0.0,
            ratio: ratio.clamp(0.0, 1.0),
        };
        // Collect first so sinks may observe/unobserve while being called.
        let sinks: Vec<_> = self
            .observations
            .borrow()
            .iter()
            .filter(|o| o.element == element.element_id())
            .map(|o| o.sink.clone())
            .collect();
        for sink in sinks {
            (sink.borrow_mut())(entry);
        }
    }

    /// Number of connected observations.
    pub fn observation_count(&self) -> usize {
        self.observations.borrow().len()
    }
}

impl ViewportObserver for ManualViewport {
    type Element = RecordingTarget;

    fn is_attached(&self, element: &RecordingTarget) -> bool {
        element.is_attached()
    }

    fn connect(
        &self,
        element: &RecordingTarget,
        _options: &ObserveOptions,
        sink: EntrySink,
    ) -> Result<Disconnect, MotifError> {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.observations.borrow_mut().push(Observation {
            key,
            element: element.element_id(),
            sink: Rc::new(RefCell::new(sink)),
        });

        let observations: Weak<RefCell<Vec<Observation>>> = Rc::downgrade(&self.observations);
        Ok(Box::new(move || {
            if let Some(observations) = observations.upgrade() {
                // Move the removed entry out so its sink drops after the
                // borrow is released.
                let removed: Vec<_> = {
                    let mut list = observations.borrow_mut();
                    let (gone, kept): (Vec<_>, Vec<_>) =
                        list.drain(..).partition(|o| o.key == key);
                    *list = kept;
                    gone
                };
                drop(removed);
            }
        }))
    }
}

/// A clock that advances only when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    /// Clock frozen at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock frozen at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_target_tracks_writes() {
        let target = RecordingTarget::new();
        target.write(&PropertyValues::new().x(5.0));
        target.write(&PropertyValues::new().y(2.0));
        target.write_text("hi");
        assert_eq!(target.value(Property::X), Some(5.0));
        assert_eq!(target.value(Property::Y), Some(2.0));
        assert_eq!(target.text(), "hi");
        assert_eq!(target.write_count(), 3);
        assert_eq!(target.frames().len(), 2);
    }

    #[test]
    fn elements_have_distinct_ids() {
        assert_ne!(RecordingTarget::new().element_id(), RecordingTarget::new().element_id());
    }

    #[test]
    fn manual_clock_advances() {
        let start = Instant::now();
        let clock = ManualClock::starting_at(start);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), start + Duration::from_millis(250));
    }
}
