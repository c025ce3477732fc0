//! Effects describe what a task writes to its target each frame.

use super::property::{Channel, PropertyValues};
use super::target::{current_values, AnimationTarget};

/// Defines what a task does to its target at a given eased progress.
///
/// The runtime owns timing (delay, cycles, yoyo, easing); an effect only
/// turns an eased value into writes. See [`Tween`] and the text effects
/// in [`crate::effects`].
pub trait Effect {
    /// Optional name for debugging/logging.
    fn name(&self) -> &'static str {
        "unnamed"
    }

    /// Channels this effect writes.
    fn channels(&self) -> Vec<Channel>;

    /// Give up a channel claimed by a newer task on the same target.
    ///
    /// Returns whether the effect still writes anything afterwards.
    fn release(&mut self, channel: Channel) -> bool;

    /// Whether the start state should be written as soon as the task is
    /// created, even while it waits out its delay.
    fn renders_immediately(&self) -> bool {
        false
    }

    /// Called once, right before the first frame is rendered.
    ///
    /// Effects that start "from wherever the element is" capture that
    /// state here rather than at creation, so staggered tasks see the
    /// values left by whatever ran before them.
    fn begin(&mut self, _target: &dyn AnimationTarget) {}

    /// Write the frame for eased progress `eased_t`.
    ///
    /// `eased_t` is 0 at the start state and 1 at the end state; the
    /// `back` and `elastic` easings push it slightly outside that range.
    fn render(&mut self, target: &dyn AnimationTarget, eased_t: f32);
}

/// Interpolates numeric properties from a start set to an end set.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Start values. `None` reads them from the target on the first frame.
    from: Option<PropertyValues>,
    /// End values.
    to: PropertyValues,
}

impl Tween {
    /// Tween between explicit start and end values.
    pub fn from_to(from: PropertyValues, to: PropertyValues) -> Self {
        Self {
            from: Some(from),
            to,
        }
    }

    /// Tween from the target's current values to `to`.
    pub fn to(to: PropertyValues) -> Self {
        Self { from: None, to }
    }

    /// End values still driven by this tween.
    pub fn end_values(&self) -> &PropertyValues {
        &self.to
    }
}

impl Effect for Tween {
    fn name(&self) -> &'static str {
        "tween"
    }

    fn channels(&self) -> Vec<Channel> {
        self.to.properties().map(Channel::Property).collect()
    }

    fn release(&mut self, channel: Channel) -> bool {
        if let Channel::Property(property) = channel {
            let _ = self.to.remove(property);
            if let Some(from) = self.from.as_mut() {
                let _ = from.remove(property);
            }
        }
        !self.to.is_empty()
    }

    /// Explicit start values are shown right away; tweens from the
    /// current state have nothing new to show before they play.
    fn renders_immediately(&self) -> bool {
        self.from.is_some()
    }

    fn begin(&mut self, target: &dyn AnimationTarget) {
        if self.from.is_none() {
            self.from = Some(current_values(target, self.to.properties()));
        }
    }

    fn render(&mut self, target: &dyn AnimationTarget, eased_t: f32) {
        let frame = match &self.from {
            Some(from) => from.lerp(&self.to, eased_t),
            None => PropertyValues::new().lerp(&self.to, eased_t),
        };
        target.write(&frame);
    }
}
