//! Elements that animations write to.

use std::rc::{Rc, Weak};

use super::property::{Property, PropertyValues};

/// A visual element an animation can mutate.
///
/// Methods take `&self`: element handles are shared, and implementations
/// use interior mutability (as the DOM does) for their writes.
pub trait AnimationTarget {
    /// Whether the element is currently part of a rendered document.
    fn is_attached(&self) -> bool;

    /// Current value of a property, if the element tracks it.
    fn read(&self, property: Property) -> Option<f32>;

    /// Apply one frame of property values.
    fn write(&self, values: &PropertyValues);

    /// Replace the element's text content.
    fn write_text(&self, text: &str);
}

/// Weak reference to a target. Tasks never keep their element alive.
pub type TargetRef = Weak<dyn AnimationTarget>;

/// Conversion into a [`TargetRef`].
pub trait IntoTargetRef {
    /// Downgrade into a weak target reference.
    fn target_ref(&self) -> TargetRef;
}

impl<T: AnimationTarget + 'static> IntoTargetRef for Rc<T> {
    fn target_ref(&self) -> TargetRef {
        let strong: Rc<dyn AnimationTarget> = self.clone();
        Rc::downgrade(&strong)
    }
}

impl IntoTargetRef for Rc<dyn AnimationTarget> {
    fn target_ref(&self) -> TargetRef {
        Rc::downgrade(self)
    }
}

impl IntoTargetRef for TargetRef {
    fn target_ref(&self) -> TargetRef {
        self.clone()
    }
}

/// Upgrade a target reference, treating detached elements as missing.
pub(crate) fn live_target(target: &TargetRef) -> Option<Rc<dyn AnimationTarget>> {
    target.upgrade().filter(|t| t.is_attached())
}

/// Current values of `properties` on `target`, falling back to identity.
pub(crate) fn current_values(
    target: &dyn AnimationTarget,
    properties: impl Iterator<Item = Property>,
) -> PropertyValues {
    properties
        .map(|p| (p, target.read(p).unwrap_or_else(|| p.identity())))
        .collect()
}
