//! Animatable properties and per-frame property value sets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A numeric visual property an animation can drive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Horizontal translation in pixels.
    X,
    /// Vertical translation in pixels.
    Y,
    /// Uniform scale factor.
    Scale,
    /// Rotation in degrees.
    Rotate,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Angle of a gradient fill in degrees.
    GradientAngle,
}

impl Property {
    /// Value of the property on an untouched element.
    pub fn identity(self) -> f32 {
        match self {
            Property::Scale | Property::Opacity => 1.0,
            Property::X | Property::Y | Property::Rotate | Property::GradientAngle => 0.0,
        }
    }
}

/// Something a task writes to: a numeric property or the text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A numeric property.
    Property(Property),
    /// The element's text content.
    Text,
}

/// Ordered set of property values, one entry per property.
///
/// Insertion order is preserved so writes reach targets in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyValues {
    entries: Vec<(Property, f32)>,
}

impl PropertyValues {
    /// Empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set `property` to `value`.
    #[must_use]
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    /// Builder shorthand for [`Property::X`].
    #[must_use]
    pub fn x(self, value: f32) -> Self {
        self.with(Property::X, value)
    }

    /// Builder shorthand for [`Property::Y`].
    #[must_use]
    pub fn y(self, value: f32) -> Self {
        self.with(Property::Y, value)
    }

    /// Builder shorthand for [`Property::Opacity`].
    #[must_use]
    pub fn opacity(self, value: f32) -> Self {
        self.with(Property::Opacity, value)
    }

    /// Builder shorthand for [`Property::Scale`].
    #[must_use]
    pub fn scale(self, value: f32) -> Self {
        self.with(Property::Scale, value)
    }

    /// Builder shorthand for [`Property::Rotate`].
    #[must_use]
    pub fn rotate(self, value: f32) -> Self {
        self.with(Property::Rotate, value)
    }

    /// Set a value, replacing any existing entry for the property.
    pub fn set(&mut self, property: Property, value: f32) {
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Value for a property, if present.
    pub fn get(&self, property: Property) -> Option<f32> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    /// Remove a property. Returns whether it was present.
    pub fn remove(&mut self, property: Property) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(p, _)| *p != property);
        self.entries.len() != before
    }

    /// Whether the set contains a property.
    pub fn contains(&self, property: Property) -> bool {
        self.entries.iter().any(|(p, _)| *p == property)
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    /// `(property, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no properties are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interpolate every property of `to`, starting from the matching
    /// value in `self` (or the property's identity when absent).
    ///
    /// `t` is not clamped so overshooting easings carry through.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        let entries = to
            .entries
            .iter()
            .map(|&(p, end)| {
                let start = self.get(p).unwrap_or_else(|| p.identity());
                (p, start + (end - start) * t)
            })
            .collect();
        Self { entries }
    }
}

impl FromIterator<(Property, f32)> for PropertyValues {
    fn from_iter<I: IntoIterator<Item = (Property, f32)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (p, v) in iter {
            values.set(p, v);
        }
        values
    }
}
