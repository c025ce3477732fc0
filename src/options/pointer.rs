use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::util::easing::EasingFunction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Magnetic", inline)]
#[serde(default)]
/// Pointer-follow ("magnetic") effect parameters.
pub struct MagneticOptions {
    /// Fraction of the pointer's offset from centre the element follows.
    #[schemars(title = "Strength", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub strength: f32,
    /// Follow duration in milliseconds.
    pub follow_ms: u64,
    /// Follow easing.
    #[schemars(with = "String")]
    pub follow_ease: EasingFunction,
    /// Return-to-rest duration in milliseconds.
    pub release_ms: u64,
    /// Return-to-rest easing.
    #[schemars(with = "String")]
    pub release_ease: EasingFunction,
    /// Time a custom cursor takes to catch up with the pointer, in ms.
    pub cursor_ms: u64,
    /// Cursor follow easing.
    #[schemars(with = "String")]
    pub cursor_ease: EasingFunction,
}

impl MagneticOptions {
    /// Follow duration.
    pub fn follow(&self) -> Duration {
        Duration::from_millis(self.follow_ms)
    }

    /// Return-to-rest duration.
    pub fn release(&self) -> Duration {
        Duration::from_millis(self.release_ms)
    }

    /// Cursor catch-up duration.
    pub fn cursor(&self) -> Duration {
        Duration::from_millis(self.cursor_ms)
    }
}

impl Default for MagneticOptions {
    fn default() -> Self {
        Self {
            strength: 0.3,
            follow_ms: 500,
            follow_ease: EasingFunction::PowerOut(2),
            release_ms: 600,
            release_ease: EasingFunction::ELASTIC_RELEASE,
            cursor_ms: 200,
            cursor_ease: EasingFunction::PowerOut(2),
        }
    }
}
