use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::util::easing::EasingFunction;

/// Side an element slides in from.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Rise from below.
    #[default]
    Up,
    /// Drop from above.
    Down,
    /// Slide in from the right, moving left.
    Left,
    /// Slide in from the left, moving right.
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Reveal", inline)]
#[serde(default)]
/// Staggered entrance animation parameters.
pub struct RevealOptions {
    /// Duration of each item's entrance in milliseconds.
    #[schemars(title = "Duration (ms)", range(min = 0, max = 5000))]
    pub duration_ms: u64,
    /// Wait before the first item starts, in milliseconds.
    #[schemars(title = "Delay (ms)", range(min = 0, max = 5000))]
    pub delay_ms: u64,
    /// Delay between consecutive items in milliseconds.
    #[schemars(title = "Stagger (ms)", range(min = 0, max = 1000))]
    pub stagger_ms: u64,
    /// Distance in pixels each item travels.
    #[schemars(title = "Distance", range(min = 0.0, max = 400.0))]
    pub distance: f32,
    /// Direction items travel in.
    pub direction: Direction,
    /// Easing curve name.
    #[schemars(with = "String")]
    pub ease: EasingFunction,
}

impl RevealOptions {
    /// Per-item duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Wait before the first item.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Per-item stagger offset.
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            delay_ms: 0,
            stagger_ms: 100,
            distance: 50.0,
            direction: Direction::Up,
            ease: EasingFunction::PowerOut(2),
        }
    }
}
