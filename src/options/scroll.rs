use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Direction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Parallax", inline)]
#[serde(default)]
/// Scroll-linked parallax parameters.
pub struct ParallaxOptions {
    /// Pixels travelled per unit of scroll progress, divided by 100.
    #[schemars(title = "Speed", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub speed: f32,
    /// Direction of travel.
    pub direction: Direction,
    /// Seconds the displayed progress takes to catch up with scrolling.
    /// Zero follows the scroll position exactly.
    #[schemars(title = "Scrub", range(min = 0.0, max = 3.0))]
    pub scrub_secs: f32,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            speed: 0.5,
            direction: Direction::Up,
            scrub_secs: 1.0,
        }
    }
}
