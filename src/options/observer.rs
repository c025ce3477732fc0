use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Observer", inline)]
#[serde(default)]
/// Viewport visibility observation defaults.
pub struct ObserverOptions {
    /// Fraction of the element that must be visible, in `[0, 1]`.
    #[schemars(title = "Threshold", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub threshold: f32,
    /// Margin grown around the viewport, CSS syntax (e.g. `"50px"`).
    pub root_margin: String,
    /// Stop observing after the first time the element becomes visible.
    pub trigger_once: bool,
    /// Wait in milliseconds between a crossing and the animation it starts.
    #[schemars(title = "Delay (ms)", range(min = 0, max = 5000))]
    pub delay_ms: u64,
    /// Turn visibility-triggered animation off; elements stay as authored.
    pub disabled: bool,
    /// Delay in milliseconds between item reveals in staggered lists.
    #[schemars(title = "Stagger Delay (ms)", range(min = 0, max = 1000))]
    pub stagger_delay_ms: u64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px".to_owned(),
            trigger_once: true,
            delay_ms: 0,
            disabled: false,
            stagger_delay_ms: 100,
        }
    }
}
