use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Reduced Motion", inline)]
#[serde(default)]
/// Thresholds for the reduced-motion policy.
pub struct PolicyOptions {
    /// Treat weak devices as preferring reduced motion.
    #[schemars(title = "Device Heuristics")]
    pub device_heuristics: bool,
    /// Devices with at most this many logical cores count as low-end.
    #[schemars(title = "Low-End Cores", range(min = 1, max = 16))]
    pub low_end_cores: u32,
    /// Devices with at most this much memory (GB) count as low-end.
    #[schemars(title = "Low-End Memory (GB)", range(min = 0.25, max = 16.0))]
    pub low_end_memory_gb: f64,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            device_heuristics: true,
            low_end_cores: 2,
            low_end_memory_gb: 2.0,
        }
    }
}
