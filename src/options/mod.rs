//! Centralized animation options with TOML preset support.
//!
//! Every tunable default (reveal timing, observer sensitivity, reduced
//! motion thresholds, pointer and text effects, parallax) lives here.
//! Options serialize to/from TOML so a site can ship motion presets.

mod observer;
mod pointer;
mod policy;
mod reveal;
mod scroll;
mod text;

use std::path::Path;

pub use observer::ObserverOptions;
pub use pointer::MagneticOptions;
pub use policy::PolicyOptions;
pub use reveal::{Direction, RevealOptions};
use schemars::JsonSchema;
pub use scroll::ParallaxOptions;
use serde::{Deserialize, Serialize};
pub use text::TextOptions;

use crate::error::MotifError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[reveal]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct MotionOptions {
    /// Staggered entrance defaults.
    pub reveal: RevealOptions,
    /// Visibility observation defaults.
    pub observer: ObserverOptions,
    /// Reduced-motion thresholds.
    pub policy: PolicyOptions,
    /// Magnetic pointer effect.
    pub magnetic: MagneticOptions,
    /// Text effects.
    pub text: TextOptions,
    /// Scroll-linked parallax.
    pub parallax: ParallaxOptions,
}

impl MotionOptions {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(MotionOptions)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, MotifError> {
        toml::from_str(content).map_err(|e| MotifError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, MotifError> {
        let content = std::fs::read_to_string(path).map_err(MotifError::Io)?;
        let options = Self::from_toml(&content)?;
        log::info!("Loaded motion preset '{}'", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), MotifError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MotifError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MotifError::Io)?;
        }
        std::fs::write(path, content).map_err(MotifError::Io)?;
        log::info!("Saved motion preset '{}'", path.display());
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
