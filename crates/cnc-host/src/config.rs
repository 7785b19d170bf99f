//! Host-side settings loader.
//!
//! An optional TOML file lets an operator override the handful of machine
//! constants (steps/mm per axis, feed/seek rates, arc segment length)
//! without recompiling; anything left unset falls back to the firmware
//! defaults in [`cnc_settings::MillSettings`].

use std::path::Path;

use anyhow::{Context, Result};
use cnc_settings::MillSettings;
use serde::Deserialize;

/// On-disk shape of an optional `--settings <file>.toml`. Any field left
/// out of the file keeps `MillSettings::default()`'s value.
#[derive(Debug, Deserialize, Default)]
pub struct HostConfig {
    #[serde(default)]
    pub steps_per_mm_x: Option<f64>,
    #[serde(default)]
    pub steps_per_mm_y: Option<f64>,
    #[serde(default)]
    pub steps_per_mm_z: Option<f64>,
    #[serde(default)]
    pub default_feed_rate_mm_per_min: Option<f64>,
    #[serde(default)]
    pub default_seek_rate_mm_per_min: Option<f64>,
    #[serde(default)]
    pub mm_per_arc_segment: Option<f64>,
}

impl HostConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("failed to parse settings file: {:?}", path))
    }

    /// Folds this config's overrides onto the firmware-constant defaults.
    pub fn into_settings(self) -> MillSettings {
        let mut s = MillSettings::default();
        if let Some(v) = self.steps_per_mm_x {
            s.steps_per_mm[0] = v;
        }
        if let Some(v) = self.steps_per_mm_y {
            s.steps_per_mm[1] = v;
        }
        if let Some(v) = self.steps_per_mm_z {
            s.steps_per_mm[2] = v;
        }
        if let Some(v) = self.default_feed_rate_mm_per_min {
            s.default_feed_rate_mm_per_min = v;
        }
        if let Some(v) = self.default_seek_rate_mm_per_min {
            s.default_seek_rate_mm_per_min = v;
        }
        if let Some(v) = self.mm_per_arc_segment {
            s.mm_per_arc_segment = v;
        }
        s
    }
}
