// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Settings file and environment overrides

use crate::error::ConfigError;
use crate::native::DEFAULT_WELD_TOLERANCE;
use crate::planar::{ClipConfig, OffsetOptions};
use crate::voronoi::VoronoiConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read by [`Settings::load`] when present in the working directory.
pub const SETTINGS_FILE: &str = "tessera.toml";

/// Solid kernel tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidSettings {
    /// Vertices closer than this are merged on construction
    pub weld_tolerance: f64,
}

impl Default for SolidSettings {
    fn default() -> Self {
        Self {
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
        }
    }
}

/// All tunables of a [`Kernel`](crate::Kernel).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solid: SolidSettings,
    pub clip: ClipConfig,
    pub offset: OffsetOptions,
    pub voronoi: VoronoiConfig,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path.as_ref()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {:?}", path.as_ref()))?;
        Ok(settings)
    }

    /// `tessera.toml` if present, otherwise defaults, then environment
    /// overrides
    pub fn load() -> Result<Self> {
        let mut settings = if PathBuf::from(SETTINGS_FILE).exists() {
            Self::from_file(SETTINGS_FILE)?
        } else {
            Self::default()
        };

        if let Some(scale) = env_f64("TESSERA_CLIP_SCALE")? {
            settings.clip.scale = scale;
        }
        if let Some(tolerance) = env_f64("TESSERA_ARC_TOLERANCE")? {
            settings.offset.arc_tolerance = tolerance;
        }
        if let Some(limit) = env_f64("TESSERA_MITER_LIMIT")? {
            settings.offset.miter_limit = limit;
        }
        if let Some(tolerance) = env_f64("TESSERA_WELD_TOLERANCE")? {
            settings.solid.weld_tolerance = tolerance;
        }

        settings.validate().context("Invalid settings after environment overrides")?;
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let weld = self.solid.weld_tolerance;
        if !weld.is_finite() || weld < 0.0 {
            return Err(ConfigError::invalid("weld_tolerance", weld, "must be finite and non-negative"));
        }
        self.clip.validate()?;
        self.offset.validate()?;
        self.voronoi.validate()
    }
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not a number: {value:?}")),
        Err(_) => Ok(None),
    }
}
