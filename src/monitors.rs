// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Monitor calibration profiles.
//!
//! A profile stores the physical width of a screen, the distance of the
//! observer to it and its native resolution. Together these turn visual
//! angle into pixels. Profiles are looked up by name; a few are built in and
//! more can be loaded from a TOML file:
//!
//! ```toml
//! [[monitor]]
//! name = "labMonitor"
//! width_cm = 53.1
//! distance_cm = 70.0
//! size_px = [1920, 1080]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::PsyshapeError;

/// Name of the profile used when no other profile is requested.
pub const DEFAULT_MONITOR: &str = "testMonitor";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitorProfile {
    pub name: String,
    /// Width of the visible screen area in centimeters.
    pub width_cm: f32,
    /// Viewing distance in centimeters.
    pub distance_cm: f32,
    /// Native resolution. If missing, the resolution of the display the
    /// window is opened on is used instead.
    #[serde(default)]
    pub size_px: Option<(u32, u32)>,
}

impl MonitorProfile {
    /// The calibration of the built-in `testMonitor`.
    pub fn test_monitor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width_cm: 30.0,
            distance_cm: 57.0,
            size_px: Some((1024, 768)),
        }
    }

    /// Pixels per centimeter. `fallback_width_px` is used when the profile
    /// has no resolution of its own.
    pub fn pixels_per_cm(&self, fallback_width_px: u32) -> f32 {
        let width_px = self.size_px.map(|(w, _)| w).unwrap_or(fallback_width_px);
        width_px as f32 / self.width_cm
    }

    fn validate(&self) -> Result<(), PsyshapeError> {
        let invalid = |reason: &str| {
            Err(PsyshapeError::InvalidMonitorProfile(
                self.name.clone(),
                reason.to_string(),
            ))
        };

        if self.name.trim().is_empty() {
            return invalid("name must not be empty");
        }
        if !(self.width_cm.is_finite() && self.width_cm > 0.0) {
            return invalid("width_cm must be positive");
        }
        if !(self.distance_cm.is_finite() && self.distance_cm > 0.0) {
            return invalid("distance_cm must be positive");
        }
        if let Some((w, h)) = self.size_px {
            if w == 0 || h == 0 {
                return invalid("size_px must not be zero");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    monitor: Vec<MonitorProfile>,
}

/// A registry of monitor profiles, keyed by name.
#[derive(Debug, Clone)]
pub struct MonitorProfiles {
    profiles: BTreeMap<String, MonitorProfile>,
}

impl Default for MonitorProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MonitorProfiles {
    /// The built-in profiles.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            DEFAULT_MONITOR.to_string(),
            MonitorProfile::test_monitor(DEFAULT_MONITOR),
        );
        Self { profiles }
    }

    /// Parse profiles from a TOML document and merge them over the built-in
    /// ones.
    pub fn from_toml_str(content: &str) -> Result<Self, PsyshapeError> {
        let file: ProfileFile = toml::from_str(content)?;

        let mut loaded: BTreeMap<String, MonitorProfile> = BTreeMap::new();
        for profile in file.monitor {
            profile.validate()?;
            if loaded.contains_key(&profile.name) {
                return Err(PsyshapeError::InvalidMonitorProfile(
                    profile.name,
                    "defined more than once".to_string(),
                ));
            }
            loaded.insert(profile.name.clone(), profile);
        }

        let mut profiles = Self::builtin();
        profiles.profiles.extend(loaded);
        Ok(profiles)
    }

    /// Load profiles from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PsyshapeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let profiles = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded monitor profiles from {}: {:?}",
            path.display(),
            profiles.names().collect::<Vec<_>>()
        );
        Ok(profiles)
    }

    /// Returns the profile with the given name.
    pub fn get(&self, name: &str) -> Result<&MonitorProfile, PsyshapeError> {
        self.profiles
            .get(name)
            .ok_or_else(|| PsyshapeError::UnknownMonitorProfile(name.to_string()))
    }

    /// Returns the profile with the given name. Unknown names produce a
    /// temporary profile with the `testMonitor` calibration.
    pub fn resolve(&self, name: &str) -> MonitorProfile {
        match self.get(name) {
            Ok(profile) => profile.clone(),
            Err(_) => {
                log::warn!(
                    "Monitor profile {:?} not found, using a temporary profile with default calibration",
                    name
                );
                MonitorProfile::test_monitor(name)
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn insert(&mut self, profile: MonitorProfile) -> Result<(), PsyshapeError> {
        profile.validate()?;
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }
}
