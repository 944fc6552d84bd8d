// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::errors::PsyshapeError;
use crate::monitors::DEFAULT_MONITOR;
use crate::visual::color::Rgba;
use crate::visual::geometry::Size;

/// The unit system plain numbers are interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    /// Pixels.
    Pix,
    /// Degrees of visual angle.
    Deg,
    /// Degrees of visual angle, corrected for a flat screen.
    DegFlat,
    /// Centimeters on the screen.
    Cm,
    /// Normalised units: -1 to 1 spans the window on each axis.
    Norm,
    /// Fractions of the window height on both axes.
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Units {
    /// Convert a number given in these units to a `Size` along `axis`.
    pub fn to_size(self, value: f32, axis: Axis) -> Size {
        match (self, axis) {
            (Units::Pix, _) => Size::Pixels(value),
            (Units::Deg, _) => Size::Degrees(value),
            (Units::DegFlat, _) => Size::DegreesFlat(value),
            (Units::Cm, _) => Size::Centimeters(value),
            (Units::Norm, Axis::X) => Size::ScreenWidth(value / 2.0),
            (Units::Norm, Axis::Y) => Size::ScreenHeight(value / 2.0),
            (Units::Height, _) => Size::ScreenHeight(value),
        }
    }
}

impl FromStr for Units {
    type Err = PsyshapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pix" | "pixels" => Ok(Units::Pix),
            "deg" | "degs" => Ok(Units::Deg),
            "degflat" => Ok(Units::DegFlat),
            "cm" => Ok(Units::Cm),
            "norm" => Ok(Units::Norm),
            "height" => Ok(Units::Height),
            _ => Err(PsyshapeError::InvalidUnits(s.to_string())),
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Units::Pix => "pix",
            Units::Deg => "deg",
            Units::DegFlat => "degFlat",
            Units::Cm => "cm",
            Units::Norm => "norm",
            Units::Height => "height",
        };
        write!(f, "{}", name)
    }
}

/// Options used to open a window.
#[derive(Debug, Clone)]
pub struct WindowOptions {
    /// Inner size of the window in physical pixels.
    pub size: (u32, u32),
    /// Show window decorations. A window without them is borderless.
    pub allow_gui: bool,
    /// Name of the monitor calibration profile.
    pub monitor: String,
    /// Default units for stimuli drawn to this window.
    pub units: Units,
    /// Index of the display to open the window on.
    pub screen: usize,
    /// Background color.
    pub color: Rgba,
    pub title: String,
    /// Record the time between consecutive flips.
    pub record_frame_intervals: bool,
    /// Synchronise flips to the display refresh.
    pub vsync: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            size: (800, 800),
            allow_gui: false,
            monitor: DEFAULT_MONITOR.to_string(),
            units: Units::Deg,
            screen: 0,
            color: Rgba::from_signed_rgb(0.0, 0.0, 0.0),
            title: "psyshape".to_string(),
            record_frame_intervals: false,
            vsync: true,
        }
    }
}
