// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsyshapeError {
    // file errors
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    CSVError(#[from] csv::Error),

    // monitor profile errors
    #[error("Failed to parse monitor profiles: {0}")]
    ProfileParseError(#[from] toml::de::Error),
    #[error("Invalid monitor profile {0}: {1}")]
    InvalidMonitorProfile(String, String),
    #[error("No monitor profile named {0}")]
    UnknownMonitorProfile(String),

    // parameter errors
    #[error("Unknown unit system: {0} (expected one of pix, deg, cm, norm, height)")]
    InvalidUnits(String),
    #[error("A circle needs at least 3 edges, got {0}")]
    InvalidEdges(u32),
    #[error("Radius must be a finite, non-negative number, got {0}")]
    InvalidRadius(f32),
    #[error("Duration must be a finite, non-negative number of seconds, got {0}")]
    InvalidDuration(f64),

    // windowing errors
    #[error("{0}")]
    EventLoopError(#[from] winit::error::EventLoopError),
    #[error("{0}")]
    OsError(#[from] winit::error::OsError),

    // graphics errors
    #[error("{0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to find a suitable graphics adapter")]
    NoSuitableAdapterError,
    #[error("{0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Failed to acquire the next frame: {0}")]
    SurfaceError(#[from] wgpu::SurfaceError),
}
