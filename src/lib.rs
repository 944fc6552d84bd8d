// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Open a calibrated window and present a circle stimulus.
//!
//! ```no_run
//! use psyshape::prelude::*;
//!
//! fn main() -> Result<(), PsyshapeError> {
//!     let options = WindowOptions {
//!         record_frame_intervals: true,
//!         ..WindowOptions::default()
//!     };
//!     let mut win = Window::new(&options, &MonitorProfiles::builtin())?;
//!
//!     let mut circle = Circle::new(2.0, 32)?;
//!     circle.set_pos(0.0, 0.0);
//!     win.draw(&circle);
//!
//!     win.flip()?;
//!     win.wait(5.0)?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod fonts;
pub mod monitors;
pub mod options;
pub mod timing;
pub mod visual;

pub use timing::wait;

pub mod prelude {
    pub use crate::errors::PsyshapeError;
    pub use crate::fonts::FontPreferences;
    pub use crate::monitors::{MonitorProfile, MonitorProfiles};
    pub use crate::options::{Units, WindowOptions};
    pub use crate::visual::color::Rgba;
    pub use crate::visual::geometry::Size;
    pub use crate::visual::stimuli::shape::Circle;
    pub use crate::visual::stimuli::Drawable;
    pub use crate::visual::window::{WaitResult, Window};
}
