//! This module contains everything that ends up on the screen: the
//! [window](window/struct.Window.html), the [circle](stimuli/shape/struct.Circle.html)
//! stimulus and the types used to describe their geometry and color.
//!
//! # Background
//!
//! Rendering is implemented using the [wgpu](https://wgpu.rs/) library on top
//! of a [winit](https://docs.rs/winit) window. Stimuli are tessellated into
//! triangles on the CPU, in a pixel coordinate system centred on the window,
//! and drawn with a single pipeline.
pub mod color;
pub mod geometry;
pub mod renderer;
pub mod stimuli;
pub mod window;

pub use color::Rgba;
pub use window::{WaitResult, Window};
