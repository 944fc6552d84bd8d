// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! This module contains the types used to specify the geometry of a
//! stimulus: lengths in different units, the physical description of the
//! window they are evaluated against, and the vertex format that ends up on
//! the GPU.

/// Describes the physical aspect of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPhysicalProperties {
    /// The width of the window in pixels.
    pub width_px: u32,
    /// The height of the window in pixels.
    pub height_px: u32,
    /// Number of pixels per centimeter on the monitor.
    pub pixels_per_cm: f32,
    /// The viewing distance in centimeters.
    pub viewing_distance_cm: f32,
}

/// This enum is used to specify the size and position of a stimulus. The unit
/// can be specified in different ways, which will be evaluated just before the
/// object is rendered. This allows for the size of the object to be specified
/// in a flexible way, e.g. as a fraction of the screen size or in degrees of
/// visual angle.
///
/// The actual size in pixels is only known once the size is evaluated against
/// the [`WindowPhysicalProperties`] of a window, as it depends on the size of
/// the window, the distance of the observer to the screen, and the physical
/// size of the screen.
///
/// # Examples
///
/// ```
/// use psyshape::visual::geometry::Size;
///
/// // 100 pixels
/// let a = Size::Pixels(100.0);
///
/// // 10% of the window width plus two degrees of visual angle
/// let b = Size::ScreenWidth(0.1) + Size::Degrees(2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Size {
    /// Physical pixels.
    Pixels(f32),
    /// Degrees of visual angle, small-angle approximation.
    Degrees(f32),
    /// Degrees of visual angle, corrected for a flat screen: the distance
    /// from the screen centre at which a point appears at this eccentricity.
    DegreesFlat(f32),
    /// Centimeters.
    Centimeters(f32),
    /// Millimeters.
    Millimeters(f32),
    /// Fraction of the window width.
    ScreenWidth(f32),
    /// Fraction of the window height.
    ScreenHeight(f32),
    /// Sum of two sizes.
    Sum(Box<Size>, Box<Size>),
    /// Difference of two sizes.
    Difference(Box<Size>, Box<Size>),
    /// A size multiplied by a dimensionless factor.
    Product(Box<Size>, f32),
}

impl std::ops::Add for Size {
    type Output = Size;

    /// Add two sizes together. The result is a `Size::Sum`.
    fn add(self, rhs: Self) -> Self::Output {
        Size::Sum(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for Size {
    type Output = Size;

    /// Subtract two sizes. The result is a `Size::Difference`.
    fn sub(self, rhs: Self) -> Self::Output {
        Size::Difference(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul<f32> for Size {
    type Output = Size;

    fn mul(self, rhs: f32) -> Self::Output {
        Size::Product(Box::new(self), rhs)
    }
}

impl std::ops::Neg for Size {
    type Output = Size;

    fn neg(self) -> Self::Output {
        Size::Product(Box::new(self), -1.0)
    }
}

impl Size {
    /// Convert degrees of visual angle to centimeters, using the arc length
    /// at the viewing distance.
    fn angle_to_centimeter(angle: f32, viewing_distance_cm: f32) -> f32 {
        angle.to_radians() * viewing_distance_cm
    }

    /// Convert an eccentricity in degrees to centimeters from the screen
    /// centre on a flat screen.
    fn flat_angle_to_centimeter(angle: f32, viewing_distance_cm: f32) -> f32 {
        viewing_distance_cm * angle.to_radians().tan()
    }

    /// Evaluate the size in pixels for the given window.
    pub fn eval(&self, props: &WindowPhysicalProperties) -> f32 {
        match self {
            Size::Pixels(px) => *px,
            Size::Degrees(deg) => {
                Size::angle_to_centimeter(*deg, props.viewing_distance_cm) * props.pixels_per_cm
            }
            Size::DegreesFlat(deg) => {
                Size::flat_angle_to_centimeter(*deg, props.viewing_distance_cm) * props.pixels_per_cm
            }
            Size::Centimeters(cm) => *cm * props.pixels_per_cm,
            Size::Millimeters(mm) => *mm / 10.0 * props.pixels_per_cm,
            Size::ScreenWidth(f) => *f * props.width_px as f32,
            Size::ScreenHeight(f) => *f * props.height_px as f32,
            Size::Sum(a, b) => a.eval(props) + b.eval(props),
            Size::Difference(a, b) => a.eval(props) - b.eval(props),
            Size::Product(a, f) => a.eval(props) * *f,
        }
    }
}

/// A vertex in the centred pixel coordinate system: (0, 0) is the centre of
/// the window and +y points up.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Returns the 4x4 matrix that, when applied to centred pixel coordinates,
/// transforms them to normalized device coordinates.
#[rustfmt::skip]
pub fn pixels_to_ndc(width_px: u32, height_px: u32) -> nalgebra::Matrix4<f32> {
    nalgebra::Matrix4::new(
        2.0 / width_px.max(1) as f32, 0.0, 0.0, 0.0,
        0.0, 2.0 / height_px.max(1) as f32, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> WindowPhysicalProperties {
        WindowPhysicalProperties {
            width_px: 800,
            height_px: 600,
            pixels_per_cm: 1024.0 / 30.0,
            viewing_distance_cm: 57.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn pixels_pass_through() {
        assert_eq!(Size::Pixels(12.5).eval(&props()), 12.5);
    }

    #[test]
    fn physical_lengths_use_pixels_per_cm() {
        let p = props();
        assert!(approx(Size::Centimeters(30.0).eval(&p), 1024.0));
        assert!(approx(Size::Millimeters(300.0).eval(&p), 1024.0));
    }

    #[test]
    fn degrees_use_viewing_distance() {
        let p = props();
        let expected_cm = 2.0f32.to_radians() * 57.0;
        assert!(approx(Size::Degrees(2.0).eval(&p), expected_cm * p.pixels_per_cm));
        // at 57 cm one degree is close to one centimeter
        assert!((Size::Degrees(1.0).eval(&p) / p.pixels_per_cm - 1.0).abs() < 0.01);
        // linear in the angle
        let ratio = Size::Degrees(20.0).eval(&p) / Size::Degrees(2.0).eval(&p);
        assert!((ratio - 10.0).abs() < 1e-4);
    }

    #[test]
    fn flat_degrees_grow_with_eccentricity() {
        let p = props();
        let expected_cm = 57.0 * 20.0f32.to_radians().tan();
        assert!(approx(Size::DegreesFlat(20.0).eval(&p), expected_cm * p.pixels_per_cm));
        // about 4% wider than the small-angle value at 20 degrees
        let ratio = Size::DegreesFlat(20.0).eval(&p) / Size::Degrees(20.0).eval(&p);
        assert!(ratio > 1.03 && ratio < 1.05);
        // and nearly identical close to the centre
        let ratio = Size::DegreesFlat(1.0).eval(&p) / Size::Degrees(1.0).eval(&p);
        assert!((ratio - 1.0).abs() < 1e-3);
        assert_eq!(Size::DegreesFlat(0.0).eval(&p), 0.0);
    }

    #[test]
    fn screen_fractions_follow_window_size() {
        let p = props();
        assert_eq!(Size::ScreenWidth(0.5).eval(&p), 400.0);
        assert_eq!(Size::ScreenHeight(0.5).eval(&p), 300.0);
    }

    #[test]
    fn composite_sizes() {
        let p = props();
        let s = Size::ScreenWidth(0.5) + Size::Pixels(10.0) - Size::Pixels(4.0);
        assert_eq!(s.eval(&p), 406.0);
        assert_eq!((Size::Pixels(3.0) * 4.0).eval(&p), 12.0);
        assert_eq!((-Size::Pixels(3.0)).eval(&p), -3.0);
    }

    #[test]
    fn ndc_matrix_maps_window_edges() {
        let m = pixels_to_ndc(800, 600);
        let corner = m * nalgebra::Vector4::new(400.0, -300.0, 0.0, 1.0);
        assert!(approx(corner.x, 1.0));
        assert!(approx(corner.y, -1.0));
    }
}
