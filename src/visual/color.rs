// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// An RGBA color with channels between 0.0 and 1.0.
/// Unless stated otherwise, all colors are assumed to be in sRGB color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB values.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from signed RGB values, where -1.0 is black,
    /// 0.0 is mid-grey and 1.0 is full intensity. Values outside [-1, 1] are
    /// clamped.
    pub fn from_signed_rgb(r: f32, g: f32, b: f32) -> Self {
        let convert = |v: f32| (v.clamp(-1.0, 1.0) + 1.0) / 2.0;
        Self::rgb(convert(r), convert(g), convert(b))
    }

    /// Returns the same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: self.a * clamp_opacity(opacity),
            ..self
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const GREY: Self = Self {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

/// Clamp `opacity` to [0, 1]. NaN counts as fully opaque.
pub(crate) fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

impl From<(u8, u8, u8)> for Rgba {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

impl From<Rgba> for wgpu::Color {
    fn from(c: Rgba) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_rgb_maps_to_unit_range() {
        assert_eq!(Rgba::from_signed_rgb(0.0, 0.0, 0.0), Rgba::GREY);
        assert_eq!(Rgba::from_signed_rgb(1.0, 1.0, 1.0), Rgba::WHITE);
        assert_eq!(Rgba::from_signed_rgb(-1.0, -1.0, -1.0), Rgba::BLACK);
        // out of range values are clamped
        assert_eq!(Rgba::from_signed_rgb(3.0, -7.0, 0.0), Rgba::rgb(1.0, 0.0, 0.5));
    }

    #[test]
    fn opacity_scales_alpha() {
        let c = Rgba::new(0.2, 0.4, 0.6, 0.5).with_opacity(0.5);
        assert_eq!(c.a, 0.25);
        assert_eq!(c.r, 0.2);
        assert_eq!(Rgba::WHITE.with_opacity(2.0).a, 1.0);
        assert_eq!(Rgba::WHITE.with_opacity(-1.0).a, 0.0);
    }

    #[test]
    fn nan_opacity_leaves_alpha_unchanged() {
        let c = Rgba::new(0.2, 0.4, 0.6, 0.5).with_opacity(f32::NAN);
        assert_eq!(c.a, 0.5);
        assert_eq!(clamp_opacity(f32::NAN), 1.0);
    }

    #[test]
    fn converts_bytes_and_wgpu() {
        let c: Rgba = (255u8, 0u8, 51u8).into();
        assert_eq!(c, Rgba::rgb(1.0, 0.0, 0.2));

        let w: wgpu::Color = Rgba::GREY.into();
        assert_eq!(w.r, 0.5);
        assert_eq!(w.a, 1.0);
    }
}
