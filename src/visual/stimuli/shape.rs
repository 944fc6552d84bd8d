// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f32::consts::PI;

use super::Drawable;
use crate::errors::PsyshapeError;
use crate::options::{Axis, Units};
use crate::visual::color::{clamp_opacity, Rgba};
use crate::visual::geometry::{Vertex, WindowPhysicalProperties};

/// A circle, approximated by a regular polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    radius: f32,
    edges: u32,
    /// Position of the centre. (0, 0) is the centre of the window.
    pub pos: (f32, f32),
    /// Units of `radius` and `pos`. `None` uses the units of the window.
    pub units: Option<Units>,
    pub fill_color: Option<Rgba>,
    pub line_color: Option<Rgba>,
    /// Outline width in pixels.
    pub line_width: f32,
    pub opacity: f32,
}

fn check_radius(radius: f32) -> Result<f32, PsyshapeError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(PsyshapeError::InvalidRadius(radius))
    }
}

impl Circle {
    /// Create a white, unfilled circle with the given radius, approximated by
    /// a polygon with `edges` corners.
    pub fn new(radius: f32, edges: u32) -> Result<Self, PsyshapeError> {
        if edges < 3 {
            return Err(PsyshapeError::InvalidEdges(edges));
        }
        Ok(Self {
            radius: check_radius(radius)?,
            edges,
            pos: (0.0, 0.0),
            units: None,
            fill_color: None,
            line_color: Some(Rgba::WHITE),
            line_width: 1.5,
            opacity: 1.0,
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn edges(&self) -> u32 {
        self.edges
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), PsyshapeError> {
        self.radius = check_radius(radius)?;
        Ok(())
    }

    pub fn set_pos(&mut self, x: f32, y: f32) {
        self.pos = (x, y);
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = Some(units);
    }

    pub fn set_fill_color(&mut self, color: Option<Rgba>) {
        self.fill_color = color;
    }

    pub fn set_line_color(&mut self, color: Option<Rgba>) {
        self.line_color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width.max(0.0);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
    }

    pub fn with_pos(mut self, x: f32, y: f32) -> Self {
        self.set_pos(x, y);
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.set_units(units);
        self
    }

    pub fn with_fill_color(mut self, color: Option<Rgba>) -> Self {
        self.set_fill_color(color);
        self
    }

    pub fn with_line_color(mut self, color: Option<Rgba>) -> Self {
        self.set_line_color(color);
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.set_line_width(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    /// Centre and per-axis radius in pixels.
    fn eval(&self, props: &WindowPhysicalProperties, window_units: Units) -> ((f32, f32), (f32, f32)) {
        let units = self.units.unwrap_or(window_units);
        let center = (
            units.to_size(self.pos.0, Axis::X).eval(props),
            units.to_size(self.pos.1, Axis::Y).eval(props),
        );
        let radius = (
            units.to_size(self.radius, Axis::X).eval(props),
            units.to_size(self.radius, Axis::Y).eval(props),
        );
        (center, radius)
    }

    /// Unit direction of each corner, starting straight up and going
    /// clockwise.
    fn directions(&self) -> impl Iterator<Item = (f32, f32)> {
        let step = 2.0 * PI / self.edges as f32;
        (0..self.edges).map(move |e| {
            let angle = e as f32 * step;
            (angle.sin(), angle.cos())
        })
    }

    /// The corners of the polygon in centred pixel coordinates.
    pub fn polygon(&self, props: &WindowPhysicalProperties, window_units: Units) -> Vec<[f32; 2]> {
        let ((cx, cy), (rx, ry)) = self.eval(props, window_units);
        self.directions()
            .map(|(dx, dy)| [cx + rx * dx, cy + ry * dy])
            .collect()
    }
}

impl Drawable for Circle {
    fn to_vertices(&self, props: &WindowPhysicalProperties, window_units: Units) -> Vec<Vertex> {
        let ((cx, cy), (rx, ry)) = self.eval(props, window_units);
        let n = self.edges as usize;
        let mut vertices = Vec::new();

        if let Some(fill) = self.fill_color {
            let color = fill.with_opacity(self.opacity).to_array();
            let corners = self.polygon(props, window_units);
            vertices.reserve(3 * n);
            for e in 0..n {
                let next = (e + 1) % n;
                vertices.push(Vertex {
                    position: [cx, cy],
                    color,
                });
                vertices.push(Vertex {
                    position: corners[e],
                    color,
                });
                vertices.push(Vertex {
                    position: corners[next],
                    color,
                });
            }
        }

        if let Some(line) = self.line_color {
            if self.line_width > 0.0 {
                let color = line.with_opacity(self.opacity).to_array();
                let half = self.line_width / 2.0;
                let (inner, outer): (Vec<[f32; 2]>, Vec<[f32; 2]>) = self
                    .directions()
                    .map(|(dx, dy)| {
                        (
                            [cx + (rx - half).max(0.0) * dx, cy + (ry - half).max(0.0) * dy],
                            [cx + (rx + half) * dx, cy + (ry + half) * dy],
                        )
                    })
                    .unzip();

                vertices.reserve(6 * n);
                for e in 0..n {
                    let next = (e + 1) % n;
                    for position in [
                        inner[e],
                        outer[e],
                        outer[next],
                        inner[e],
                        outer[next],
                        inner[next],
                    ] {
                        vertices.push(Vertex { position, color });
                    }
                }
            }
        }

        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> WindowPhysicalProperties {
        WindowPhysicalProperties {
            width_px: 800,
            height_px: 400,
            pixels_per_cm: 1024.0 / 30.0,
            viewing_distance_cm: 57.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn validates_parameters() {
        assert!(matches!(Circle::new(1.0, 2), Err(PsyshapeError::InvalidEdges(2))));
        assert!(matches!(Circle::new(-1.0, 32), Err(PsyshapeError::InvalidRadius(_))));
        assert!(matches!(Circle::new(f32::NAN, 32), Err(PsyshapeError::InvalidRadius(_))));
        let mut c = Circle::new(0.0, 3).unwrap();
        assert!(c.set_radius(f32::INFINITY).is_err());
        assert_eq!(c.radius(), 0.0);
    }

    #[test]
    fn defaults_to_a_white_outline() {
        let c = Circle::new(2.0, 32).unwrap();
        assert_eq!(c.pos, (0.0, 0.0));
        assert_eq!(c.units, None);
        assert_eq!(c.fill_color, None);
        assert_eq!(c.line_color, Some(Rgba::WHITE));
        assert_eq!(c.line_width, 1.5);
    }

    #[test]
    fn polygon_starts_at_the_top_and_lies_on_the_radius() {
        let c = Circle::new(100.0, 32).unwrap();
        let corners = c.polygon(&props(), Units::Pix);
        assert_eq!(corners.len(), 32);
        assert!(approx(corners[0][0], 0.0));
        assert!(approx(corners[0][1], 100.0));
        // clockwise: a quarter turn later we are on the right
        assert!(approx(corners[8][0], 100.0));
        assert!(approx(corners[8][1], 0.0));
        for [x, y] in corners {
            assert!(approx((x * x + y * y).sqrt(), 100.0));
        }
    }

    #[test]
    fn position_offsets_every_corner() {
        let c = Circle::new(10.0, 4).unwrap().with_pos(5.0, -5.0);
        let corners = c.polygon(&props(), Units::Pix);
        assert!(approx(corners[0][0], 5.0));
        assert!(approx(corners[0][1], 5.0));
        assert!(approx(corners[2][1], -15.0));
    }

    #[test]
    fn degrees_radius_uses_calibration() {
        let p = props();
        let c = Circle::new(2.0, 32).unwrap();
        let expected = crate::visual::geometry::Size::Degrees(2.0).eval(&p);
        let corners = c.polygon(&p, Units::Deg);
        assert!(approx(corners[0][1], expected));
    }

    #[test]
    fn flat_degrees_radius_is_larger_than_degrees() {
        let p = props();
        let c = Circle::new(20.0, 32).unwrap();
        let deg = c.polygon(&p, Units::Deg)[0][1];
        let flat = c.polygon(&p, Units::DegFlat)[0][1];
        assert!(approx(flat, crate::visual::geometry::Size::DegreesFlat(20.0).eval(&p)));
        assert!(flat > deg);
    }

    #[test]
    fn own_units_override_window_units() {
        let c = Circle::new(50.0, 8).unwrap().with_units(Units::Pix);
        let corners = c.polygon(&props(), Units::Deg);
        assert!(approx(corners[0][1], 50.0));
    }

    #[test]
    fn norm_units_stretch_with_the_window() {
        let c = Circle::new(0.5, 4).unwrap();
        let corners = c.polygon(&props(), Units::Norm);
        // top corner: half of the half-height
        assert!(approx(corners[0][1], 100.0));
        // right corner: half of the half-width
        assert!(approx(corners[1][0], 200.0));
    }

    #[test]
    fn vertex_counts() {
        let p = props();
        let outline = Circle::new(10.0, 32).unwrap();
        assert_eq!(outline.to_vertices(&p, Units::Pix).len(), 6 * 32);

        let both = outline.clone().with_fill_color(Some(Rgba::BLACK));
        assert_eq!(both.to_vertices(&p, Units::Pix).len(), 9 * 32);

        let fill_only = both.clone().with_line_color(None);
        assert_eq!(fill_only.to_vertices(&p, Units::Pix).len(), 3 * 32);

        let nothing = fill_only.with_fill_color(None);
        assert!(nothing.to_vertices(&p, Units::Pix).is_empty());

        let zero_width = outline.with_line_width(0.0);
        assert!(zero_width.to_vertices(&p, Units::Pix).is_empty());
    }

    #[test]
    fn fill_fans_out_from_the_centre() {
        let c = Circle::new(10.0, 6)
            .unwrap()
            .with_pos(3.0, 4.0)
            .with_line_color(None)
            .with_fill_color(Some(Rgba::WHITE));
        let vertices = c.to_vertices(&props(), Units::Pix);
        for triangle in vertices.chunks(3) {
            assert_eq!(triangle[0].position, [3.0, 4.0]);
        }
    }

    #[test]
    fn outline_straddles_the_radius() {
        let c = Circle::new(10.0, 4).unwrap().with_line_width(2.0);
        let vertices = c.to_vertices(&props(), Units::Pix);
        // first quad starts at the top corner: inner, then outer
        assert!(approx(vertices[0].position[1], 9.0));
        assert!(approx(vertices[1].position[1], 11.0));
    }

    #[test]
    fn opacity_goes_into_alpha() {
        let c = Circle::new(10.0, 8).unwrap().with_opacity(0.5);
        let vertices = c.to_vertices(&props(), Units::Pix);
        assert!(vertices.iter().all(|v| v.color == [1.0, 1.0, 1.0, 0.5]));
    }

    #[test]
    fn nan_opacity_keeps_the_circle_opaque() {
        let mut c = Circle::new(10.0, 8).unwrap().with_fill_color(Some(Rgba::BLACK));
        c.set_opacity(f32::NAN);
        assert_eq!(c.opacity, 1.0);
        let vertices = c.to_vertices(&props(), Units::Pix);
        assert!(vertices.iter().all(|v| v.color[3] == 1.0));
    }
}
