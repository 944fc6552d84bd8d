pub mod shape;

use super::geometry::{Vertex, WindowPhysicalProperties};
use crate::options::Units;

/// Types that can be drawn into a window's back buffer.
pub trait Drawable {
    /// Tessellate into a triangle list in centred pixel coordinates.
    /// `window_units` is used for any value that does not carry its own
    /// units.
    fn to_vertices(&self, props: &WindowPhysicalProperties, window_units: Units) -> Vec<Vertex>;
}
