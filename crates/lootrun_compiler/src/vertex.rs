//! # Line Vertices
//!
//! GPU-ready vertex data for drawing compiled segments as line strips.
//!
//! World coordinates are `f64`, but GPUs want `f32`. Subtracting the camera
//! origin before the narrowing cast keeps sub-block precision far from the
//! world origin.
//!
//! ## Layout
//!
//! ```text
//! ┌────────────────────────────────┬──────────────┐
//! │ position: [f32; 3] (12 bytes)  │ color (u32)  │  = 16 bytes
//! └────────────────────────────────┴──────────────┘
//! ```

use bytemuck::{Pod, Zeroable};
use lootrun_shared::Point3;

use crate::instance::{ColoredPoint, ColoredSegment};

/// One line-strip vertex, camera-relative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LineVertex {
    /// Position relative to the render origin.
    pub position: [f32; 3],
    /// Packed ARGB color.
    pub color: u32,
}

impl LineVertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds a vertex from a colored point relative to `origin`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_point(point: &ColoredPoint, origin: Point3) -> Self {
        let relative = point.position - origin;
        Self {
            position: [relative.x as f32, relative.y as f32, relative.z as f32],
            color: point.color.0,
        }
    }
}

impl ColoredSegment {
    /// Converts every point of the segment into a vertex relative to `origin`.
    #[must_use]
    pub fn to_vertices(&self, origin: Point3) -> Vec<LineVertex> {
        self.points()
            .iter()
            .map(|point| LineVertex::from_point(point, origin))
            .collect()
    }
}

/// Reinterprets vertices as raw bytes for buffer upload.
#[must_use]
pub fn as_bytes(vertices: &[LineVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lootrun_shared::Argb;

    #[test]
    fn test_vertex_is_16_bytes() {
        assert_eq!(LineVertex::SIZE, 16);
    }

    #[test]
    fn test_camera_relative_positions() {
        let segment = ColoredSegment::new(
            vec![
                ColoredPoint::new(Point3::new(30_000_000.25, 64.0, -30_000_000.5), Argb(0xFF00_FF00)),
                ColoredPoint::new(Point3::new(30_000_001.25, 65.0, -30_000_000.5), Argb(0xFF00_FF00)),
            ],
            false,
        );
        let origin = Point3::new(30_000_000.0, 60.0, -30_000_000.0);
        let vertices = segment.to_vertices(origin);

        assert_eq!(vertices[0].position, [0.25, 4.0, -0.5]);
        assert_eq!(vertices[1].position, [1.25, 5.0, -0.5]);
        assert_eq!(vertices[1].color, 0xFF00_FF00);
        assert_eq!(as_bytes(&vertices).len(), 2 * LineVertex::SIZE);
    }
}
