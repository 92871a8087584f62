//! # Chunk Keys
//!
//! Compiled lootruns are bucketed by 16x16 horizontal chunks so the renderer
//! only touches the buckets around the camera.
//!
//! ## Key Format
//!
//! ```text
//! ┌────────────────────────────┬────────────────────────────┐
//! │ chunk X (i32, bits 63..32) │ chunk Z (i32, bits 31..0)  │
//! └────────────────────────────┴────────────────────────────┘
//! ```
//!
//! Both halves are two's-complement 32-bit values, so negative chunks
//! survive a pack/unpack cycle unchanged.

use crate::math::{BlockPos, Point3};

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Right shift turning a block coordinate into a chunk coordinate.
pub const CHUNK_SHIFT: u32 = 4;

/// Packed chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKey(i64);

impl ChunkKey {
    /// Packs chunk coordinates into a key.
    #[inline]
    #[must_use]
    pub const fn pack(chunk_x: i32, chunk_z: i32) -> Self {
        Self(((chunk_x as i64) << 32) | (chunk_z as i64 & 0xFFFF_FFFF))
    }

    /// Rebuilds a key from its raw packed value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Chunk X coordinate (in chunks, not blocks).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn chunk_x(self) -> i32 {
        (self.0 >> 32) as i32
    }

    /// Chunk Z coordinate (in chunks, not blocks).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn chunk_z(self) -> i32 {
        self.0 as i32
    }

    /// Converts world block coordinates to a chunk key.
    #[inline]
    #[must_use]
    pub const fn from_block_coords(block_x: i32, block_z: i32) -> Self {
        Self::pack(block_x >> CHUNK_SHIFT, block_z >> CHUNK_SHIFT)
    }

    /// Chunk key of a continuous position: `(floor(x) >> 4, floor(z) >> 4)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_xz(x: f64, z: f64) -> Self {
        Self::from_block_coords(x.floor() as i32, z.floor() as i32)
    }

    /// Chunk key of a point.
    #[inline]
    #[must_use]
    pub fn of_point(point: Point3) -> Self {
        Self::from_xz(point.x, point.z)
    }

    /// Chunk key of a block.
    #[inline]
    #[must_use]
    pub const fn of_block(pos: BlockPos) -> Self {
        Self::from_block_coords(pos.x, pos.z)
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.chunk_x() * CHUNK_SIZE
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.chunk_z() * CHUNK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_negative() {
        let key = ChunkKey::pack(-5, 10);
        assert_eq!(key.chunk_x(), -5);
        assert_eq!(key.chunk_z(), 10);

        let key = ChunkKey::pack(7, -1);
        assert_eq!(key.chunk_x(), 7);
        assert_eq!(key.chunk_z(), -1);
        assert_eq!(ChunkKey::from_raw(key.raw()), key);
    }

    #[test]
    fn test_x_in_high_bits() {
        assert_eq!(ChunkKey::pack(1, 0).raw(), 1_i64 << 32);
        assert_eq!(ChunkKey::pack(0, 1).raw(), 1);
        assert_eq!(ChunkKey::pack(0, -1).raw(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_floor_before_shift() {
        // -0.5 floors to -1, which lives in chunk -1, not chunk 0
        assert_eq!(ChunkKey::from_xz(-0.5, 0.0), ChunkKey::pack(-1, 0));
        assert_eq!(ChunkKey::from_xz(15.99, 16.0), ChunkKey::pack(0, 1));
        assert_eq!(ChunkKey::from_xz(-16.0, -17.0), ChunkKey::pack(-1, -2));
    }

    #[test]
    fn test_block_and_point_agree() {
        let pos = BlockPos::new(-33, 70, 48);
        assert_eq!(ChunkKey::of_block(pos), ChunkKey::of_point(pos.center()));
        assert_eq!(ChunkKey::of_block(pos).world_x(), -48);
        assert_eq!(ChunkKey::of_block(pos).world_z(), 48);
    }
}
