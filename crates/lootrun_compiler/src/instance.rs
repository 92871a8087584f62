//! # Compiled Instance
//!
//! Render-ready lootrun data, bucketed by chunk. Instances are built once by
//! the compiler and never mutated; any change to the raw recording produces
//! a whole new instance.

use std::collections::{BTreeMap, BTreeSet};

use lootrun_shared::{Argb, BlockPos, ChunkKey, Note, Point3};

/// A resampled path point with its render color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColoredPoint {
    /// Position in world space.
    pub position: Point3,
    /// Line color.
    pub color: Argb,
}

impl ColoredPoint {
    /// Creates a new colored point.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3, color: Argb) -> Self {
        Self { position, color }
    }

    /// Chunk this point falls in.
    #[inline]
    #[must_use]
    pub fn chunk(&self) -> ChunkKey {
        ChunkKey::of_point(self.position)
    }
}

/// One visually contiguous polyline inside a single chunk bucket.
///
/// A segment started because the path crossed into a new chunk begins with
/// a copy of the last point of the previous chunk (the connector), so
/// adjacent buckets join up when drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ColoredSegment {
    points: Vec<ColoredPoint>,
    connected: bool,
}

impl ColoredSegment {
    /// Creates a segment. `connected` marks `points[0]` as a connector.
    #[must_use]
    pub fn new(points: Vec<ColoredPoint>, connected: bool) -> Self {
        Self { points, connected }
    }

    /// All points, connector included.
    #[must_use]
    pub fn points(&self) -> &[ColoredPoint] {
        &self.points
    }

    /// Returns true if the first point is a connector from the previous chunk.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Points that belong to this segment's own chunk (connector skipped).
    #[must_use]
    pub fn owned_points(&self) -> &[ColoredPoint] {
        if self.connected {
            self.points.get(1..).unwrap_or(&[])
        } else {
            &self.points
        }
    }

    /// Number of points, connector included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the segment has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Size summary of an instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstanceStats {
    /// Chunks holding at least one segment, chest or note.
    pub chunks: usize,
    /// Total segments.
    pub segments: usize,
    /// Total points across all segments, connectors included.
    pub points: usize,
    /// Total chests.
    pub chests: usize,
    /// Total notes.
    pub notes: usize,
}

/// Compiled, chunk-indexed lootrun.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledInstance {
    pub(crate) name: String,
    pub(crate) segments: BTreeMap<ChunkKey, Vec<ColoredSegment>>,
    pub(crate) chests: BTreeMap<ChunkKey, BTreeSet<BlockPos>>,
    pub(crate) notes: BTreeMap<ChunkKey, Vec<Note>>,
}

impl CompiledInstance {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every chunk bucket of path segments.
    #[must_use]
    pub fn segments(&self) -> &BTreeMap<ChunkKey, Vec<ColoredSegment>> {
        &self.segments
    }

    /// Every chunk bucket of chests.
    #[must_use]
    pub fn chests(&self) -> &BTreeMap<ChunkKey, BTreeSet<BlockPos>> {
        &self.chests
    }

    /// Every chunk bucket of notes.
    #[must_use]
    pub fn notes(&self) -> &BTreeMap<ChunkKey, Vec<Note>> {
        &self.notes
    }

    /// Segments in one chunk.
    #[must_use]
    pub fn segments_in(&self, key: ChunkKey) -> &[ColoredSegment] {
        self.segments.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Chests in one chunk.
    pub fn chests_in(&self, key: ChunkKey) -> impl Iterator<Item = &BlockPos> + '_ {
        self.chests.get(&key).into_iter().flatten()
    }

    /// Notes in one chunk.
    #[must_use]
    pub fn notes_in(&self, key: ChunkKey) -> &[Note] {
        self.notes.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Chunks within `radius` chunks (square) of the chunk containing
    /// `center` that hold path segments.
    ///
    /// This is the renderer's view query.
    pub fn chunks_near(&self, center: Point3, radius: i32) -> impl Iterator<Item = ChunkKey> + '_ {
        let origin = ChunkKey::of_point(center);
        let (cx, cz) = (origin.chunk_x(), origin.chunk_z());
        let radius = radius.max(0);
        (cx.saturating_sub(radius)..=cx.saturating_add(radius)).flat_map(move |x| {
            (cz.saturating_sub(radius)..=cz.saturating_add(radius))
                .map(move |z| ChunkKey::pack(x, z))
                .filter(move |key| self.segments.contains_key(key))
        })
    }

    /// Returns true if the instance holds nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.chests.is_empty() && self.notes.is_empty()
    }

    /// Counts chunks, segments, points, chests and notes.
    #[must_use]
    pub fn stats(&self) -> InstanceStats {
        let chunks: BTreeSet<ChunkKey> = self
            .segments
            .keys()
            .chain(self.chests.keys())
            .chain(self.notes.keys())
            .copied()
            .collect();

        InstanceStats {
            chunks: chunks.len(),
            segments: self.segments.values().map(Vec::len).sum(),
            points: self
                .segments
                .values()
                .flatten()
                .map(ColoredSegment::len)
                .sum(),
            chests: self.chests.values().map(BTreeSet::len).sum(),
            notes: self.notes.values().map(Vec::len).sum(),
        }
    }
}
