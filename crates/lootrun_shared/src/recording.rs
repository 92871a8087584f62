//! # Raw Recording
//!
//! The editable, uncompiled form of a lootrun. This is what gets written to
//! disk; compiled render data is always derived from it.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "points": [ { "x": 1.5, "y": 64.0, "z": -3.25 }, ... ],
//!   "chests": [ { "x": 10, "y": 65, "z": 4 }, ... ],
//!   "notes":  [ { "location": { "x": .., "y": .., "z": .. }, "note": "text" } ]
//! }
//! ```
//!
//! `chests` and `notes` may be absent; they read back as empty.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::{BlockPos, Point3};

/// A text annotation pinned to a position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Where the note is anchored.
    #[serde(rename = "location")]
    pub position: Point3,
    /// Note text.
    #[serde(rename = "note")]
    pub text: String,
}

impl Note {
    /// Creates a new note.
    #[must_use]
    pub fn new(position: Point3, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }

    /// Block the note is anchored in.
    #[must_use]
    pub fn block(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }
}

/// Raw lootrun data: path, chests and notes.
///
/// Path order is temporal order. Points are only ever appended or
/// truncated from the tail.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecording {
    /// Recorded path points.
    #[serde(rename = "points")]
    path: Vec<Point3>,
    /// Loot chest locations.
    #[serde(default)]
    chests: BTreeSet<BlockPos>,
    /// Notes, in insertion order.
    #[serde(default)]
    notes: Vec<Note>,
    /// File this recording was read from or last saved to.
    #[serde(skip)]
    source: Option<String>,
}

impl RawRecording {
    /// Creates an empty recording with no source file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording from existing parts.
    #[must_use]
    pub fn from_parts(path: Vec<Point3>, chests: BTreeSet<BlockPos>, notes: Vec<Note>) -> Self {
        Self {
            path,
            chests,
            notes,
            source: None,
        }
    }

    /// Recorded path.
    #[must_use]
    pub fn path(&self) -> &[Point3] {
        &self.path
    }

    /// Chest locations.
    #[must_use]
    pub fn chests(&self) -> &BTreeSet<BlockPos> {
        &self.chests
    }

    /// Notes.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Source file name, if the recording has been saved or loaded.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Sets the source file name.
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Builder-style variant of [`Self::set_source`].
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.chests.is_empty() && self.notes.is_empty()
    }

    /// Appends a point to the end of the path.
    pub fn push_point(&mut self, point: Point3) {
        self.path.push(point);
    }

    /// Drops every path point at index `len` and beyond.
    pub fn truncate_path(&mut self, len: usize) {
        self.path.truncate(len);
    }

    /// Adds a chest. Returns false if it was already present.
    pub fn add_chest(&mut self, pos: BlockPos) -> bool {
        self.chests.insert(pos)
    }

    /// Removes a chest. Returns false if it was not present.
    pub fn remove_chest(&mut self, pos: BlockPos) -> bool {
        self.chests.remove(&pos)
    }

    /// Appends a note.
    pub fn add_note(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Removes and returns the first note anchored in block `pos`.
    pub fn delete_note_at(&mut self, pos: BlockPos) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.block() == pos)?;
        Some(self.notes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_chest_is_noop() {
        let mut recording = RawRecording::new();
        assert!(recording.add_chest(BlockPos::new(1, 2, 3)));
        assert!(!recording.add_chest(BlockPos::new(1, 2, 3)));
        assert_eq!(recording.chests().len(), 1);

        assert!(recording.remove_chest(BlockPos::new(1, 2, 3)));
        assert!(!recording.remove_chest(BlockPos::new(1, 2, 3)));
        assert!(recording.is_empty());
    }

    #[test]
    fn test_delete_note_removes_first_match_only() {
        let mut recording = RawRecording::new();
        recording.add_note(Note::new(Point3::new(1.2, 64.0, 3.7), "first"));
        recording.add_note(Note::new(Point3::new(1.8, 64.5, 3.1), "second"));
        recording.add_note(Note::new(Point3::new(9.0, 64.0, 9.0), "elsewhere"));

        let removed = recording.delete_note_at(BlockPos::new(1, 64, 3));
        assert_eq!(removed.map(|note| note.text), Some("first".to_string()));
        assert_eq!(recording.notes().len(), 2);
        assert_eq!(recording.notes()[0].text, "second");

        assert!(recording.delete_note_at(BlockPos::new(5, 5, 5)).is_none());
    }

    #[test]
    fn test_truncate_keeps_head() {
        let mut recording = RawRecording::new();
        for z in 0..5 {
            recording.push_point(Point3::new(0.0, 0.0, f64::from(z)));
        }
        recording.truncate_path(2);
        assert_eq!(recording.path(), &[Point3::ZERO, Point3::new(0.0, 0.0, 1.0)]);
    }
}
