//! # Lootrun Compiler
//!
//! Builds a [`CompiledInstance`] from a [`RawRecording`].
//!
//! ## Segmenting
//!
//! The colored sample stream is walked once. A new segment starts when:
//!
//! - the sample lands in a different chunk than the current segment, or
//! - the sample is `segment_break_distance` or more from the previous one
//!
//! On a chunk change (and only then) the previous sample is repeated as the
//! first point of the new segment so the two buckets join without a gap.

use std::path::Path;

use lootrun_shared::{Argb, ChunkKey, RawRecording};

use crate::instance::{ColoredPoint, ColoredSegment, CompiledInstance};
use crate::palette::{rainbow_color, ColorPolicy};
use crate::path::{resample_path, DEFAULT_BREAK_DISTANCE, DEFAULT_SAMPLE_RATE};

/// Display name of a recording that has never been saved.
pub const UNSAVED_NAME: &str = "Recording";

/// Which slot the instance is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileMode {
    /// A finished or loaded lootrun.
    Active,
    /// The live preview of an in-progress recording. Always static-colored.
    RecordingPreview,
}

/// Compiler tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompileSettings {
    /// Resampled points per block.
    pub sample_rate: u32,
    /// Jump distance that splits the raw path into independent runs.
    pub break_distance: f64,
    /// Jump distance between samples that starts a new segment.
    pub segment_break_distance: f64,
    /// Coloring of active instances.
    pub color_policy: ColorPolicy,
    /// Static color for active instances.
    pub active_color: Argb,
    /// Static color for the recording preview.
    pub preview_color: Argb,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            break_distance: DEFAULT_BREAK_DISTANCE,
            segment_break_distance: DEFAULT_BREAK_DISTANCE,
            color_policy: ColorPolicy::Static,
            active_color: Argb(0xFF55_FFFF),
            preview_color: Argb(0xFFFF_5555),
        }
    }
}

/// Compiles raw recordings with a fixed set of settings.
#[derive(Clone, Debug, Default)]
pub struct LootrunCompiler {
    settings: CompileSettings,
}

impl LootrunCompiler {
    /// Creates a compiler.
    #[must_use]
    pub const fn new(settings: CompileSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// Compiles `recording` for the given slot.
    #[must_use]
    pub fn compile(&self, recording: &RawRecording, mode: CompileMode) -> CompiledInstance {
        let samples = resample_path(
            recording.path(),
            self.settings.break_distance,
            self.settings.sample_rate,
        );

        let policy = match mode {
            CompileMode::Active => self.settings.color_policy,
            CompileMode::RecordingPreview => ColorPolicy::Static,
        };
        let static_color = match mode {
            CompileMode::Active => self.settings.active_color,
            CompileMode::RecordingPreview => self.settings.preview_color,
        };

        let colored = samples.into_iter().enumerate().map(|(index, position)| {
            let color = match policy {
                ColorPolicy::Static => static_color,
                ColorPolicy::Rainbow { cycle_distance } => rainbow_color(index, cycle_distance),
            };
            ColoredPoint::new(position, color)
        });

        let mut instance = CompiledInstance {
            name: display_name(recording.source()),
            ..CompiledInstance::default()
        };
        self.bucket_segments(colored, &mut instance);

        for &chest in recording.chests() {
            instance
                .chests
                .entry(ChunkKey::of_block(chest))
                .or_default()
                .insert(chest);
        }

        for note in recording.notes() {
            instance
                .notes
                .entry(ChunkKey::of_point(note.position))
                .or_default()
                .push(note.clone());
        }

        tracing::debug!(
            "Compiled lootrun '{}' ({:?}): {} chunks, {} raw points",
            instance.name,
            mode,
            instance.segments.len(),
            recording.path().len()
        );

        instance
    }

    fn bucket_segments(
        &self,
        colored: impl Iterator<Item = ColoredPoint>,
        instance: &mut CompiledInstance,
    ) {
        let jump_squared = self.settings.segment_break_distance * self.settings.segment_break_distance;

        let mut current: Vec<ColoredPoint> = Vec::new();
        let mut current_key = ChunkKey::default();
        let mut connected = false;
        let mut previous: Option<ColoredPoint> = None;

        for point in colored {
            let key = point.chunk();

            match previous {
                None => current_key = key,
                Some(last) => {
                    let teleport = last.position.distance_squared(point.position) >= jump_squared;
                    if teleport || key != current_key {
                        instance
                            .segments
                            .entry(current_key)
                            .or_default()
                            .push(ColoredSegment::new(std::mem::take(&mut current), connected));

                        connected = !teleport;
                        if connected {
                            current.push(last);
                        }
                        current_key = key;
                    }
                }
            }

            current.push(point);
            previous = Some(point);
        }

        if !current.is_empty() {
            instance
                .segments
                .entry(current_key)
                .or_default()
                .push(ColoredSegment::new(current, connected));
        }
    }
}

/// Display name for a recording: its file name without extension, or
/// [`UNSAVED_NAME`] if it has never been saved.
#[must_use]
pub fn display_name(source: Option<&str>) -> String {
    source
        .and_then(|file| Path::new(file).file_stem())
        .map_or_else(|| UNSAVED_NAME.to_string(), |stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lootrun_shared::{BlockPos, Note, Point3};

    fn recording(points: &[(f64, f64, f64)]) -> RawRecording {
        let mut recording = RawRecording::new();
        for &(x, y, z) in points {
            recording.push_point(Point3::new(x, y, z));
        }
        recording
    }

    #[test]
    fn test_empty_recording() {
        let instance = LootrunCompiler::default().compile(&RawRecording::new(), CompileMode::Active);
        assert!(instance.is_empty());
        assert_eq!(instance.name(), UNSAVED_NAME);
    }

    #[test]
    fn test_teleport_gives_two_unconnected_segments() {
        let rec = recording(&[(0.0, 0.0, 0.0), (0.0, 0.0, 40.0)]);
        let instance = LootrunCompiler::default().compile(&rec, CompileMode::Active);

        let first = instance.segments_in(ChunkKey::pack(0, 0));
        let second = instance.segments_in(ChunkKey::pack(0, 2));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].len(), 1);
        assert_eq!(second[0].len(), 1);
        assert!(!second[0].is_connected());
        assert_eq!(second[0].points()[0].position, Point3::new(0.0, 0.0, 40.0));
    }

    #[test]
    fn test_chunk_crossing_duplicates_connector() {
        let rec = recording(&[(10.0, 64.0, 0.5), (14.0, 64.0, 0.5), (18.0, 64.0, 0.5), (22.0, 64.0, 0.5)]);
        let instance = LootrunCompiler::default().compile(&rec, CompileMode::Active);

        let left = instance.segments_in(ChunkKey::pack(0, 0));
        let right = instance.segments_in(ChunkKey::pack(1, 0));
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);

        let last_left = left[0].points().last().map(|p| p.position);
        assert!(right[0].is_connected());
        assert_eq!(Some(right[0].points()[0].position), last_left);
        assert!(right[0].owned_points().iter().all(|p| p.chunk() == ChunkKey::pack(1, 0)));
    }

    #[test]
    fn test_jump_inside_chunk_splits_without_connector() {
        let settings = CompileSettings {
            break_distance: 3.0,
            segment_break_distance: 3.0,
            ..CompileSettings::default()
        };
        let rec = recording(&[(1.0, 0.0, 1.0), (1.0, 0.0, 5.0)]);
        let instance = LootrunCompiler::new(settings).compile(&rec, CompileMode::Active);

        let segments = instance.segments_in(ChunkKey::pack(0, 0));
        assert_eq!(instance.stats().chunks, 1);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|segment| !segment.is_connected() && segment.len() == 1));
    }

    #[test]
    fn test_preview_is_always_static() {
        let settings = CompileSettings {
            color_policy: ColorPolicy::Rainbow { cycle_distance: 1 },
            ..CompileSettings::default()
        };
        let rec = recording(&[(0.0, 64.0, 0.0), (0.0, 64.0, 4.0)]);
        let compiler = LootrunCompiler::new(settings);

        let preview = compiler.compile(&rec, CompileMode::RecordingPreview);
        assert!(preview
            .segments()
            .values()
            .flatten()
            .flat_map(ColoredSegment::points)
            .all(|p| p.color == settings.preview_color));

        let active = compiler.compile(&rec, CompileMode::Active);
        assert!(active
            .segments()
            .values()
            .flatten()
            .flat_map(ColoredSegment::points)
            .any(|p| p.color != settings.active_color));
    }

    #[test]
    fn test_chests_and_notes_bucketed() {
        let mut rec = RawRecording::new().with_source("forest_run.json");
        rec.add_chest(BlockPos::new(-1, 64, 0));
        rec.add_chest(BlockPos::new(17, 64, 0));
        rec.add_note(Note::new(Point3::new(33.0, 64.0, -1.0), "mob spawner"));

        let instance = LootrunCompiler::default().compile(&rec, CompileMode::Active);
        assert_eq!(instance.name(), "forest_run");
        assert_eq!(instance.chests_in(ChunkKey::pack(-1, 0)).count(), 1);
        assert_eq!(instance.chests_in(ChunkKey::pack(1, 0)).count(), 1);
        assert_eq!(instance.notes_in(ChunkKey::pack(2, -1)).len(), 1);
        assert!(instance.segments().is_empty());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(None), UNSAVED_NAME);
        assert_eq!(display_name(Some("cave.json")), "cave");
        assert_eq!(display_name(Some("no_extension")), "no_extension");
    }
}
