//! # Recording Session
//!
//! The lootrun state machine. Owns the one editable [`RawRecording`] and
//! the compiled instances the renderer draws.
//!
//! ```text
//!             start_recording              stop_recording
//!  Disabled ─────────────────► Recording ─────────────────► Loaded
//!     ▲  │                         │                        │  ▲
//!     │  └──────────── load ───────┼────────────────────────┘  │
//!     │                            │                           │
//!     └──── clear_current_lootrun ─┴───────────────────────────┘
//! ```
//!
//! The recording moves between states; it is never cloned. While recording,
//! edits only set a dirty flag, and
//! [`RecordingSession::mark_dirty_and_preview_on_tick`] rebuilds the preview
//! at most once per tick. While loaded, edits recompile the active instance
//! immediately.

use lootrun_compiler::{CompileMode, CompiledInstance, LootrunCompiler};
use lootrun_shared::{BlockPos, Note, Point3, RawRecording};

use crate::error::{SessionError, SessionResult};

/// Squared distance under which the player counts as standing on a path point.
const UNDO_NEAR_SQUARED: f64 = 4.0;

/// Public view of the session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingState {
    /// Nothing recorded or loaded.
    Disabled,
    /// A recording is in progress.
    Recording,
    /// A finished or loaded lootrun is active.
    Loaded,
}

/// Outcome of [`RecordingSession::try_undo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoResult {
    /// The loop back to the player was cut off the path.
    Successful,
    /// The player never left the tail of the path.
    ErrorNotFarEnough,
    /// The player left the path but is not standing near an earlier point.
    ErrorStandNearPoint,
}

#[derive(Debug, Default)]
struct RecordingInfo {
    last_position: Option<Point3>,
    pending_chest: Option<BlockPos>,
    dirty: bool,
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Disabled,
    Recording {
        recording: RawRecording,
        info: RecordingInfo,
    },
    Loaded {
        recording: RawRecording,
    },
}

/// The lootrun state machine.
#[derive(Debug)]
pub struct RecordingSession {
    slot: Slot,
    compiler: LootrunCompiler,
    min_step_squared: f64,
    active: Option<CompiledInstance>,
    preview: Option<CompiledInstance>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new(LootrunCompiler::default(), 2.0)
    }
}

impl RecordingSession {
    /// Creates a disabled session.
    ///
    /// `min_step` is the distance the player must move before another path
    /// point is recorded.
    #[must_use]
    pub fn new(compiler: LootrunCompiler, min_step: f64) -> Self {
        Self {
            slot: Slot::Disabled,
            compiler,
            min_step_squared: min_step * min_step,
            active: None,
            preview: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RecordingState {
        match self.slot {
            Slot::Disabled => RecordingState::Disabled,
            Slot::Recording { .. } => RecordingState::Recording,
            Slot::Loaded { .. } => RecordingState::Loaded,
        }
    }

    /// The recording being edited, if any.
    #[must_use]
    pub fn recording(&self) -> Option<&RawRecording> {
        match &self.slot {
            Slot::Disabled => None,
            Slot::Recording { recording, .. } | Slot::Loaded { recording } => Some(recording),
        }
    }

    /// Compiled instance of the loaded lootrun.
    #[must_use]
    pub fn active_instance(&self) -> Option<&CompiledInstance> {
        self.active.as_ref()
    }

    /// Compiled preview of the recording in progress.
    #[must_use]
    pub fn preview_instance(&self) -> Option<&CompiledInstance> {
        self.preview.as_ref()
    }

    /// Compiler in use.
    #[must_use]
    pub fn compiler(&self) -> &LootrunCompiler {
        &self.compiler
    }

    /// Starts an empty recording, discarding any loaded lootrun.
    ///
    /// # Errors
    ///
    /// Returns `RecordingInProgress` if already recording.
    pub fn start_recording(&mut self) -> SessionResult<()> {
        if matches!(self.slot, Slot::Recording { .. }) {
            return Err(SessionError::RecordingInProgress);
        }

        self.slot = Slot::Recording {
            recording: RawRecording::new(),
            info: RecordingInfo::default(),
        };
        self.active = None;
        self.preview = None;
        tracing::info!("Lootrun recording started");
        Ok(())
    }

    /// Finishes the recording and makes it the active lootrun.
    ///
    /// # Errors
    ///
    /// Returns `NotRecording` if no recording is in progress.
    pub fn stop_recording(&mut self) -> SessionResult<()> {
        let recording = match std::mem::take(&mut self.slot) {
            Slot::Recording { recording, .. } => recording,
            other => {
                self.slot = other;
                return Err(SessionError::NotRecording);
            }
        };

        tracing::info!(
            "Lootrun recording stopped with {} points",
            recording.path().len()
        );
        self.preview = None;
        self.activate(recording);
        Ok(())
    }

    /// Makes `recording` the active lootrun, replacing any loaded one.
    ///
    /// # Errors
    ///
    /// Returns `RecordingInProgress` if a recording is in progress; the
    /// session is left unchanged.
    pub fn load(&mut self, recording: RawRecording) -> SessionResult<()> {
        if matches!(self.slot, Slot::Recording { .. }) {
            return Err(SessionError::RecordingInProgress);
        }

        tracing::info!(
            "Loaded lootrun {} with {} points",
            recording.source().unwrap_or("<unsaved>"),
            recording.path().len()
        );
        self.activate(recording);
        Ok(())
    }

    /// Drops the active recording or lootrun.
    pub fn clear_current_lootrun(&mut self) {
        if !matches!(self.slot, Slot::Disabled) {
            tracing::info!("Lootrun cleared");
        }
        self.slot = Slot::Disabled;
        self.active = None;
        self.preview = None;
    }

    fn activate(&mut self, recording: RawRecording) {
        self.active = Some(self.compiler.compile(&recording, CompileMode::Active));
        self.slot = Slot::Loaded { recording };
    }

    /// Records the player's position. Returns true if a point was appended.
    pub fn record_movement(&mut self, position: Point3) -> bool {
        let Slot::Recording { recording, info } = &mut self.slot else {
            return false;
        };

        let far_enough = info
            .last_position
            .map_or(true, |last| last.distance_squared(position) >= self.min_step_squared);
        if !far_enough {
            return false;
        }

        recording.push_point(position);
        info.last_position = Some(position);
        info.dirty = true;
        true
    }

    /// End-of-tick hook: rebuilds the preview if the recording changed.
    ///
    /// Returns true if a compile ran.
    pub fn mark_dirty_and_preview_on_tick(&mut self) -> bool {
        let Slot::Recording { recording, info } = &mut self.slot else {
            return false;
        };
        if !info.dirty {
            return false;
        }

        self.preview = Some(self.compiler.compile(recording, CompileMode::RecordingPreview));
        info.dirty = false;
        true
    }

    /// Remembers a right-clicked chest block as the next chest candidate.
    pub fn on_chest_block_right_clicked(&mut self, pos: BlockPos) {
        if let Slot::Recording { info, .. } = &mut self.slot {
            info.pending_chest = Some(pos);
        }
    }

    /// A container screen opened. Only loot containers confirm the candidate.
    ///
    /// Returns true if a chest was added.
    pub fn on_container_opened(&mut self, is_loot_container: bool) -> bool {
        if is_loot_container {
            return self.on_loot_container_opened();
        }
        if let Slot::Recording { info, .. } = &mut self.slot {
            info.pending_chest = None;
        }
        false
    }

    /// A loot container opened: the pending candidate becomes a chest.
    ///
    /// Returns true if a chest was added.
    pub fn on_loot_container_opened(&mut self) -> bool {
        let Slot::Recording { recording, info } = &mut self.slot else {
            return false;
        };
        let Some(pos) = info.pending_chest.take() else {
            return false;
        };

        info.dirty = true;
        let added = recording.add_chest(pos);
        if added {
            tracing::debug!("Recorded loot chest at {:?}", pos);
        }
        added
    }

    /// Adds a chest. Returns whether the chest set changed.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn add_chest(&mut self, pos: BlockPos) -> SessionResult<bool> {
        self.edit(|recording| recording.add_chest(pos))
    }

    /// Removes a chest. Returns whether the chest set changed.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn remove_chest(&mut self, pos: BlockPos) -> SessionResult<bool> {
        self.edit(|recording| recording.remove_chest(pos))
    }

    /// Adds a note at `position`.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn add_note(&mut self, text: impl Into<String>, position: Point3) -> SessionResult<()> {
        let note = Note::new(position, text);
        self.edit(|recording| recording.add_note(note))
    }

    /// Removes and returns the first note in block `pos`.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn delete_note_at(&mut self, pos: BlockPos) -> SessionResult<Option<Note>> {
        self.edit(|recording| recording.delete_note_at(pos))
    }

    /// Sets the file the active recording is saved to. The active instance
    /// is renamed accordingly.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn set_source(&mut self, source: Option<String>) -> SessionResult<()> {
        self.edit(|recording| recording.set_source(source))
    }

    fn edit<T>(&mut self, change: impl FnOnce(&mut RawRecording) -> T) -> SessionResult<T> {
        match &mut self.slot {
            Slot::Disabled => Err(SessionError::NoActiveLootrun),
            Slot::Recording { recording, info } => {
                let result = change(recording);
                info.dirty = true;
                Ok(result)
            }
            Slot::Loaded { recording } => {
                let result = change(recording);
                self.active = Some(self.compiler.compile(recording, CompileMode::Active));
                Ok(result)
            }
        }
    }

    /// Cuts the most recent loop off the path.
    ///
    /// Walks back from the newest point. Once the walk has passed a point at
    /// least 2 blocks from `player`, the next point within 2 blocks is kept
    /// and everything after it is removed. The first point is never a valid
    /// return point. On failure the path is untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotRecording` if no recording is in progress.
    pub fn try_undo(&mut self, player: Point3) -> SessionResult<UndoResult> {
        let Slot::Recording { recording, info } = &mut self.slot else {
            return Err(SessionError::NotRecording);
        };

        let path = recording.path();
        let mut left = false;
        let mut keep = None;

        for index in (0..path.len()).rev() {
            if index == 0 {
                break;
            }
            let near = path[index].distance_squared(player) < UNDO_NEAR_SQUARED;
            if near && left {
                keep = Some(index + 1);
                break;
            }
            if !near {
                left = true;
            }
        }

        let Some(len) = keep else {
            return Ok(if left {
                UndoResult::ErrorStandNearPoint
            } else {
                UndoResult::ErrorNotFarEnough
            });
        };

        let removed = path.len() - len;
        recording.truncate_path(len);
        info.last_position = recording.path().last().copied();
        info.dirty = true;
        tracing::info!("Undo removed {} lootrun points", removed);
        Ok(UndoResult::Successful)
    }

    /// Puts back an earlier copy of the loaded lootrun. Ignored unless a
    /// lootrun is loaded.
    pub(crate) fn restore_loaded(&mut self, recording: RawRecording) {
        if matches!(self.slot, Slot::Loaded { .. }) {
            self.activate(recording);
        }
    }

    /// Recompiles the active instance from the loaded lootrun.
    pub fn recompile_active(&mut self) {
        if let Slot::Loaded { recording } = &self.slot {
            self.active = Some(self.compiler.compile(recording, CompileMode::Active));
        }
    }

    /// Swaps the compiler and rebuilds whatever is currently shown.
    pub fn set_compiler(&mut self, compiler: LootrunCompiler, min_step: f64) {
        self.compiler = compiler;
        self.min_step_squared = min_step * min_step;

        match &self.slot {
            Slot::Disabled => {}
            Slot::Recording { recording, .. } => {
                self.preview = Some(self.compiler.compile(recording, CompileMode::RecordingPreview));
            }
            Slot::Loaded { recording } => {
                self.active = Some(self.compiler.compile(recording, CompileMode::Active));
            }
        }
    }
}
