//! # Lootrun Service
//!
//! The owned entry point a host wires its callbacks into. Bundles the
//! configuration, the recording store, the session state machine and the
//! cache of saved lootruns.
//!
//! ```text
//! host tick ──► tick(pos) ──► record_movement
//!                          └─► mark_dirty_and_preview_on_tick
//! host click ─► on_block_right_clicked / on_container_opened
//! commands ───► load_file / save / add_note / try_undo / ...
//! renderer ───► active_instance / preview_instance
//! ```
//!
//! Edits to a loaded lootrun that came from a file are written back to that
//! file immediately.

use lootrun_compiler::{CompiledInstance, LootrunCompiler};
use lootrun_shared::{BlockPos, Note, Point3, RawRecording};

use crate::cache::{LootrunCache, RefreshReport};
use crate::config::LootrunConfig;
use crate::error::{SessionError, SessionResult, StoreResult};
use crate::session::{RecordingSession, RecordingState, UndoResult};
use crate::store::{JsonDirectoryStore, RecordingStore, SaveResult, WriteMode};

/// Lootrun recording, storage and compilation for one player.
#[derive(Debug)]
pub struct LootrunService<S: RecordingStore = JsonDirectoryStore> {
    config: LootrunConfig,
    store: S,
    session: RecordingSession,
    cache: LootrunCache,
}

impl LootrunService<JsonDirectoryStore> {
    /// Creates a service storing recordings in `config.directory`.
    #[must_use]
    pub fn from_config(config: LootrunConfig) -> Self {
        let store = JsonDirectoryStore::new(config.directory.clone());
        Self::new(config, store)
    }
}

impl<S: RecordingStore> LootrunService<S> {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(config: LootrunConfig, store: S) -> Self {
        let compiler = LootrunCompiler::new(config.compile_settings());
        let session = RecordingSession::new(compiler, config.recording.min_step);
        tracing::info!("Lootrun service started");
        Self {
            config,
            store,
            session,
            cache: LootrunCache::new(),
        }
    }

    /// Stops the service. A recording in progress is discarded.
    pub fn shutdown(mut self) {
        if self.session.state() == RecordingState::Recording {
            tracing::warn!("Discarding unsaved lootrun recording on shutdown");
        }
        self.session.clear_current_lootrun();
        tracing::info!("Lootrun service stopped");
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &LootrunConfig {
        &self.config
    }

    /// Recording store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Session state machine.
    #[must_use]
    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Cache of saved lootruns.
    #[must_use]
    pub fn cache(&self) -> &LootrunCache {
        &self.cache
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> RecordingState {
        self.session.state()
    }

    /// Compiled loaded lootrun.
    #[must_use]
    pub fn active_instance(&self) -> Option<&CompiledInstance> {
        self.session.active_instance()
    }

    /// Compiled preview of the recording in progress.
    #[must_use]
    pub fn preview_instance(&self) -> Option<&CompiledInstance> {
        self.session.preview_instance()
    }

    // =========================================================================
    // Host callbacks
    // =========================================================================

    /// Per-tick update with the player's position. Returns true if the
    /// preview was recompiled.
    pub fn tick(&mut self, position: Point3) -> bool {
        let _recorded = self.session.record_movement(position);
        self.session.mark_dirty_and_preview_on_tick()
    }

    /// The player right-clicked a block.
    pub fn on_block_right_clicked(&mut self, pos: BlockPos, is_chest: bool) {
        if is_chest {
            self.session.on_chest_block_right_clicked(pos);
        }
    }

    /// A container screen opened. Returns true if a chest was recorded.
    pub fn on_container_opened(&mut self, is_loot_container: bool) -> bool {
        self.session.on_container_opened(is_loot_container)
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    /// Starts a new recording.
    ///
    /// # Errors
    ///
    /// Returns `RecordingInProgress` if already recording.
    pub fn start_recording(&mut self) -> SessionResult<()> {
        self.session.start_recording()
    }

    /// Finishes the recording in progress.
    ///
    /// # Errors
    ///
    /// Returns `NotRecording` if no recording is in progress.
    pub fn stop_recording(&mut self) -> SessionResult<()> {
        self.session.stop_recording()
    }

    /// Drops the active recording or lootrun.
    pub fn clear_current_lootrun(&mut self) {
        self.session.clear_current_lootrun();
    }

    /// Loads a saved lootrun. Returns false, leaving the session unchanged,
    /// if the file is missing or malformed or a recording is in progress.
    pub fn load_file(&mut self, name: &str) -> bool {
        if self.session.state() == RecordingState::Recording {
            tracing::warn!("Cannot load lootrun {} while recording", name);
            return false;
        }

        let recording = match self.store.read(name) {
            Ok(recording) => recording,
            Err(err) => {
                tracing::warn!("Failed to load lootrun {}: {}", name, err);
                return false;
            }
        };

        self.session.load(recording).is_ok()
    }

    /// Loads an in-memory recording.
    ///
    /// # Errors
    ///
    /// Returns `RecordingInProgress` if a recording is in progress.
    pub fn load(&mut self, recording: RawRecording) -> SessionResult<()> {
        self.session.load(recording)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Saves the active recording under a new name and adopts that file as
    /// its source.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is recorded or loaded.
    pub fn save(&mut self, name: &str) -> SessionResult<SaveResult> {
        let recording = self.session.recording().ok_or(SessionError::NoActiveLootrun)?;

        let result = self.store.write(recording, name, WriteMode::CreateNew);
        if result == SaveResult::Saved {
            self.session.set_source(Some(self.store.file_name(name)))?;
        }
        Ok(result)
    }

    /// Recompiles the loaded lootrun and writes it back to its source file.
    /// Does nothing for recordings in progress or never-saved lootruns.
    ///
    /// # Errors
    ///
    /// Returns `PersistFailed` if the write fails.
    pub fn compile_and_persist(&mut self) -> SessionResult<()> {
        self.session.recompile_active();
        self.persist_loaded()
    }

    fn persist_loaded(&self) -> SessionResult<()> {
        let Some(recording) = self.persisted_recording() else {
            return Ok(());
        };
        let Some(source) = recording.source() else {
            return Ok(());
        };

        match self.store.write(recording, source, WriteMode::Overwrite) {
            SaveResult::Saved => Ok(()),
            SaveResult::ErrorSaving | SaveResult::ErrorAlreadyExists => {
                Err(SessionError::PersistFailed(source.to_string()))
            }
        }
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Adds a note at `position`.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is active, or `PersistFailed` if
    /// the loaded lootrun could not be written back. The note is not kept
    /// in that case.
    pub fn add_note(&mut self, text: impl Into<String>, position: Point3) -> SessionResult<()> {
        self.edit_and_persist(|session| session.add_note(text, position), |_| true)
    }

    /// Removes and returns the first note in block `pos`.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is active, or `PersistFailed` if
    /// the loaded lootrun could not be written back. The note is kept in
    /// that case.
    pub fn delete_note_at(&mut self, pos: BlockPos) -> SessionResult<Option<Note>> {
        self.edit_and_persist(|session| session.delete_note_at(pos), Option::is_some)
    }

    /// Adds a chest. Returns whether the chest set changed.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is active, or `PersistFailed` if
    /// the loaded lootrun could not be written back. The chest set is left
    /// unchanged in that case.
    pub fn add_chest(&mut self, pos: BlockPos) -> SessionResult<bool> {
        self.edit_and_persist(|session| session.add_chest(pos), |changed| *changed)
    }

    /// Removes a chest. Returns whether the chest set changed.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveLootrun` if nothing is active, or `PersistFailed` if
    /// the loaded lootrun could not be written back. The chest set is left
    /// unchanged in that case.
    pub fn remove_chest(&mut self, pos: BlockPos) -> SessionResult<bool> {
        self.edit_and_persist(|session| session.remove_chest(pos), |changed| *changed)
    }

    /// Applies `edit`, then writes a loaded lootrun back to its source file
    /// if `changed` says the edit did anything. A failed write restores the
    /// lootrun as it was before the edit.
    fn edit_and_persist<T>(
        &mut self,
        edit: impl FnOnce(&mut RecordingSession) -> SessionResult<T>,
        changed: impl FnOnce(&T) -> bool,
    ) -> SessionResult<T> {
        let backup = self.persisted_recording().cloned();
        let outcome = edit(&mut self.session)?;

        if changed(&outcome) {
            if let Err(err) = self.persist_loaded() {
                if let Some(previous) = backup {
                    self.session.restore_loaded(previous);
                }
                return Err(err);
            }
        }
        Ok(outcome)
    }

    /// The loaded recording, if edits to it are written back to a file.
    fn persisted_recording(&self) -> Option<&RawRecording> {
        if self.session.state() != RecordingState::Loaded {
            return None;
        }
        self.session
            .recording()
            .filter(|recording| recording.source().is_some())
    }

    /// Cuts the most recent loop off the recording in progress.
    ///
    /// # Errors
    ///
    /// Returns `NotRecording` if no recording is in progress.
    pub fn try_undo(&mut self, player: Point3) -> SessionResult<UndoResult> {
        self.session.try_undo(player)
    }

    // =========================================================================
    // Saved lootruns
    // =========================================================================

    /// Saved lootrun file names.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    pub fn list_files(&self) -> StoreResult<Vec<String>> {
        self.store.list()
    }

    /// Recompiles every saved lootrun into the cache.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be listed.
    pub fn refresh_cache(&mut self) -> StoreResult<RefreshReport> {
        self.cache.refresh(&self.store, self.session.compiler())
    }

    /// Deletes a saved lootrun and evicts it from the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be removed.
    pub fn delete_file(&mut self, name: &str) -> StoreResult<()> {
        self.store.delete(name)?;
        let _evicted = self.cache.remove(&self.store.file_name(name));
        Ok(())
    }

    /// Applies new tuning and recompiles what is shown. The store is kept.
    pub fn reconfigure(&mut self, config: LootrunConfig) {
        let compiler = LootrunCompiler::new(config.compile_settings());
        self.session.set_compiler(compiler, config.recording.min_step);
        if config.directory != self.config.directory {
            tracing::warn!(
                "Lootrun directory change to {} takes effect on restart",
                config.directory.display()
            );
        }
        self.config = config;
        tracing::info!("Lootrun configuration updated");
    }
}
