//! # Recording Store
//!
//! Reads and writes [`RawRecording`]s by name. The session and cache only
//! see the [`RecordingStore`] trait; [`JsonDirectoryStore`] is the on-disk
//! implementation, one pretty-printed JSON file per recording.
//!
//! Names may be given with or without the `.json` extension. A name must be
//! a single file name: separators, `.`, `..` and absolute paths are refused.
//!
//! Overwrites go through a sibling temp file that is renamed over the
//! original, so a failed write leaves the previous file intact.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use lootrun_shared::RawRecording;

use crate::error::{StoreError, StoreResult};

const EXTENSION: &str = "json";

/// Outcome of a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveResult {
    /// The file was written.
    Saved,
    /// The write failed; details are logged.
    ErrorSaving,
    /// `CreateNew` was requested and the file already exists.
    ErrorAlreadyExists,
}

/// How [`RecordingStore::write`] treats an existing file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Refuse to replace an existing file.
    CreateNew,
    /// Replace an existing file.
    Overwrite,
}

/// Named storage for raw recordings.
pub trait RecordingStore {
    /// Reads the recording stored under `name`.
    ///
    /// The returned recording's source is set to the stored file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    fn read(&self, name: &str) -> StoreResult<RawRecording>;

    /// Stored file name for a recording name.
    fn file_name(&self, name: &str) -> String;

    /// Writes `recording` under `name`.
    fn write(&self, recording: &RawRecording, name: &str, mode: WriteMode) -> SaveResult;

    /// Stored file names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be listed.
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Deletes the recording stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be removed.
    fn delete(&self, name: &str) -> StoreResult<()>;
}

/// A directory of `<name>.json` recording files.
#[derive(Clone, Debug)]
pub struct JsonDirectoryStore {
    dir: PathBuf,
}

impl JsonDirectoryStore {
    /// Creates a store over `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a recording name, with the extension added if missing.
    #[must_use]
    pub fn with_extension(name: &str) -> String {
        let has_extension = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
        if has_extension {
            name.to_string()
        } else {
            format!("{name}.{EXTENSION}")
        }
    }

    /// Stored file name for `name`, refusing anything that is not a single
    /// plain path component.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidName` for empty names, names with path
    /// separators, `.`/`..`, or absolute paths.
    pub fn checked_file_name(name: &str) -> StoreResult<String> {
        let mut components = Path::new(name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || name.contains(['/', '\\']) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(Self::with_extension(name))
    }

    fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn temp_path_of(&self, file: &str) -> PathBuf {
        self.dir.join(format!(".{file}.tmp"))
    }

    fn try_write(&self, recording: &RawRecording, file: &str, mode: WriteMode) -> StoreResult<()> {
        let io_error = |source| StoreError::Io {
            file: file.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;

        match mode {
            WriteMode::CreateNew => {
                let handle = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(self.path_of(file))
                    .map_err(io_error)?;
                Self::write_json(handle, recording, file)
            }
            WriteMode::Overwrite => {
                let temp = self.temp_path_of(file);
                let written = File::create(&temp)
                    .map_err(io_error)
                    .and_then(|handle| Self::write_json(handle, recording, file))
                    .and_then(|()| fs::rename(&temp, self.path_of(file)).map_err(io_error));
                if written.is_err() {
                    let _ = fs::remove_file(&temp);
                }
                written
            }
        }
    }

    fn write_json(handle: File, recording: &RawRecording, file: &str) -> StoreResult<()> {
        let mut writer = BufWriter::new(handle);
        serde_json::to_writer_pretty(&mut writer, recording).map_err(|source| {
            StoreError::Parse {
                file: file.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(|source| StoreError::Io {
            file: file.to_string(),
            source,
        })?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| StoreError::Io {
                file: file.to_string(),
                source,
            })
    }
}

impl RecordingStore for JsonDirectoryStore {
    fn file_name(&self, name: &str) -> String {
        Self::with_extension(name)
    }

    fn read(&self, name: &str) -> StoreResult<RawRecording> {
        let file = Self::checked_file_name(name)?;
        let path = self.path_of(&file);
        if !path.is_file() {
            return Err(StoreError::NotFound(file));
        }

        let handle = File::open(&path).map_err(|source| StoreError::Io {
            file: file.clone(),
            source,
        })?;
        let mut recording: RawRecording = serde_json::from_reader(BufReader::new(handle))
            .map_err(|source| StoreError::Parse {
                file: file.clone(),
                source,
            })?;

        recording.set_source(Some(file));
        Ok(recording)
    }

    fn write(&self, recording: &RawRecording, name: &str, mode: WriteMode) -> SaveResult {
        let file = match Self::checked_file_name(name) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!("Refusing to save lootrun: {}", err);
                return SaveResult::ErrorSaving;
            }
        };

        if mode == WriteMode::CreateNew && self.path_of(&file).exists() {
            return SaveResult::ErrorAlreadyExists;
        }

        match self.try_write(recording, &file, mode) {
            Ok(()) => {
                tracing::info!("Saved lootrun to {}", file);
                SaveResult::Saved
            }
            Err(StoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::AlreadyExists =>
            {
                SaveResult::ErrorAlreadyExists
            }
            Err(err) => {
                tracing::warn!("Failed to save lootrun: {}", err);
                SaveResult::ErrorSaving
            }
        }
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            file: self.dir.display().to_string(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
            })
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        let file = Self::checked_file_name(name)?;
        let path = self.path_of(&file);
        if !path.is_file() {
            return Err(StoreError::NotFound(file));
        }

        fs::remove_file(&path).map_err(|source| StoreError::Io {
            file: file.clone(),
            source,
        })?;
        tracing::info!("Deleted lootrun file {}", file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lootrun_shared::{BlockPos, Note, Point3};

    fn sample_recording() -> RawRecording {
        let mut recording = RawRecording::new();
        recording.push_point(Point3::new(0.5, 64.0, 0.5));
        recording.push_point(Point3::new(3.25, 64.5, -1.75));
        recording.add_chest(BlockPos::new(10, 65, -4));
        recording.add_note(Note::new(Point3::new(2.0, 64.0, 0.0), "watch the lava"));
        recording
    }

    #[test]
    fn test_file_name_adds_extension_once() {
        assert_eq!(JsonDirectoryStore::with_extension("cave"), "cave.json");
        assert_eq!(JsonDirectoryStore::with_extension("cave.json"), "cave.json");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        let recording = sample_recording();

        assert_eq!(store.write(&recording, "cave", WriteMode::CreateNew), SaveResult::Saved);

        let read = store.read("cave").unwrap();
        assert_eq!(read.path(), recording.path());
        assert_eq!(read.chests(), recording.chests());
        assert_eq!(read.notes(), recording.notes());
        assert_eq!(read.source(), Some("cave.json"));
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        let recording = sample_recording();

        assert_eq!(store.write(&recording, "cave", WriteMode::CreateNew), SaveResult::Saved);
        assert_eq!(
            store.write(&RawRecording::new(), "cave", WriteMode::CreateNew),
            SaveResult::ErrorAlreadyExists
        );
        assert_eq!(store.read("cave").unwrap().path().len(), 2);

        assert_eq!(
            store.write(&RawRecording::new(), "cave", WriteMode::Overwrite),
            SaveResult::Saved
        );
        assert!(store.read("cave").unwrap().path().is_empty());
    }

    #[test]
    fn test_missing_sections_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bare.json"),
            r#"{"points":[{"x":1.0,"y":2.0,"z":3.0}]}"#,
        )
        .unwrap();

        let recording = JsonDirectoryStore::new(dir.path()).read("bare").unwrap();
        assert_eq!(recording.path(), &[Point3::new(1.0, 2.0, 3.0)]);
        assert!(recording.chests().is_empty());
        assert!(recording.notes().is_empty());
    }

    #[test]
    fn test_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = JsonDirectoryStore::new(dir.path());

        assert!(matches!(store.read("missing"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.read("broken"), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path().join("runs"));
        assert!(store.list().unwrap().is_empty());

        let recording = sample_recording();
        assert_eq!(store.write(&recording, "b_run", WriteMode::CreateNew), SaveResult::Saved);
        assert_eq!(store.write(&recording, "a_run", WriteMode::CreateNew), SaveResult::Saved);
        fs::write(dir.path().join("runs").join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["a_run.json", "b_run.json"]);

        store.delete("a_run").unwrap();
        assert_eq!(store.list().unwrap(), vec!["b_run.json"]);
        assert!(matches!(store.delete("a_run"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_names_cannot_leave_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(root.path().join("runs"));
        let recording = sample_recording();
        fs::write(root.path().join("outside.json"), "{\"points\":[]}").unwrap();

        for name in ["../escaped", "nested/run", "..", ".", "", "/tmp/absolute"] {
            assert_eq!(
                store.write(&recording, name, WriteMode::CreateNew),
                SaveResult::ErrorSaving,
                "write accepted {name:?}"
            );
        }
        assert!(!root.path().join("escaped.json").exists());

        assert!(matches!(store.read("../outside"), Err(StoreError::InvalidName(_))));
        assert!(matches!(store.delete("../outside"), Err(StoreError::InvalidName(_))));
        assert!(root.path().join("outside.json").is_file());
    }

    #[test]
    fn test_overwrite_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        assert_eq!(store.write(&sample_recording(), "cave", WriteMode::CreateNew), SaveResult::Saved);

        let mut updated = sample_recording();
        updated.push_point(Point3::new(9.0, 64.0, 9.0));
        assert_eq!(store.write(&updated, "cave", WriteMode::Overwrite), SaveResult::Saved);

        assert_eq!(store.read("cave").unwrap().path().len(), 3);
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_overwrite_keeps_previous_target() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());

        // A directory squatting on the target name makes the final rename fail
        fs::create_dir(dir.path().join("cave.json")).unwrap();
        assert_eq!(
            store.write(&sample_recording(), "cave", WriteMode::Overwrite),
            SaveResult::ErrorSaving
        );
        assert!(dir.path().join("cave.json").is_dir());
        assert!(!dir.path().join(".cave.json.tmp").exists());
    }
}
