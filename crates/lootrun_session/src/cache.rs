//! # Lootrun Cache
//!
//! Compiled instances of every saved lootrun, keyed by display name. Used
//! by lootrun pickers that preview saved runs without loading them.
//!
//! A refresh never fails as a whole: a file that cannot be read is logged,
//! reported, and skipped.

use std::collections::BTreeMap;

use lootrun_compiler::{display_name, CompileMode, CompiledInstance, LootrunCompiler};

use crate::error::StoreResult;
use crate::store::RecordingStore;

/// Outcome of a [`LootrunCache::refresh`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Number of lootruns compiled and cached.
    pub loaded: usize,
    /// Files that failed to read.
    pub failed: Vec<String>,
}

/// Compiled saved lootruns.
#[derive(Debug, Default)]
pub struct LootrunCache {
    instances: BTreeMap<String, CompiledInstance>,
}

impl LootrunCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the cache from every file in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be listed. The previous
    /// contents are kept in that case.
    pub fn refresh(
        &mut self,
        store: &impl RecordingStore,
        compiler: &LootrunCompiler,
    ) -> StoreResult<RefreshReport> {
        let files = store.list()?;
        let mut report = RefreshReport::default();
        let mut instances = BTreeMap::new();

        for file in files {
            match store.read(&file) {
                Ok(recording) => {
                    let instance = compiler.compile(&recording, CompileMode::Active);
                    instances.insert(instance.name().to_string(), instance);
                    report.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!("Skipping lootrun {}: {}", file, err);
                    report.failed.push(file);
                }
            }
        }

        self.instances = instances;
        tracing::info!(
            "Lootrun cache refreshed: {} loaded, {} failed",
            report.loaded,
            report.failed.len()
        );
        Ok(report)
    }

    /// Cached instance by display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompiledInstance> {
        self.instances.get(name)
    }

    /// Cached names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    /// All cached instances.
    pub fn instances(&self) -> impl Iterator<Item = &CompiledInstance> {
        self.instances.values()
    }

    /// Evicts the instance compiled from file `name`.
    pub fn remove(&mut self, name: &str) -> Option<CompiledInstance> {
        self.instances.remove(&display_name(Some(name)))
    }

    /// Number of cached instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonDirectoryStore, SaveResult, WriteMode};
    use lootrun_shared::{Point3, RawRecording};

    fn walk(length: u32) -> RawRecording {
        let mut recording = RawRecording::new();
        for step in 0..length {
            recording.push_point(Point3::new(f64::from(step) * 3.0, 64.0, 0.5));
        }
        recording
    }

    #[test]
    fn test_refresh_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        for (name, length) in [("alpha", 3), ("beta", 5), ("gamma", 8)] {
            assert_eq!(store.write(&walk(length), name, WriteMode::CreateNew), SaveResult::Saved);
        }
        std::fs::write(dir.path().join("corrupt.json"), "[1, 2,").unwrap();

        let mut cache = LootrunCache::new();
        let report = cache.refresh(&store, &LootrunCompiler::default()).unwrap();

        assert_eq!(report.loaded, 3);
        assert_eq!(report.failed, vec!["corrupt.json".to_string()]);
        assert_eq!(cache.names().collect::<Vec<_>>(), vec!["alpha", "beta", "gamma"]);
        assert!(cache.get("corrupt").is_none());
    }

    #[test]
    fn test_remove_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        assert_eq!(store.write(&walk(4), "alpha", WriteMode::CreateNew), SaveResult::Saved);

        let mut cache = LootrunCache::new();
        let _report = cache.refresh(&store, &LootrunCompiler::default()).unwrap();
        assert_eq!(cache.len(), 1);

        assert!(cache.remove("alpha.json").is_some());
        assert!(cache.is_empty());
    }
}
