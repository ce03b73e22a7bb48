//! The file-backed variable store.
//!
//! The backing file is the sole source of truth: every successful persist
//! is immediately followed by a reload, so the in-memory mapping never
//! diverges from what is on disk. The store is never mutated in place;
//! [`VariableStore::set`] produces a snapshot, and the only way a snapshot
//! reaches memory is by being written out and read back.
//!
//! Writes are whole-file and NOT atomic. A crash mid-write can leave a
//! truncated file; the design assumes a single process and low-frequency,
//! human-triggered saves, so no rename dance or lock is performed.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use varstore_core::{varfile, Sections, Value, VarfileError, VariableMap, DEFAULT_SECTION};

/// Key under which the reserved `Variables` section appears in status
/// output.
const STATUS_DEFAULT_KEY: &str = "variables";

/// Errors for variable-store file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but could not be read.
    #[error("unable to read variables file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a parsable variables file.
    #[error("unable to parse variables file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: VarfileError,
    },

    /// The backing file could not be written. The file may be left in a
    /// partial state; the in-memory store keeps the last loaded snapshot.
    #[error("unable to save variables file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was written but could not be read back. Distinct from a
    /// startup [`StoreError::Corrupt`]: the just-written file itself is
    /// unreadable, which points at the writer or the medium.
    #[error("variables file {} failed to reload after save: {source}", .path.display())]
    ReloadAfterSave {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },
}

/// The persistent section→name→value store.
///
/// Created empty, populated once via [`VariableStore::load`], and from
/// then on only replaced wholesale by the save sequence.
pub struct VariableStore {
    path: PathBuf,
    sections: Sections,
}

impl VariableStore {
    /// Creates an empty store backed by `path`. No I/O happens until
    /// [`VariableStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sections: Sections::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory mapping.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Reads the backing file and replaces the entire in-memory mapping.
    ///
    /// A missing or empty file is an empty store, so first boot needs no
    /// setup step.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] for I/O failures other than "not found";
    /// [`StoreError::Corrupt`] when the file does not parse. On error the
    /// previous in-memory mapping is left untouched.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "variables file absent, starting empty");
                self.sections = Sections::new();
                return Ok(());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let sections = varfile::parse(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            sections = sections.len(),
            "variables file loaded"
        );
        self.sections = sections;
        Ok(())
    }

    /// Returns a snapshot equal to the current store with `value` inserted
    /// at (`section`, `name`). Touches neither the file nor the in-memory
    /// mapping.
    pub fn set(&self, section: &str, name: &str, value: Value) -> Sections {
        let mut snapshot = self.sections.clone();
        snapshot
            .entry(section.to_string())
            .or_default()
            .insert(name.to_string(), value);
        snapshot
    }

    /// Serializes `snapshot` to the backing file, then reloads so the
    /// in-memory mapping is rebuilt strictly from what is now on disk.
    ///
    /// A `Variables` section is always written, even when empty. Sections
    /// and names are written in lexicographic order, so equal stores
    /// produce byte-identical files.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persist`] if the write fails; the reload is skipped
    /// and the in-memory store keeps the last known-good snapshot.
    /// [`StoreError::ReloadAfterSave`] if the write succeeded but reading
    /// the file back failed.
    pub fn persist(&mut self, mut snapshot: Sections) -> Result<(), StoreError> {
        snapshot.entry(DEFAULT_SECTION.to_string()).or_default();
        let text = varfile::render(&snapshot);

        if let Err(source) = std::fs::write(&self.path, text) {
            warn!(path = %self.path.display(), error = %source, "variables file write failed");
            return Err(StoreError::Persist {
                path: self.path.clone(),
                source,
            });
        }

        self.load().map_err(|source| StoreError::ReloadAfterSave {
            path: self.path.clone(),
            source: Box::new(source),
        })?;
        info!(
            path = %self.path.display(),
            sections = self.sections.len(),
            "variables saved"
        );
        Ok(())
    }

    /// Read-only snapshot for external polling: every section as-is,
    /// except the reserved `Variables` section, which is exposed under the
    /// key `variables`. The `variables` key is always present.
    pub fn status(&self) -> Sections {
        let mut status = Sections::new();
        status.insert(STATUS_DEFAULT_KEY.to_string(), VariableMap::new());
        for (section, variables) in &self.sections {
            let key = if section == DEFAULT_SECTION {
                STATUS_DEFAULT_KEY.to_string()
            } else {
                section.clone()
            };
            status.insert(key, variables.clone());
        }
        status
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> VariableStore {
        VariableStore::new(dir.path().join("variables.cfg"))
    }

    #[test]
    fn test_load_missing_file_yields_empty_store() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        // Act
        store.load().expect("missing file is not an error");

        // Assert
        assert!(store.sections().is_empty());
    }

    #[test]
    fn test_load_empty_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        store.load().unwrap();

        assert!(store.sections().is_empty());
    }

    #[test]
    fn test_load_replaces_prior_in_memory_state() {
        // Arrange: load a file, then shrink it on disk and load again.
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        std::fs::write(store.path(), "[Variables]\nx = 1\ny = 2\n").unwrap();
        store.load().unwrap();
        std::fs::write(store.path(), "[Variables]\nx = 1\n").unwrap();

        // Act
        store.load().unwrap();

        // Assert: no partial merge; y is gone.
        assert!(!store.sections()["Variables"].contains_key("y"));
    }

    #[test]
    fn test_load_corrupt_file_is_an_error_and_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        std::fs::write(store.path(), "[Variables]\nx = 1\n").unwrap();
        store.load().unwrap();

        std::fs::write(store.path(), "[Variables]\nx = not_a_literal\n").unwrap();
        let result = store.load();

        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
        assert_eq!(store.sections()["Variables"]["x"], Value::Int(1));
    }

    #[test]
    fn test_set_does_not_touch_store_or_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.load().unwrap();

        let snapshot = store.set("Variables", "x", Value::Int(42));

        assert_eq!(snapshot["Variables"]["x"], Value::Int(42));
        assert!(store.sections().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_persist_writes_sorted_sections_with_default_always_present() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let mut snapshot = Sections::new();
        snapshot
            .entry("heat_bed".to_string())
            .or_default()
            .insert("speed".to_string(), Value::Int(100));

        // Act: snapshot has no Variables section; persist adds it.
        store.persist(snapshot).unwrap();

        // Assert
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "[Variables]\n\n[heat_bed]\nspeed = 100\n\n");
        assert_eq!(store.sections()["heat_bed"]["speed"], Value::Int(100));
    }

    #[test]
    fn test_persist_then_reload_is_idempotent() {
        // persist(load()) re-yields an equal store.
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        std::fs::write(
            store.path(),
            "[Variables]\noffsets = [0.1, 0.2]\nprofile = {'speed': 100}\n",
        )
        .unwrap();
        store.load().unwrap();
        let before = store.sections().clone();

        store.persist(before.clone()).unwrap();

        assert_eq!(store.sections(), &before);
    }

    #[test]
    fn test_persist_failure_keeps_last_known_good_state() {
        // Arrange: point the store at a path whose parent is a file, so
        // the write itself fails.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut store = VariableStore::new(blocker.join("variables.cfg"));
        let good = store.set("Variables", "x", Value::Int(1));

        // Act
        let result = store.persist(good);

        // Assert: Persist error, and memory still holds the pre-call state.
        assert!(matches!(result, Err(StoreError::Persist { .. })));
        assert!(store.sections().is_empty());
    }

    #[test]
    fn test_status_renames_reserved_section_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        std::fs::write(store.path(), "[Variables]\nx = 1\n\n[heat_bed]\nspeed = 0\n").unwrap();
        store.load().unwrap();

        let status = store.status();

        assert_eq!(status["variables"]["x"], Value::Int(1));
        assert_eq!(status["heat_bed"]["speed"], Value::Int(0));
        assert!(!status.contains_key("Variables"));
    }

    #[test]
    fn test_status_of_empty_store_still_exposes_variables_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let status = store.status();
        assert_eq!(status["variables"], VariableMap::new());
        assert_eq!(status.len(), 1);
    }
}
