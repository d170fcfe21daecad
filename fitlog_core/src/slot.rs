//! Durable slot: the single JSON file holding the record collection.
//!
//! Reads take a shared lock; writes go through a temp file with an
//! exclusive lock and an atomic rename so a crashed write never leaves a
//! half-written slot behind.

use crate::{Error, Exercise, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON-file-backed durable slot for the exercise collection
#[derive(Clone, Debug)]
pub struct JsonSlot {
    path: PathBuf,
}

impl JsonSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection from the slot with shared locking
    ///
    /// An absent, unreadable, or corrupt slot degrades to an empty
    /// collection with a warning. Load never aborts initialization.
    pub fn load(&self) -> Vec<Exercise> {
        if !self.path.exists() {
            tracing::info!("No data file found at {:?}, starting empty", self.path);
            return Vec::new();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open data file {:?}: {}. Starting empty.",
                    self.path,
                    e
                );
                return Vec::new();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock data file {:?}: {}. Starting empty.",
                self.path,
                e
            );
            return Vec::new();
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        let _ = file.unlock();

        if let Err(e) = read_result {
            tracing::warn!(
                "Failed to read data file {:?}: {}. Starting empty.",
                self.path,
                e
            );
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Exercise>>(&contents) {
            Ok(exercises) => {
                tracing::debug!("Loaded {} exercises from {:?}", exercises.len(), self.path);
                exercises
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse data file {:?}: {}. Starting empty.",
                    self.path,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Write the full collection to the slot atomically
    ///
    /// Writes to a locked temp file in the same directory, syncs, then
    /// renames over the slot. Any failure surfaces as
    /// [`Error::Persistence`] so callers can roll back their in-memory
    /// state instead of diverging from disk.
    pub fn save(&self, exercises: &[Exercise]) -> Result<()> {
        self.try_save(exercises)
            .map_err(|e| Error::Persistence(format!("write to {:?} failed: {}", self.path, e)))
    }

    fn try_save(&self, exercises: &[Exercise]) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            Error::Other(format!("data path {:?} has no parent directory", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        // Temp file in the same directory so the rename is atomic
        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(exercises)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} exercises to {:?}", exercises.len(), self.path);
        Ok(())
    }
}
