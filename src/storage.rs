//! JSON file codec for the memory document.
//!
//! Loading never fails: a missing file yields a fresh document and an unreadable
//! or corrupt one is set aside and replaced by defaults. Saving writes a sibling
//! temp file and renames it over the target, so a crash mid-write leaves either
//! the old or the new document on disk.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::document::{LegacyDocument, PersistedDocument};
use crate::error::{Result, WeatherError};

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the backing file, falling back to a default document
    pub fn load(&self) -> PersistedDocument {
        match self.read_document() {
            Ok(Some(doc)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    favorites = doc.favorites.len(),
                    history = doc.history.len(),
                    "Loaded memory file"
                );
                doc
            }
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "No memory file yet, starting fresh");
                PersistedDocument::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Resetting memory to defaults: {}", e);
                self.quarantine();
                PersistedDocument::default()
            }
        }
    }

    /// Writes the whole document via temp file + rename
    pub fn save(&self, doc: &PersistedDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(doc).map_err(std::io::Error::other)?;
        let tmp_path = self.sibling("tmp");

        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, &self.path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn read_document(&self) -> Result<Option<PersistedDocument>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let corrupt = |e: serde_json::Error| WeatherError::CorruptState(e.to_string());

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(corrupt)?;
        let doc = if LegacyDocument::matches(&value) {
            tracing::info!(
                path = %self.path.display(),
                "Converting memory file from the legacy layout"
            );
            serde_json::from_value::<LegacyDocument>(value).map(PersistedDocument::from)
        } else {
            serde_json::from_value::<PersistedDocument>(value)
        };
        doc.map(Some).map_err(corrupt)
    }

    /// Keeps an unreadable or corrupt file around as `<file>.corrupt` so the next
    /// save does not destroy it
    fn quarantine(&self) {
        let backup = self.sibling("corrupt");
        match fs::rename(&self.path, &backup) {
            Ok(()) => tracing::warn!(backup = %backup.display(), "Moved memory file aside"),
            Err(e) => tracing::warn!("Could not move memory file aside: {}", e),
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}
