//! Last cursor position per file.
//!
//! The store is read once when a document opens and written once when it
//! closes. Reading never fails: a missing file, malformed JSON or a bad entry
//! all mean "no saved position" and are logged. Only writing can fail.
//!
//! On disk it is one JSON object keyed by absolute path:
//!
//! ```json
//! { "/home/me/notes.txt": { "row": 12, "col": 4 } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::position::Position;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot write cursor store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize cursor store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A saved cursor position, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub row: usize,
    pub col: usize,
}

impl From<Position> for CursorState {
    fn from(pos: Position) -> Self {
        Self {
            row: pos.line,
            col: pos.col,
        }
    }
}

impl From<CursorState> for Position {
    fn from(state: CursorState) -> Self {
        Self::new(state.row, state.col)
    }
}

/// Where cursor positions are kept between sessions.
pub trait CursorStore {
    /// The saved position for `path`, if any.
    fn get(&self, path: &Path) -> Option<CursorState>;

    /// Save the position for `path`.
    ///
    /// # Errors
    ///
    /// When the store cannot be persisted.
    fn set(&mut self, path: &Path, state: CursorState) -> Result<(), StoreError>;
}

/// A [`CursorStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonCursorStore {
    file: PathBuf,
    entries: BTreeMap<String, CursorState>,
}

impl JsonCursorStore {
    /// Read the store at `file`. Anything unreadable is dropped.
    #[must_use]
    pub fn open(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let entries = read_entries(&file);
        Self { file, entries }
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.file.clone(),
            source,
        };
        if let Some(dir) = self.file.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.file, json).map_err(io_err)
    }
}

impl CursorStore for JsonCursorStore {
    fn get(&self, path: &Path) -> Option<CursorState> {
        self.entries.get(&key(path)).copied()
    }

    fn set(&mut self, path: &Path, state: CursorState) -> Result<(), StoreError> {
        self.entries.insert(key(path), state);
        self.save()?;
        tracing::debug!(path = %path.display(), row = state.row, col = state.col, "saved cursor");
        Ok(())
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn read_entries(file: &Path) -> BTreeMap<String, CursorState> {
    let json = match fs::read_to_string(file) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            tracing::warn!(path = %file.display(), %err, "cannot read cursor store");
            return BTreeMap::new();
        }
    };

    let map = match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!(path = %file.display(), "cursor store is not a JSON object");
            return BTreeMap::new();
        }
        Err(err) => {
            tracing::warn!(path = %file.display(), %err, "malformed cursor store");
            return BTreeMap::new();
        }
    };

    map.into_iter()
        .filter_map(|(path, value)| match serde_json::from_value(value) {
            Ok(state) => Some((path, state)),
            Err(err) => {
                tracing::debug!(%path, %err, "skipping malformed cursor entry");
                None
            }
        })
        .collect()
}
