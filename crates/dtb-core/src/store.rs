//! Flat JSON document holding every guild's to-do list.
//!
//! Shape: `{ "<guild id>": { "tasks": [..], "assigned_user": "<name>" | null } }`.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{errors::Error, Result};

/// One guild's shared list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildTodo {
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub assigned_user: Option<String>,
}

/// Guild id -> list. Ordered so the serialized document is deterministic.
pub type TodoDocument = BTreeMap<String, GuildTodo>;

#[derive(Clone, Debug)]
pub struct TodoStore {
    path: PathBuf,
}

impl TodoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing or empty file is a first run, not an error.
    pub fn load(&self) -> Result<TodoDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TodoDocument::new()),
            Err(e) => return Err(Error::Io(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(TodoDocument::new());
        }

        // Invalid UTF-8 surfaces here as a JSON error, same as any other garbage.
        serde_json::from_slice(&bytes).map_err(|e| Error::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Overwrite the whole document atomically.
    pub async fn save(&self, doc: &TodoDocument) -> Result<()> {
        let bytes = encode(doc)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| Error::External(format!("store writer task failed: {e}")))?
    }
}

fn encode(doc: &TodoDocument) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(doc)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Temp file in the target directory, fsync, rename over the target.
///
/// Readers see either the old or the new document, never a partial one. The
/// temp file is removed when it is dropped on any error path.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let storage_err = |source: io::Error| Error::Storage {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(storage_err)?;
    tmp.write_all(bytes).map_err(storage_err)?;
    tmp.as_file().sync_all().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}
