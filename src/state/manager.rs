//! Loading and persisting sync state
//!
//! [`StateManager`] owns the [`State`] for a sync run. It can be
//! backed by a file, in which case every stream update is written
//! back atomically, or run purely in memory for stateless syncs and
//! state supplied inline on the command line.

use super::types::State;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the state of the current sync
///
/// Clones share the same underlying state. An empty path means the
/// manager is in-memory and [`save`](Self::save) does nothing.
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
    state: Arc<RwLock<State>>,
    auto_save: bool,
}

impl StateManager {
    /// File-backed manager starting from empty state
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(State::new())),
            auto_save: true,
        }
    }

    /// Manager with no backing file
    pub fn in_memory() -> Self {
        Self::from_state(State::new())
    }

    /// File-backed manager, loading saved state when the file exists
    ///
    /// A missing file is not an error: the sync simply starts from
    /// empty state and creates the file on the first save.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| Error::State {
                message: format!("state file {} is not valid JSON: {e}", path.display()),
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => State::new(),
            Err(e) => {
                return Err(Error::State {
                    message: format!("cannot read state file {}: {e}", path.display()),
                })
            }
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// In-memory manager seeded from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("inline state is not valid JSON: {e}"),
        })?;
        Ok(Self::from_state(state))
    }

    /// In-memory manager seeded from existing state
    pub fn from_state(state: State) -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(state)),
            auto_save: false,
        }
    }

    /// Write the current state to the backing file, if there is one
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        self.save_to_file(&self.path).await
    }

    /// Write the current state to an arbitrary path
    ///
    /// The write goes to a sibling `.tmp` file first and is moved
    /// into place afterwards, so a crash mid-write cannot leave a
    /// truncated state file behind.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_json_pretty().await?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("cannot write state file {}: {e}", temp_path.display()),
            })?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::State {
                message: format!("cannot move state file into {}: {e}", path.display()),
            })?;

        Ok(())
    }

    /// Read lock on the current state
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Owned copy of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Current state rendered as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state).map_err(|e| Error::State {
            message: format!("cannot serialize state: {e}"),
        })
    }

    /// Saved cursor object for one stream
    pub async fn get_stream(&self, stream: &str) -> Option<JsonObject> {
        self.state.read().await.get_stream(stream).cloned()
    }

    /// Replace the cursor object for one stream
    ///
    /// File-backed managers persist immediately so an interrupted
    /// sync keeps every checkpoint emitted so far.
    pub async fn set_stream(&self, stream: &str, stream_state: JsonObject) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.set_stream(stream, stream_state);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Backing file path, empty for in-memory managers
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this manager has no backing file
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}
