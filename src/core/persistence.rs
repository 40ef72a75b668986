use crate::models::WidgetPosition;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const PLACEMENT_FILE_NAME: &str = "placement.json";

const CURRENT_STATE_VERSION: u32 = 1;

fn default_state_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPlacement {
    #[serde(default = "default_state_version")]
    version: u32,
    #[serde(default)]
    window_bounds: WidgetPosition,
}

/// Last known widget position, mirrored to a JSON file.
///
/// Reads are served from memory; every `set` rewrites the file before
/// returning so a restart observes the last completed write.
#[derive(Debug)]
pub struct PlacementStore {
    path: PathBuf,
    current: WidgetPosition,
}

impl PlacementStore {
    /// Loads the store at `path`. A missing file yields the empty default.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let current = load(&path)?.unwrap_or_default();
        Ok(Self { path, current })
    }

    /// An empty store at `path`; the next `set` replaces whatever is on disk.
    pub fn fresh(path: PathBuf) -> Self {
        Self {
            path,
            current: WidgetPosition::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> WidgetPosition {
        self.current
    }

    /// Updates the in-memory value and writes it durably.
    ///
    /// The in-memory value is updated even when the write fails.
    pub fn set(&mut self, position: WidgetPosition) -> io::Result<()> {
        self.current = position;
        let state = PersistedPlacement {
            version: CURRENT_STATE_VERSION,
            window_bounds: position,
        };
        write_state_atomically(&self.path, &state)
    }
}

fn load(path: &Path) -> io::Result<Option<WidgetPosition>> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    let state: PersistedPlacement = serde_json::from_slice(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(Some(state.window_bounds))
}

fn write_state_atomically(path: &Path, state: &PersistedPlacement) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)?;
    serde_json::to_writer(&mut file, state).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    fs::rename(tmp, path)?;
    Ok(())
}
