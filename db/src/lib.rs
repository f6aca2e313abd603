use std::{fs, path::Path};

use common::error::Res;

pub mod snapshot;

pub mod models {
    pub mod subscriber;
}

pub use snapshot::{JsonFileSnapshot, MemorySnapshot, SnapshotStore};

/// Opens the JSON snapshot at `path`, creating its directory if needed.
pub fn setup(path: &Path) -> Res<JsonFileSnapshot> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let snapshot = JsonFileSnapshot::new(path);
    log::debug!("Using snapshot at {}", snapshot.path().display());
    Ok(snapshot)
}
