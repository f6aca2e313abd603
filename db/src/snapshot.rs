use std::{
    fs, io,
    path::{Path, PathBuf},
};

use common::error::{AppError, Res};

use crate::models::subscriber::Subscriber;

/// Whole-collection persistence: read everything once, overwrite everything on save.
pub trait SnapshotStore {
    /// Returns the stored collection, or an empty one if nothing was saved yet.
    fn load(&self) -> Res<Vec<Subscriber>>;

    /// Replaces the stored collection with `records`.
    fn save(&mut self, records: &[Subscriber]) -> Res<()>;
}

fn parse(raw: &str) -> Res<Vec<Subscriber>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| AppError::MalformedSnapshot(e.to_string()))
}

/// Snapshot kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileSnapshot {
    fn load(&self) -> Res<Vec<Subscriber>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::from(e)),
        }
    }

    fn save(&mut self, records: &[Subscriber]) -> Res<()> {
        let json = serde_json::to_string_pretty(records)?;

        // write next to the target, then swap it in
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!(
            "Saved {} subscribers to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Snapshot held in memory as serialized JSON.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshot {
    raw: Option<String>,
    saves: usize,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from previously serialized content, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            saves: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Number of successful `save` calls.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemorySnapshot {
    fn load(&self) -> Res<Vec<Subscriber>> {
        match &self.raw {
            Some(raw) => parse(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, records: &[Subscriber]) -> Res<()> {
        self.raw = Some(serde_json::to_string(records)?);
        self.saves += 1;
        Ok(())
    }
}
