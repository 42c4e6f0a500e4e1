//! In-memory frame registry
//!
//! Frames are stored by id with a secondary name index. Both maps live behind
//! a single `RwLock`, so every name check and the mutation that depends on it
//! happen under the same write guard. Concurrent creates or renames racing for
//! one name therefore see exactly one winner, and a reader never observes a
//! frame under both its old and new name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::RwLock;

use super::csv_source::{CsvFile, LoadedRows};
use super::errors::FrameCatalogError;
use super::frame::{FrameData, FrameInfo, FrameRows};

pub const MAX_FRAME_NAME_LEN: usize = 128;

lazy_static! {
    static ref FRAME_NAME_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("frame name pattern is valid");
}

/// Check a user-supplied frame name
pub fn validate_frame_name(name: &str) -> Result<(), FrameCatalogError> {
    if name.is_empty() {
        return Err(FrameCatalogError::invalid_name(name, "name cannot be empty"));
    }
    if name.len() > MAX_FRAME_NAME_LEN {
        return Err(FrameCatalogError::invalid_name(
            name,
            format!("name is longer than {} characters", MAX_FRAME_NAME_LEN),
        ));
    }
    if !FRAME_NAME_PATTERN.is_match(name) {
        return Err(FrameCatalogError::invalid_name(
            name,
            "only letters, digits, '_' and '-' are allowed, and the name cannot start with '-'",
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Catalog {
    frames: HashMap<u64, FrameData>,
    names: HashMap<String, u64>,
}

impl Catalog {
    fn frame(&self, id: u64) -> Result<&FrameData, FrameCatalogError> {
        self.frames
            .get(&id)
            .ok_or_else(|| FrameCatalogError::frame_id_not_found(id))
    }

    fn id_for_name(&self, name: &str) -> Result<u64, FrameCatalogError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| FrameCatalogError::frame_name_not_found(name))
    }
}

/// Registry of all frames known to a server
#[derive(Debug)]
pub struct FrameRegistry {
    catalog: RwLock<Catalog>,
    next_id: AtomicU64,
    datasets_dir: Option<PathBuf>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FrameRegistry {
    /// Create an empty registry. Relative source paths resolve against `datasets_dir`.
    pub fn new(datasets_dir: Option<PathBuf>) -> Self {
        FrameRegistry {
            catalog: RwLock::new(Catalog::default()),
            next_id: AtomicU64::new(1),
            datasets_dir,
        }
    }

    pub fn datasets_dir(&self) -> Option<&Path> {
        self.datasets_dir.as_deref()
    }

    /// Load a delimited source and register it as a new frame
    pub async fn create_frame(
        &self,
        name: Option<String>,
        source: &CsvFile,
    ) -> Result<FrameInfo, FrameCatalogError> {
        if let Some(ref name) = name {
            validate_frame_name(name)?;
            // Fail fast before reading the file; re-checked under the write lock below
            if self.catalog.read().await.names.contains_key(name) {
                return Err(FrameCatalogError::DuplicateName { name: name.clone() });
            }
        }

        let loaded = self.load_source(source).await?;

        let mut catalog = self.catalog.write().await;
        if let Some(ref name) = name {
            if catalog.names.contains_key(name) {
                return Err(FrameCatalogError::DuplicateName { name: name.clone() });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = FrameData::new(
            id,
            name.clone(),
            source.schema.clone(),
            loaded.rows,
            loaded.rejected,
        );
        let info = frame.info();
        if let Some(name) = name {
            catalog.names.insert(name, id);
        }
        catalog.frames.insert(id, frame);

        log::info!(
            "Created frame {} ({}) with {} rows from {}",
            id,
            info.name.as_deref().unwrap_or("<unnamed>"),
            info.row_count,
            source.path
        );
        Ok(info)
    }

    async fn load_source(&self, source: &CsvFile) -> Result<LoadedRows, FrameCatalogError> {
        let source = source.clone();
        let datasets_dir = self.datasets_dir.clone();
        let path = source.path.clone();
        tokio::task::spawn_blocking(move || source.load(datasets_dir.as_deref()))
            .await
            .map_err(|e| FrameCatalogError::SourceRead {
                path,
                error: e.to_string(),
            })?
    }

    /// Give a frame a new name; the old name is released in the same step
    pub async fn rename_frame(
        &self,
        id: u64,
        new_name: &str,
    ) -> Result<FrameInfo, FrameCatalogError> {
        validate_frame_name(new_name)?;

        let mut catalog = self.catalog.write().await;
        let current = catalog.frame(id)?.name.clone();
        if current.as_deref() == Some(new_name) {
            return Ok(catalog.frame(id)?.info());
        }
        if catalog.names.contains_key(new_name) {
            return Err(FrameCatalogError::DuplicateName {
                name: new_name.to_string(),
            });
        }

        if let Some(ref old_name) = current {
            catalog.names.remove(old_name);
        }
        catalog.names.insert(new_name.to_string(), id);

        let frame = catalog
            .frames
            .get_mut(&id)
            .ok_or_else(|| FrameCatalogError::frame_id_not_found(id))?;
        frame.name = Some(new_name.to_string());
        frame.modified_at = Utc::now();

        log::info!(
            "Renamed frame {} from {} to {}",
            id,
            current.as_deref().unwrap_or("<unnamed>"),
            new_name
        );
        Ok(frame.info())
    }

    /// Names of all named frames, sorted
    pub async fn frame_names(&self) -> Vec<String> {
        let catalog = self.catalog.read().await;
        let mut names: Vec<String> = catalog.names.keys().cloned().collect();
        names.sort();
        names
    }

    /// Summaries of all frames, ordered by id
    pub async fn list_frames(&self) -> Vec<FrameInfo> {
        let catalog = self.catalog.read().await;
        let mut frames: Vec<FrameInfo> = catalog.frames.values().map(FrameData::info).collect();
        frames.sort_by_key(|f| f.id);
        frames
    }

    pub async fn get_frame(&self, id: u64) -> Result<FrameInfo, FrameCatalogError> {
        Ok(self.catalog.read().await.frame(id)?.info())
    }

    pub async fn get_frame_by_name(&self, name: &str) -> Result<FrameInfo, FrameCatalogError> {
        let catalog = self.catalog.read().await;
        let id = catalog.id_for_name(name)?;
        Ok(catalog.frame(id)?.info())
    }

    pub async fn drop_frame(&self, id: u64) -> Result<FrameInfo, FrameCatalogError> {
        let mut catalog = self.catalog.write().await;
        let frame = catalog
            .frames
            .remove(&id)
            .ok_or_else(|| FrameCatalogError::frame_id_not_found(id))?;
        if let Some(ref name) = frame.name {
            catalog.names.remove(name);
        }

        log::info!(
            "Dropped frame {} ({})",
            id,
            frame.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(frame.info())
    }

    pub async fn drop_frame_by_name(&self, name: &str) -> Result<FrameInfo, FrameCatalogError> {
        let id = self.catalog.read().await.id_for_name(name)?;
        self.drop_frame(id).await
    }

    pub async fn take_rows(
        &self,
        id: u64,
        offset: usize,
        count: usize,
    ) -> Result<FrameRows, FrameCatalogError> {
        let catalog = self.catalog.read().await;
        Ok(FrameRows::slice(catalog.frame(id)?, offset, count))
    }
}
