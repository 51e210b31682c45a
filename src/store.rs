//! Persisted overlay store
//!
//! Overlays live as PNG blobs in a per-user data directory, ordered by a
//! versioned JSON index that is rewritten on every append and remove.
//! The selection is transient: it only exists in memory and always points
//! at a live entry (or nothing).

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// File name of the ordered overlay index inside the store directory.
pub const INDEX_FILE: &str = "filter_images_v1.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: Uuid,
    file: String,
}

/// One stored overlay: a stable id plus its encoded PNG data.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    id: Uuid,
    file: String,
    png: Vec<u8>,
}

impl OverlayImage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }
}

/// Ordered collection of user-made overlays with an optional selection.
pub struct OverlayStore {
    /// None for an ephemeral (test/fallback) store that never touches disk
    root: Option<PathBuf>,
    entries: Vec<OverlayImage>,
    selection: Option<usize>,
}

impl OverlayStore {
    /// Load the store from `root`, creating the directory on first run.
    /// Index entries whose blob file has gone missing are dropped.
    pub fn load(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root)?;

        let index_path = root.join(INDEX_FILE);
        let index: Vec<IndexEntry> = if index_path.exists() {
            serde_json::from_str(&fs::read_to_string(&index_path)?)?
        } else {
            Vec::new()
        };

        let mut entries = Vec::with_capacity(index.len());
        for entry in index {
            let blob_path = root.join(&entry.file);
            match fs::read(&blob_path) {
                Ok(png) => entries.push(OverlayImage {
                    id: entry.id,
                    file: entry.file,
                    png,
                }),
                Err(err) => {
                    warn!("dropping overlay {} ({}): {err}", entry.id, entry.file);
                }
            }
        }

        info!("loaded {} overlays from {}", entries.len(), root.display());
        Ok(Self {
            root: Some(root),
            entries,
            selection: None,
        })
    }

    /// A store that lives only in memory. Used by tests and as a fallback
    /// when no data directory is available.
    pub fn ephemeral() -> Self {
        Self {
            root: None,
            entries: Vec::new(),
            selection: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OverlayImage] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&OverlayImage> {
        self.entries.get(index)
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// The selected overlay, if the selection is not the "none" sentinel.
    pub fn selected(&self) -> Option<&OverlayImage> {
        self.selection.and_then(|i| self.entries.get(i))
    }

    /// Append a new overlay. Byte-identical duplicates are refused and
    /// leave the store untouched.
    pub fn append(&mut self, png: Vec<u8>) -> Result<Uuid, StoreError> {
        if self.entries.iter().any(|e| e.png == png) {
            return Err(StoreError::AlreadyExists);
        }

        let id = Uuid::new_v4();
        let file = format!("{id}.png");

        if let Some(root) = &self.root {
            fs::write(root.join(&file), &png)?;
        }

        self.entries.push(OverlayImage { id, file, png });
        self.save_index()?;
        info!("stored overlay {id} ({} total)", self.entries.len());
        Ok(id)
    }

    /// Remove an overlay by id. A selection at the removed entry clears;
    /// a selection past it shifts down so it keeps pointing at the same
    /// overlay.
    pub fn remove(&mut self, id: Uuid) -> Result<(), StoreError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::UnknownId(id))?;

        let removed = self.entries.remove(index);
        self.selection = match self.selection {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };

        if let Some(root) = &self.root {
            if let Err(err) = fs::remove_file(root.join(&removed.file)) {
                warn!("could not delete overlay blob {}: {err}", removed.file);
            }
        }
        self.save_index()?;
        info!("removed overlay {id} ({} left)", self.entries.len());
        Ok(())
    }

    /// Set or clear the selection. Out-of-range indexes are refused.
    pub fn select(&mut self, selection: Option<usize>) -> Result<(), StoreError> {
        if let Some(index) = selection {
            if index >= self.entries.len() {
                return Err(StoreError::InvalidSelection {
                    index,
                    len: self.entries.len(),
                });
            }
        }
        self.selection = selection;
        Ok(())
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn save_index(&self) -> Result<(), StoreError> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let index: Vec<IndexEntry> = self
            .entries
            .iter()
            .map(|e| IndexEntry {
                id: e.id,
                file: e.file.clone(),
            })
            .collect();
        fs::write(root.join(INDEX_FILE), serde_json::to_string_pretty(&index)?)?;
        Ok(())
    }
}

/// Default on-disk location: `<data_dir>/decocam/overlays`.
pub fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("decocam").join("overlays"))
}
