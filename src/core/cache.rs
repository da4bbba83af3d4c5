//! Session cache for loaded datasets
//!
//! Holds one immutable snapshot per source key. A key combines the identity
//! of the source with a modification marker, so an edited file yields a new
//! key and the next request reloads it.

use crate::core::error::LoadError;
use crate::core::models::RawTable;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Identity of a data source plus a marker that changes when its content does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    /// Stable identity (typically a canonical path)
    pub identity: String,
    /// Modification marker (typically mtime in nanoseconds mixed with file length)
    pub marker: u128,
}

impl SourceKey {
    /// Build a key from explicit parts
    #[must_use]
    pub fn new(identity: impl Into<String>, marker: u128) -> Self {
        Self {
            identity: identity.into(),
            marker,
        }
    }

    /// Key a file by its canonical path, modification time and length
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if the file metadata cannot be read.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let io_err = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };
        let canonical = fs::canonicalize(path).map_err(io_err)?;
        let metadata = fs::metadata(&canonical).map_err(io_err)?;
        let modified = metadata.modified().map_err(io_err)?;
        let nanos = modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let marker = nanos ^ (u128::from(metadata.len()) << 64);
        Ok(Self::new(canonical.display().to_string(), marker))
    }
}

/// Single-slot snapshot store.
///
/// Snapshots are handed out as shared [`Arc`]s; nothing can mutate a cached table.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: Option<(SourceKey, Arc<RawTable>)>,
    loads: usize,
}

impl SnapshotCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot for `key`, calling `load` only on a miss.
    ///
    /// # Errors
    /// Propagates the loader's error; the previous snapshot is kept in that case.
    pub fn get_or_load<F>(&mut self, key: &SourceKey, load: F) -> Result<Arc<RawTable>, LoadError>
    where
        F: FnOnce() -> Result<RawTable, LoadError>,
    {
        if let Some((cached, table)) = &self.slot {
            if cached == key {
                debug!(source = %key.identity, "snapshot cache hit");
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load()?);
        self.loads += 1;
        debug!(source = %key.identity, rows = table.len(), "snapshot cache filled");
        self.slot = Some((key.clone(), Arc::clone(&table)));
        Ok(table)
    }

    /// Key of the current snapshot, if any
    #[must_use]
    pub fn current_key(&self) -> Option<&SourceKey> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    /// How many times the loader has been invoked
    #[must_use]
    pub const fn load_count(&self) -> usize {
        self.loads
    }

    /// Drop the cached snapshot
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
