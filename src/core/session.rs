//! Analysis session: a snapshot cache in front of the pipeline
//!
//! The raw table is loaded once per source version and reused across filter
//! changes; every filter change reruns the pipeline on the cached snapshot.

use crate::core::cache::{SnapshotCache, SourceKey};
use crate::core::error::SessionError;
use crate::core::filter::FilterSpec;
use crate::core::loader::load_production_csv;
use crate::core::pipeline::{Pipeline, PipelineRun};
use std::path::Path;

/// A pipeline plus the cache it reads from.
#[derive(Debug, Default)]
pub struct Session {
    pipeline: Pipeline,
    cache: SnapshotCache,
}

impl Session {
    /// Session around a configured pipeline
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            cache: SnapshotCache::new(),
        }
    }

    /// Analyze a CSV file, reusing the cached snapshot while the file is unchanged
    ///
    /// # Errors
    /// Returns [`SessionError::Load`] if the file cannot be read and
    /// [`SessionError::Pipeline`] for schema or integrity failures.
    pub fn analyze_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        filter: &FilterSpec,
    ) -> Result<PipelineRun, SessionError> {
        let path = path.as_ref();
        let key = SourceKey::for_path(path)?;
        let table = self.cache.get_or_load(&key, || load_production_csv(path))?;
        Ok(self.pipeline.run(&table, filter)?)
    }

    /// The underlying cache
    #[must_use]
    pub const fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// The underlying pipeline
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
