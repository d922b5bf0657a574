//! Memoized matrix loads and the refresh counter
//!
//! Loads are cached under `(path, options, generation)`. Bumping the refresh
//! counter moves every caller to a new generation, so the next access re-reads
//! the workbook; stale generations of that path are evicted when the new one
//! lands.

use crate::error::Result;
use crate::loader::{self, LoadOptions};
use crate::table::MatrixTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Monotonic counter; each bump invalidates cached loads
#[derive(Debug, Default)]
pub struct RefreshCounter {
    value: AtomicU64,
}

impl RefreshCounter {
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Increment and return the new generation
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    options: LoadOptions,
    generation: u64,
}

/// Loaded tables keyed by source, options and generation
#[derive(Debug, Default)]
pub struct MatrixCache {
    entries: HashMap<CacheKey, Arc<MatrixTable>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached table for this key, reading the workbook on a miss
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
        generation: u64,
    ) -> Result<Arc<MatrixTable>> {
        self.get_or_insert_with(path, options, generation, || loader::load(path, options))
    }

    /// Like [`get_or_load`](Self::get_or_load) with a caller-supplied loader.
    /// Failed loads are not cached.
    pub fn get_or_insert_with<F>(
        &mut self,
        path: &Path,
        options: &LoadOptions,
        generation: u64,
        load: F,
    ) -> Result<Arc<MatrixTable>>
    where
        F: FnOnce() -> Result<MatrixTable>,
    {
        let key = CacheKey {
            path: normalize_path(path),
            options: options.clone(),
            generation,
        };

        if let Some(table) = self.entries.get(&key) {
            debug!(path = %path.display(), generation, "matrix cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(path = %path.display(), generation, "matrix cache miss");
        let table = Arc::new(load()?);

        let before = self.entries.len();
        self.entries.retain(|k, _| {
            !(k.path == key.path && k.options == key.options && k.generation < generation)
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(path = %path.display(), evicted, "evicted stale generations");
        }

        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

static REFRESH: RefreshCounter = RefreshCounter::new();

lazy_static::lazy_static! {
    static ref CACHE: Mutex<MatrixCache> = Mutex::new(MatrixCache::new());
}

/// The process-wide refresh counter
pub fn refresh_counter() -> &'static RefreshCounter {
    &REFRESH
}

/// Request a reload of every cached workbook. Returns the new generation.
pub fn refresh() -> u64 {
    let generation = REFRESH.bump();
    info!(generation, "refresh requested");
    generation
}

/// Load through the process-wide cache at the current generation
pub fn load_cached(path: &Path, options: &LoadOptions) -> Result<Arc<MatrixTable>> {
    let generation = REFRESH.current();
    let mut cache = CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cache.get_or_load(path, options, generation)
}
