use crate::cache::ResourceCache;
use crate::storage::FileLoader;
use std::{path::PathBuf, sync::Arc};

/// Shared server state: the snapshot dir and the process-wide resource
/// cache. Each request builds its own page; the cache spans requests so
/// weekly loads coalesce until the producer bumps the version token.
#[derive(Clone)]
pub struct AppState {
    pub snapshot_dir: PathBuf,
    pub cache: ResourceCache,
}

impl AppState {
    pub fn new(snapshot_dir: PathBuf) -> Self {
        let cache = ResourceCache::new(Arc::new(FileLoader::new(snapshot_dir.clone())));
        Self {
            snapshot_dir,
            cache,
        }
    }
}
