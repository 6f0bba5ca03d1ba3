use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::WindowWidth;
use crate::services::hierarchy::SegmentTree;

/// The currently loaded tree. Reloads swap the whole `Arc`; a tree is never
/// modified once built.
#[derive(Clone, Default)]
pub struct TreeSlot {
    inner: Arc<RwLock<Arc<SegmentTree>>>,
}

impl TreeSlot {
    pub fn new(tree: SegmentTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(tree))),
        }
    }

    pub fn current(&self) -> AppResult<Arc<SegmentTree>> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| AppError::Internal("tree lock poisoned".into()))
    }

    pub fn replace(&self, tree: SegmentTree) -> AppResult<Arc<SegmentTree>> {
        let tree = Arc::new(tree);
        let mut guard = self
            .inner
            .write()
            .map_err(|_| AppError::Internal("tree lock poisoned".into()))?;
        *guard = Arc::clone(&tree);
        Ok(tree)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tree: TreeSlot,
}

impl AppState {
    pub fn new(config: Config, tree: SegmentTree) -> Self {
        Self {
            config: Arc::new(config),
            tree: TreeSlot::new(tree),
        }
    }

    pub fn default_width(&self) -> AppResult<WindowWidth> {
        WindowWidth::new(self.config.days_per_sample)
    }
}
