//! Process-wide handle to the loaded predictor.

use algobio_error::{ModelError, ModelErrorKind, ModelResult};
use algobio_interface::Predictor;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Shared, swappable reference to the loaded predictor.
///
/// Requests clone the inner `Arc` and run inference without holding the lock.
/// Reloading replaces the reference atomically; a predictor is never mutated
/// in place.
#[derive(Clone, Default)]
pub struct SharedPredictor {
    inner: Arc<RwLock<Option<Arc<dyn Predictor>>>>,
}

impl SharedPredictor {
    /// Handle with nothing loaded yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handle around an already-loaded predictor.
    pub fn loaded(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(predictor))),
        }
    }

    /// Install a predictor, returning the one it replaced.
    pub fn swap(&self, predictor: Arc<dyn Predictor>) -> Option<Arc<dyn Predictor>> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            classes = predictor.classes().len(),
            replaced = guard.is_some(),
            "Installing predictor"
        );
        guard.replace(predictor)
    }

    /// Current predictor.
    ///
    /// # Errors
    ///
    /// Returns [`ModelErrorKind::Unavailable`] if nothing has been loaded.
    pub fn current(&self) -> ModelResult<Arc<dyn Predictor>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ModelError::new(ModelErrorKind::Unavailable))
    }

    /// Whether a predictor is installed.
    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for SharedPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPredictor")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
