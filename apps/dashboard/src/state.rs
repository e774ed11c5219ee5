use std::sync::Arc;

use crate::dataset::DatasetLoader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Cache-or-fetch access to the dataset. Owns the injected cache client and source.
    pub loader: Arc<DatasetLoader>,
}
