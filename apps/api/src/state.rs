use std::sync::Arc;

use crate::backend::RecordSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Where records come from. Default: BackendClient over HTTP; tests plug in a stub.
    pub source: Arc<dyn RecordSource>,
}
