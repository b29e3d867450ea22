use std::sync::Arc;

use passvault_vault::Engine;

/// Shared application state.
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}
