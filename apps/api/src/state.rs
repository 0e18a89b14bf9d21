use std::sync::Arc;

use crate::config::Config;
use crate::resume::Pipeline;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<Pipeline>,
}
