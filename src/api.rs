//! HTTP API for the TechCraft demo backend

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::catalog::CatalogProvider;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { sessions, catalog }
    }
}
