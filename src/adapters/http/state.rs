//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::{
    RecommendPersonasHandler, RecommendSchoolsHandler, SessionDefaults, StartSessionHandler,
    TurnDriver,
};
use crate::ports::CatalogReader;

use super::sessions::SessionRegistry;

/// Shared application state containing all dependencies.
///
/// Cloned for each request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub driver: TurnDriver,
    pub sessions: SessionRegistry,
    pub defaults: SessionDefaults,
    /// Recommended-list size when a request names none.
    pub max_recommended: usize,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        driver: TurnDriver,
        defaults: SessionDefaults,
        max_recommended: usize,
    ) -> Self {
        Self {
            catalog,
            driver,
            sessions: SessionRegistry::new(),
            defaults,
            max_recommended,
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn recommend_personas_handler(&self) -> RecommendPersonasHandler {
        RecommendPersonasHandler::new(self.catalog.clone())
    }

    pub fn recommend_schools_handler(&self) -> RecommendSchoolsHandler {
        RecommendSchoolsHandler::new(self.catalog.clone())
    }

    pub fn start_session_handler(&self) -> StartSessionHandler {
        StartSessionHandler::new(self.catalog.clone(), self.defaults.clone())
    }
}
