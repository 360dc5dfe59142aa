use std::sync::Arc;

use crate::advisors::Advisors;
use crate::flow::registry::FlowRegistry;
use crate::profile::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Flows by name, for the generic invoke endpoint.
    pub registry: Arc<FlowRegistry>,
    /// The same flows with their typed records.
    pub advisors: Arc<Advisors>,
    /// Stored onboarding profiles. `None` when no database is configured.
    pub profiles: Option<Arc<dyn ProfileStore>>,
}
