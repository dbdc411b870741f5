use std::sync::Arc;

use crate::scheduling::{TemplateCatalog, VenueCatalog};
use crate::services::AvailabilityService;

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<AvailabilityService>,
    pub templates: Arc<TemplateCatalog>,
    pub venues: Arc<VenueCatalog>,
}

impl AppState {
    pub fn new(availability: AvailabilityService) -> Self {
        Self {
            availability: Arc::new(availability),
            templates: Arc::new(TemplateCatalog::builtin()),
            venues: Arc::new(VenueCatalog::builtin()),
        }
    }
}
