use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{availability, health, locations, templates};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Availability routes
        .route("/availability", post(availability::find_slot))
        .route("/availability/suggestions", post(availability::suggest_slots))

        // Template routes
        .route("/templates", get(templates::list_templates))
        .route("/templates/:id", get(templates::get_template))

        // Location routes
        .route("/locations/:intent", get(locations::suggest_location))
}
