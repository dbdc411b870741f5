use axum::{
    extract::{Path, State},
    Json,
};
use rendezvous_shared::api::LocationResponse;
use rendezvous_shared::{Intent, ModelError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Venue suggestion for an intent; video intents get `location: null`.
pub async fn suggest_location(
    State(state): State<AppState>,
    Path(intent): Path<String>,
) -> ApiResult<Json<LocationResponse>> {
    let intent: Intent = intent
        .parse()
        .map_err(|e: ModelError| ApiError::bad_request(e.to_string()))?;

    let template = state
        .templates
        .for_intent(intent)
        .ok_or_else(|| ApiError::Config(format!("no template registered for '{}'", intent)))?;

    let location = if template.is_in_person() {
        state.venues.suggest(intent, &mut rand::thread_rng())
    } else {
        None
    };

    Ok(Json(LocationResponse { intent, location }))
}
