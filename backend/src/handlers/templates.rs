use axum::{
    extract::{Path, State},
    Json,
};
use rendezvous_shared::api::ListTemplatesResponse;
use rendezvous_shared::EventTemplate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_templates(State(state): State<AppState>) -> Json<ListTemplatesResponse> {
    let templates = state.templates.all().to_vec();
    Json(ListTemplatesResponse {
        total: templates.len(),
        templates,
    })
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventTemplate>> {
    state
        .templates
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Template '{}'", id)))
}
