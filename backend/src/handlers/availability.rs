use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use rendezvous_shared::api::{
    FindSlotRequest, FindSlotResponse, SuggestSlotsRequest, SuggestSlotsResponse, SuggestedSlot,
};
use rendezvous_shared::{EventTemplate, Intent, TimeSlot, TravelBuffer};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::scheduling::{TemplateCatalog, VenueCatalog};
use crate::services::SlotQuery;
use crate::state::AppState;

const DEFAULT_SUGGESTION_LIMIT: u32 = 5;

pub async fn find_slot(
    State(state): State<AppState>,
    payload: Result<Json<FindSlotRequest>, JsonRejection>,
) -> ApiResult<Json<FindSlotResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = resolve_query(&request, &state.templates)?;

    let slot = state.availability.find_slot(&query, Utc::now()).await?;

    match &slot {
        Some(found) => tracing::info!(
            template = %query.template.id,
            start = %found.start(),
            "Found mutual slot"
        ),
        None => tracing::info!(template = %query.template.id, "No mutual slot in horizon"),
    }

    Ok(Json(FindSlotResponse {
        slot: slot.map(|slot| with_location(slot, &query.template, &state.venues)),
    }))
}

pub async fn suggest_slots(
    State(state): State<AppState>,
    payload: Result<Json<SuggestSlotsRequest>, JsonRejection>,
) -> ApiResult<Json<SuggestSlotsResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = resolve_query(&request.query, &state.templates)?;
    request.validate()?;

    let limit = request.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT) as usize;
    let slots = state
        .availability
        .suggest_slots(&query, Utc::now(), limit)
        .await?;

    tracing::info!(
        template = %query.template.id,
        count = slots.len(),
        "Suggested mutual slots"
    );

    Ok(Json(SuggestSlotsResponse {
        slots: slots
            .into_iter()
            .map(|slot| with_location(slot, &query.template, &state.venues))
            .collect(),
    }))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_field(field))
}

/// Validate a request and fold its overrides into the matching template.
pub(crate) fn resolve_query(
    request: &FindSlotRequest,
    templates: &TemplateCatalog,
) -> ApiResult<SlotQuery> {
    let user1 = required(&request.user1_id, "user1Id")?;
    let user2 = required(&request.user2_id, "user2Id")?;
    let intent: Intent = required(&request.intent, "intent")?
        .parse()
        .map_err(|e: rendezvous_shared::ModelError| ApiError::bad_request(e.to_string()))?;

    if user1 == user2 {
        return Err(ApiError::bad_request(
            "user1Id and user2Id must name different users",
        ));
    }
    request.validate()?;

    let mut template = match request.template_id.as_deref() {
        Some(id) => templates
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::bad_request(format!("Unknown template id '{}'", id)))?,
        None => templates
            .for_intent(intent)
            .cloned()
            .ok_or_else(|| ApiError::bad_request(format!("No template for intent '{}'", intent)))?,
    };
    if template.intent != intent {
        return Err(ApiError::bad_request(format!(
            "Template '{}' is for intent '{}', not '{}'",
            template.id, template.intent, intent
        )));
    }

    apply_overrides(&mut template, request);
    let include_weekends = request.include_weekends.unwrap_or(template.allow_weekends);

    Ok(SlotQuery {
        participants: [user1.to_string(), user2.to_string()],
        template,
        include_weekends,
    })
}

fn apply_overrides(template: &mut EventTemplate, request: &FindSlotRequest) {
    if let Some(duration) = request.duration {
        template.duration = duration;
    }
    if let Some(window) = request.time_window {
        template.preferred_time_window = Some(window);
    }
    if request.buffer_before.is_some() || request.buffer_after.is_some() {
        let base = template.travel_buffer.unwrap_or_default();
        template.travel_buffer = Some(TravelBuffer {
            before_minutes: request.buffer_before.unwrap_or(base.before_minutes),
            after_minutes: request.buffer_after.unwrap_or(base.after_minutes),
        });
    }
}

fn with_location(slot: TimeSlot, template: &EventTemplate, venues: &VenueCatalog) -> SuggestedSlot {
    let location = if template.is_in_person() {
        venues.suggest(template.intent, &mut rand::thread_rng())
    } else {
        None
    };
    SuggestedSlot { slot, location }
}
