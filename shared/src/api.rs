use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{EventTemplate, Intent, TimeSlot, TimeWindow};

// ============================================================================
// Availability API Types
// ============================================================================

/// Body of `POST /api/availability`.
///
/// Identifiers and the intent are optional at the type level so a missing
/// field can be reported by name instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindSlotRequest {
    pub user1_id: Option<String>,
    pub user2_id: Option<String>,
    pub intent: Option<String>,

    /// Meeting length in minutes; defaults to the template duration
    #[validate(range(min = 5, max = 480))]
    pub duration: Option<u32>,

    #[validate(range(max = 240))]
    pub buffer_before: Option<u32>,

    #[validate(range(max = 240))]
    pub buffer_after: Option<u32>,

    pub time_window: Option<TimeWindow>,

    /// Pick a specific template instead of the intent's default one
    pub template_id: Option<String>,

    pub include_weekends: Option<bool>,
}

/// Body of `POST /api/availability/suggestions`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSlotsRequest {
    #[serde(flatten)]
    #[validate]
    pub query: FindSlotRequest,

    #[validate(range(min = 1, max = 20))]
    pub limit: Option<u32>,
}

/// A proposed meeting time, with a venue for in-person intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// `{slot: null}` means nobody could fit the meeting; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindSlotResponse {
    pub slot: Option<SuggestedSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestSlotsResponse {
    pub slots: Vec<SuggestedSlot>,
}

// ============================================================================
// Template & Location API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<EventTemplate>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub intent: Intent,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
