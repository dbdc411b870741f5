//! External collaborators the scheduler reads from.
//!
//! Calendars and preferences live outside this service. Handlers only see
//! the traits below; `main` picks the concrete adapters from configuration.

pub mod calcom;
pub mod preferences;
pub mod static_calendar;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rendezvous_shared::{BusyInterval, UserPreferences};
use thiserror::Error;

pub use calcom::CalComCalendar;
pub use preferences::InMemoryPreferences;
pub use static_calendar::StaticCalendar;

/// Failure talking to an upstream calendar or preferences source
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {service} failed")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable response")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Source of busy intervals per user
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Busy intervals for `user_id` overlapping `[from, to)`.
    async fn busy_intervals(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, ProviderError>;
}

/// Source of per-user working hours and timezone
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn preferences(&self, user_id: &str) -> Result<UserPreferences, ProviderError>;
}
