//! Cal.com availability client.
//!
//! Uses the v1 `GET /availability` endpoint, which reports a user's busy
//! intervals between two instants along with their timezone and weekly
//! working hours.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc, Weekday};
use chrono_tz::Tz;
use rendezvous_shared::{BusyInterval, ClockTime, DaySchedule, UserPreferences, WorkingHours};
use serde::Deserialize;

use super::{CalendarProvider, PreferencesStore, ProviderError};

const SERVICE: &str = "Cal.com";

/// Subset of the Cal.com availability payload we rely on
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityResponse {
    #[serde(default)]
    busy: Vec<BusyInterval>,
    #[serde(default)]
    time_zone: Option<String>,
    #[serde(default)]
    working_hours: Vec<WorkingHoursEntry>,
}

/// One schedule rule: `days` counts from Sunday = 0, times are minutes
/// past local midnight.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingHoursEntry {
    days: Vec<u8>,
    start_time: u32,
    end_time: u32,
}

fn weekday_from_index(day: u8) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn clock_from_minutes(minutes: u32) -> Option<ClockTime> {
    // End of day is reported as 1440
    let minutes = minutes.min(23 * 60 + 59);
    ClockTime::from_hm(minutes / 60, minutes % 60)
}

/// Convert Cal.com schedule rules into weekly hours. Days no rule mentions
/// are days off; rules covering the same day widen to span both. Returns
/// `None` when the user has no usable rules.
fn working_hours_from(entries: &[WorkingHoursEntry]) -> Option<WorkingHours> {
    let mut days: HashMap<Weekday, DaySchedule> = HashMap::new();

    for entry in entries {
        let (Some(start), Some(end)) = (
            clock_from_minutes(entry.start_time),
            clock_from_minutes(entry.end_time),
        ) else {
            continue;
        };
        for weekday in entry.days.iter().copied().filter_map(weekday_from_index) {
            let schedule = days.entry(weekday).or_insert(DaySchedule {
                enabled: true,
                start,
                end,
            });
            schedule.start = schedule.start.min(start);
            schedule.end = schedule.end.max(end);
        }
    }

    if days.is_empty() {
        None
    } else {
        Some(WorkingHours::new(days))
    }
}

#[derive(Clone)]
pub struct CalComCalendar {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_timezone: Tz,
}

impl CalComCalendar {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ProviderError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_timezone: chrono_tz::UTC,
        })
    }

    /// Timezone assumed for users whose Cal.com profile has none.
    pub fn with_default_timezone(mut self, timezone: Tz) -> Self {
        self.default_timezone = timezone;
        self
    }

    async fn fetch_availability(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<AvailabilityResponse, ProviderError> {
        let url = format!("{}/availability", self.base_url);
        let date_from = from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let date_to = to.to_rfc3339_opts(SecondsFormat::Secs, true);

        tracing::debug!(user_id, %date_from, %date_to, "Fetching Cal.com availability");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("userId", user_id),
                ("dateFrom", date_from.as_str()),
                ("dateTo", date_to.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ProviderError::Decode {
                service: SERVICE,
                source,
            })
    }
}

#[async_trait]
impl CalendarProvider for CalComCalendar {
    async fn busy_intervals(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, ProviderError> {
        let payload = self.fetch_availability(user_id, from, to).await?;
        tracing::debug!(user_id, busy = payload.busy.len(), "Cal.com busy times loaded");
        Ok(payload.busy)
    }
}

#[async_trait]
impl PreferencesStore for CalComCalendar {
    async fn preferences(&self, user_id: &str) -> Result<UserPreferences, ProviderError> {
        let now = Utc::now();
        let payload = self
            .fetch_availability(user_id, now, now + chrono::Duration::days(1))
            .await?;

        let timezone = match payload.time_zone.as_deref().map(str::parse::<Tz>) {
            Some(Ok(tz)) => tz,
            Some(Err(_)) => {
                tracing::warn!(
                    user_id,
                    time_zone = ?payload.time_zone,
                    "Unknown Cal.com timezone, using default"
                );
                self.default_timezone
            }
            None => self.default_timezone,
        };

        let working_hours = working_hours_from(&payload.working_hours).unwrap_or_default();
        tracing::debug!(user_id, %timezone, "Cal.com preferences loaded");

        Ok(UserPreferences {
            working_hours,
            timezone,
        })
    }
}
