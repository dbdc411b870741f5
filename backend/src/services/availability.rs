//! Mutual availability search.
//!
//! Extracts the slot-finding flow from HTTP handlers: fetch both
//! participants' preferences and calendars, then run the pure scheduling
//! core over them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rendezvous_shared::{EventTemplate, TimeSlot};

use crate::providers::{CalendarProvider, PreferencesStore, ProviderError};
use crate::scheduling::{
    default_dayparts, restrict_to_working_hours, CandidateGenerator, ConstraintFilter,
    SlotRequirements,
};

/// A validated availability question
#[derive(Debug, Clone)]
pub struct SlotQuery {
    /// Organizer first; the organizer's timezone anchors the search
    pub participants: [String; 2],
    /// Template with request overrides already applied
    pub template: EventTemplate,
    pub include_weekends: bool,
}

/// Candidates and filter ready to be queried
struct Search {
    candidates: Vec<TimeSlot>,
    filter: Option<ConstraintFilter>,
    generator: CandidateGenerator,
}

/// Service for availability business logic
pub struct AvailabilityService {
    calendar: Arc<dyn CalendarProvider>,
    preferences: Arc<dyn PreferencesStore>,
    horizon_days: u32,
}

impl AvailabilityService {
    pub fn new(
        calendar: Arc<dyn CalendarProvider>,
        preferences: Arc<dyn PreferencesStore>,
        horizon_days: u32,
    ) -> Self {
        Self {
            calendar,
            preferences,
            horizon_days,
        }
    }

    /// Earliest slot both participants can make, or `None`.
    pub async fn find_slot(
        &self,
        query: &SlotQuery,
        now: DateTime<Utc>,
    ) -> Result<Option<TimeSlot>, ProviderError> {
        let search = self.prepare(query, now).await?;
        Ok(search
            .filter
            .as_ref()
            .and_then(|filter| filter.first_slot(&search.candidates)))
    }

    /// Earliest slot on each of the next `limit` days that have one.
    pub async fn suggest_slots(
        &self,
        query: &SlotQuery,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TimeSlot>, ProviderError> {
        let search = self.prepare(query, now).await?;
        Ok(search
            .filter
            .as_ref()
            .map(|filter| {
                filter.earliest_per_day(&search.candidates, search.generator.timezone(), limit)
            })
            .unwrap_or_default())
    }

    async fn prepare(&self, query: &SlotQuery, now: DateTime<Utc>) -> Result<Search, ProviderError> {
        let [organizer_id, invitee_id] = &query.participants;

        let (organizer, invitee) = tokio::try_join!(
            self.preferences.preferences(organizer_id),
            self.preferences.preferences(invitee_id),
        )?;

        let windows = query
            .template
            .preferred_time_window
            .map(|window| vec![window])
            .unwrap_or_else(default_dayparts);
        let generator = CandidateGenerator::new(&windows, query.include_weekends, organizer.timezone);

        let start_date = generator.search_start(now);
        let end_date = CandidateGenerator::horizon_end(start_date, self.horizon_days);
        let mut candidates = generator.generate(start_date, end_date);

        if !query.include_weekends {
            candidates = restrict_to_working_hours(&candidates, &[&organizer, &invitee]);
        }

        tracing::debug!(
            template = %query.template.id,
            %start_date,
            %end_date,
            candidates = candidates.len(),
            "Generated candidate windows"
        );

        let (Some(first), Some(last)) = (candidates.first(), candidates.last()) else {
            return Ok(Search {
                candidates,
                filter: None,
                generator,
            });
        };
        let (from, to) = (first.start(), last.end());

        let (organizer_busy, invitee_busy) = tokio::try_join!(
            self.calendar.busy_intervals(organizer_id, from, to),
            self.calendar.busy_intervals(invitee_id, from, to),
        )?;

        tracing::debug!(
            organizer_busy = organizer_busy.len(),
            invitee_busy = invitee_busy.len(),
            "Fetched busy intervals"
        );

        let requirements =
            SlotRequirements::new(query.template.duration, query.template.effective_buffer());
        let filter = ConstraintFilter::new(organizer_busy.iter().chain(&invitee_busy), requirements);

        Ok(Search {
            candidates,
            filter: Some(filter),
            generator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Datelike, Duration, TimeZone, Weekday};
    use rendezvous_shared::{BusyInterval, Intent, UserPreferences};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::providers::{InMemoryPreferences, StaticCalendar};
    use crate::scheduling::TemplateCatalog;

    struct FailingCalendar;

    #[async_trait]
    impl CalendarProvider for FailingCalendar {
        async fn busy_intervals(
            &self,
            _user_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<BusyInterval>, ProviderError> {
            Err(ProviderError::Other("calendar offline".to_string()))
        }
    }

    /// Counts calls so tests can tell whether calendars were consulted
    #[derive(Default)]
    struct CountingCalendar {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CalendarProvider for CountingCalendar {
        async fn busy_intervals(
            &self,
            _user_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<BusyInterval>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, h, m, 0).unwrap()
    }

    fn query(intent: Intent) -> SlotQuery {
        let template = TemplateCatalog::builtin()
            .for_intent(intent)
            .cloned()
            .unwrap();
        SlotQuery {
            participants: ["alice".to_string(), "bob".to_string()],
            include_weekends: template.allow_weekends,
            template,
        }
    }

    fn service(calendar: impl CalendarProvider + 'static) -> AvailabilityService {
        AvailabilityService::new(
            Arc::new(calendar),
            Arc::new(InMemoryPreferences::new(chrono_tz::UTC)),
            14,
        )
    }

    #[tokio::test]
    async fn test_lunch_lands_inside_shared_free_time() {
        // Both are free 11:00-14:00 on Monday the 8th and busy otherwise
        let calendar = StaticCalendar::new()
            .with_busy("alice", BusyInterval { start: at(8, 0, 0), end: at(8, 11, 0) })
            .with_busy("alice", BusyInterval { start: at(8, 14, 0), end: at(31, 0, 0) })
            .with_busy("bob", BusyInterval { start: at(8, 0, 0), end: at(8, 11, 0) })
            .with_busy("bob", BusyInterval { start: at(8, 14, 0), end: at(31, 0, 0) });
        let mut lunch = query(Intent::Lunch);
        lunch.template.duration = 60;

        let slot = service(calendar)
            .find_slot(&lunch, at(8, 7, 0))
            .await
            .unwrap()
            .expect("a lunch slot");

        assert_eq!(slot.duration(), Duration::minutes(60));
        assert!(slot.start() >= at(8, 11, 0) && slot.end() <= at(8, 14, 0));
    }

    #[tokio::test]
    async fn test_no_overlap_returns_none() {
        let calendar = StaticCalendar::new()
            .with_busy("bob", BusyInterval { start: at(1, 0, 0), end: at(31, 0, 0) });

        let slot = service(calendar)
            .find_slot(&query(Intent::QuickCall), at(8, 7, 0))
            .await
            .unwrap();
        assert_eq!(slot, None);
    }

    #[tokio::test]
    async fn test_busy_for_one_participant_pushes_slot_later() {
        let calendar = StaticCalendar::new()
            .with_busy("bob", BusyInterval { start: at(8, 9, 0), end: at(8, 10, 0) });

        let slot = service(calendar)
            .find_slot(&query(Intent::QuickCall), at(8, 7, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(slot.start(), at(8, 10, 0));
        assert_eq!(slot.end(), at(8, 10, 15));
    }

    #[tokio::test]
    async fn test_passed_window_rolls_to_next_weekday() {
        // Friday 12:00, lunch window already started
        let slot = service(StaticCalendar::new())
            .find_slot(&query(Intent::Lunch), at(5, 12, 0))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(slot.start().weekday(), Weekday::Mon);
        assert_eq!(slot.start(), at(8, 11, 15));
    }

    #[tokio::test]
    async fn test_work_intents_never_on_weekends() {
        let slots = service(StaticCalendar::new())
            .suggest_slots(&query(Intent::Coffee), at(5, 12, 0), 10)
            .await
            .unwrap();

        assert_eq!(slots.len(), 10);
        for slot in &slots {
            assert!(!matches!(slot.start().weekday(), Weekday::Sat | Weekday::Sun));
            assert_eq!(slot.duration(), Duration::minutes(30));
        }
        for pair in slots.windows(2) {
            assert!(pair[0].end() <= pair[1].start());
            assert_ne!(pair[0].start().date_naive(), pair[1].start().date_naive());
        }
    }

    #[tokio::test]
    async fn test_dinner_may_fall_on_weekend() {
        // Saturday afternoon
        let slot = service(StaticCalendar::new())
            .find_slot(&query(Intent::Dinner), at(6, 12, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(slot.start(), at(6, 18, 30));
    }

    #[tokio::test]
    async fn test_calendar_failure_is_propagated() {
        let result = service(FailingCalendar)
            .find_slot(&query(Intent::Coffee), at(8, 7, 0))
            .await;
        assert!(matches!(result, Err(ProviderError::Other(_))));
    }

    #[tokio::test]
    async fn test_calendars_not_fetched_without_candidates() {
        let mut prefs = UserPreferences::with_timezone(chrono_tz::UTC);
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            prefs.working_hours.set(
                day,
                rendezvous_shared::DaySchedule {
                    enabled: false,
                    start: rendezvous_shared::ClockTime::from_hm(9, 0).unwrap(),
                    end: rendezvous_shared::ClockTime::from_hm(17, 0).unwrap(),
                },
            );
        }
        let calendar = Arc::new(CountingCalendar::default());
        let service = AvailabilityService::new(
            calendar.clone(),
            Arc::new(InMemoryPreferences::new(chrono_tz::UTC).with_user("bob", prefs)),
            14,
        );

        let slot = service
            .find_slot(&query(Intent::QuickCall), at(8, 7, 0))
            .await
            .unwrap();
        assert_eq!(slot, None);
        assert_eq!(calendar.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invitee_timezone_from_calcom_narrows_search() {
        use crate::providers::CalComCalendar;
        use serde_json::json;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let profile = |time_zone: &str| {
            ResponseTemplate::new(200).set_body_json(json!({
                "busy": [],
                "timeZone": time_zone,
                "workingHours": [{"days": [1, 2, 3, 4, 5], "startTime": 540, "endTime": 1020}]
            }))
        };
        Mock::given(method("GET"))
            .and(path("/availability"))
            .and(query_param("userId", "alice"))
            .respond_with(profile("UTC"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/availability"))
            .and(query_param("userId", "bob"))
            .respond_with(profile("America/New_York"))
            .mount(&server)
            .await;

        let calcom = Arc::new(
            CalComCalendar::new(server.uri(), "k", std::time::Duration::from_secs(5)).unwrap(),
        );
        let service = AvailabilityService::new(calcom.clone(), calcom, 14);

        // Bob works 14:00-22:00 UTC in January, so the morning daypart is out
        let slot = service
            .find_slot(&query(Intent::QuickCall), at(8, 7, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(slot.start(), at(8, 14, 0));
        assert_eq!(slot.end(), at(8, 14, 15));
    }
}
