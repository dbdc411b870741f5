use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rendezvous_shared::BusyInterval;

use super::{CalendarProvider, ProviderError};

/// Calendars held in memory. Users without an entry are always free.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    busy: HashMap<String, Vec<BusyInterval>>,
}

impl StaticCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(mut self, user_id: impl Into<String>, interval: BusyInterval) -> Self {
        self.busy.entry(user_id.into()).or_default().push(interval);
        self
    }
}

#[async_trait]
impl CalendarProvider for StaticCalendar {
    async fn busy_intervals(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, ProviderError> {
        let intervals = self
            .busy
            .get(user_id)
            .map(|all| {
                all.iter()
                    .filter(|b| b.start < to && from < b.end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_returns_only_overlapping_intervals() {
        let calendar = StaticCalendar::new()
            .with_busy("alice", BusyInterval { start: at(8, 9), end: at(8, 10) })
            .with_busy("alice", BusyInterval { start: at(12, 9), end: at(12, 10) });

        let busy = calendar
            .busy_intervals("alice", at(8, 0), at(9, 0))
            .await
            .unwrap();
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start, at(8, 9));
    }

    #[tokio::test]
    async fn test_unknown_user_is_free() {
        let calendar = StaticCalendar::new();
        let busy = calendar
            .busy_intervals("nobody", at(8, 0), at(9, 0))
            .await
            .unwrap();
        assert!(busy.is_empty());
    }
}
