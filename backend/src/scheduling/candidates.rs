//! Candidate window generation.
//!
//! Turns a date range and a set of wall-clock dayparts into concrete UTC
//! windows in the organizer's timezone.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use rendezvous_shared::{ClockTime, TimeSlot, TimeWindow};

/// Dayparts offered when a template has no preferred window:
/// 09:00–10:30 and 14:00–16:00.
pub fn default_dayparts() -> Vec<TimeWindow> {
    [((9, 0), (10, 30)), ((14, 0), (16, 0))]
        .into_iter()
        .filter_map(|(start, end)| TimeWindow::from_hm(start, end))
        .collect()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day after `date` that is not a Saturday or Sunday.
pub fn next_weekday_after(date: NaiveDate) -> NaiveDate {
    let mut next = date.succ_opt().unwrap_or(date);
    while is_weekend(next) {
        next = match next.succ_opt() {
            Some(day) => day,
            None => break,
        };
    }
    next
}

/// Resolve a local wall-clock time to an instant. Ambiguous times take the
/// earlier instant; times inside a DST gap do not exist.
pub fn local_instant(tz: &Tz, date: NaiveDate, time: ClockTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time.as_naive()))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A wall-clock window on `date` in `tz`, as a concrete slot.
pub fn local_window(tz: &Tz, date: NaiveDate, window: &TimeWindow) -> Option<TimeSlot> {
    let start = local_instant(tz, date, window.start())?;
    let end = local_instant(tz, date, window.end())?;
    TimeSlot::new(start, end).ok()
}

/// Sort windows and merge any that overlap or touch.
fn normalize(windows: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(TimeWindow::start);

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last) if window.start() <= last.end() => {
                if window.end() > last.end() {
                    if let Ok(joined) = TimeWindow::new(last.start(), window.end()) {
                        *last = joined;
                    }
                }
            }
            _ => merged.push(window),
        }
    }
    merged
}

/// Enumerates daypart windows for every eligible day of a range.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    windows: Vec<TimeWindow>,
    include_weekends: bool,
    timezone: Tz,
}

impl CandidateGenerator {
    pub fn new(windows: &[TimeWindow], include_weekends: bool, timezone: Tz) -> Self {
        Self {
            windows: normalize(windows),
            include_weekends,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Day the search begins on. When the first window of today has already
    /// started, the search rolls forward to the next non-weekend day.
    pub fn search_start(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.with_timezone(&self.timezone).date_naive();
        let first_start = self
            .windows
            .first()
            .and_then(|window| local_instant(&self.timezone, today, window.start()));

        match first_start {
            Some(start) if start > now => today,
            _ => next_weekday_after(today),
        }
    }

    /// Last day of a search horizon of `days` days starting at `start`.
    pub fn horizon_end(start: NaiveDate, days: u32) -> NaiveDate {
        start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(start)
    }

    /// Candidate windows for `start_date..=end_date`, ascending and
    /// non-overlapping. Empty when the range is inverted.
    pub fn generate(&self, start_date: NaiveDate, end_date: NaiveDate) -> Vec<TimeSlot> {
        if end_date < start_date {
            return Vec::new();
        }

        start_date
            .iter_days()
            .take_while(|date| *date <= end_date)
            .filter(|date| self.include_weekends || !is_weekend(*date))
            .flat_map(|date| {
                self.windows
                    .iter()
                    .filter_map(move |window| local_window(&self.timezone, date, window))
            })
            .collect()
    }
}
