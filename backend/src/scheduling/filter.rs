//! Constraint filtering over candidate windows.
//!
//! A candidate is narrowed to participants' working hours (work-style
//! searches only), then split into free segments around everyone's busy
//! intervals. A segment yields a slot when it still holds the meeting after
//! the travel buffer is carved off both ends.

use std::collections::HashSet;

use chrono::{Datelike, Duration};
use chrono_tz::Tz;
use rendezvous_shared::{BusyInterval, TimeSlot, TravelBuffer, UserPreferences};

use super::candidates::local_window;

/// What a slot has to accommodate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequirements {
    pub duration: Duration,
    pub buffer: TravelBuffer,
}

impl SlotRequirements {
    pub fn new(duration_minutes: u32, buffer: TravelBuffer) -> Self {
        Self {
            duration: Duration::minutes(i64::from(duration_minutes)),
            buffer,
        }
    }

    /// Place the meeting at the start of `segment`, after the leading buffer.
    pub fn fit(&self, segment: &TimeSlot) -> Option<TimeSlot> {
        let start = segment.start() + self.buffer.before();
        let end = start + self.duration;
        if end + self.buffer.after() > segment.end() {
            return None;
        }
        TimeSlot::new(start, end).ok()
    }
}

/// Intersect each candidate with every participant's working hours for
/// that weekday, in the participant's own timezone. Candidates falling on
/// anyone's day off are dropped.
pub fn restrict_to_working_hours(
    candidates: &[TimeSlot],
    participants: &[&UserPreferences],
) -> Vec<TimeSlot> {
    candidates
        .iter()
        .filter_map(|candidate| {
            participants
                .iter()
                .try_fold(*candidate, |narrowed, prefs| {
                    let local_date = narrowed.start().with_timezone(&prefs.timezone).date_naive();
                    let hours = prefs.working_hours.window_for(local_date.weekday())?;
                    let working = local_window(&prefs.timezone, local_date, &hours)?;
                    narrowed.intersect(&working)
                })
        })
        .collect()
}

/// Sort and coalesce busy intervals; degenerate ones are dropped.
fn merge_busy<'a>(intervals: impl IntoIterator<Item = &'a BusyInterval>) -> Vec<TimeSlot> {
    let mut slots: Vec<TimeSlot> = intervals
        .into_iter()
        .filter_map(BusyInterval::as_slot)
        .collect();
    slots.sort_by_key(TimeSlot::start);

    let mut merged: Vec<TimeSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(last) if slot.start() <= last.end() => {
                if slot.end() > last.end() {
                    if let Ok(joined) = TimeSlot::new(last.start(), slot.end()) {
                        *last = joined;
                    }
                }
            }
            _ => merged.push(slot),
        }
    }
    merged
}

/// Busy-aware slot finder shared by both participants.
#[derive(Debug, Clone)]
pub struct ConstraintFilter {
    busy: Vec<TimeSlot>,
    requirements: SlotRequirements,
}

impl ConstraintFilter {
    pub fn new<'a>(
        busy: impl IntoIterator<Item = &'a BusyInterval>,
        requirements: SlotRequirements,
    ) -> Self {
        Self {
            busy: merge_busy(busy),
            requirements,
        }
    }

    /// Parts of `window` not covered by any busy interval.
    pub fn free_segments(&self, window: &TimeSlot) -> Vec<TimeSlot> {
        let mut segments = Vec::new();
        let mut cursor = window.start();

        for busy in &self.busy {
            if busy.end() <= cursor {
                continue;
            }
            if busy.start() >= window.end() {
                break;
            }
            if busy.start() > cursor {
                if let Ok(free) = TimeSlot::new(cursor, busy.start()) {
                    segments.push(free);
                }
            }
            cursor = cursor.max(busy.end());
        }

        if let Ok(tail) = TimeSlot::new(cursor, window.end()) {
            segments.push(tail);
        }
        segments
    }

    /// Earliest slot inside one candidate window.
    pub fn earliest_in(&self, window: &TimeSlot) -> Option<TimeSlot> {
        self.free_segments(window)
            .iter()
            .find_map(|segment| self.requirements.fit(segment))
    }

    /// Earliest slot across all candidates, which must be in ascending order.
    pub fn first_slot(&self, candidates: &[TimeSlot]) -> Option<TimeSlot> {
        candidates
            .iter()
            .find_map(|candidate| self.earliest_in(candidate))
    }

    /// Earliest slot of each distinct day (in `tz`), up to `limit` days.
    pub fn earliest_per_day(&self, candidates: &[TimeSlot], tz: Tz, limit: usize) -> Vec<TimeSlot> {
        let mut seen_days = HashSet::new();
        candidates
            .iter()
            .filter_map(|candidate| self.earliest_in(candidate))
            .filter(|slot| seen_days.insert(slot.start().with_timezone(&tz).date_naive()))
            .take(limit)
            .collect()
    }
}
