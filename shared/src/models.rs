use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when constructing domain values from untrusted input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid time of day '{0}', expected HH:mm")]
    InvalidClockTime(String),

    #[error("time window start {start} must be before end {end}")]
    EmptyWindow { start: ClockTime, end: ClockTime },

    #[error("time slot start {start} must be before end {end}")]
    EmptySlot {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
}

// ============================================================================
// Wall-clock values
// ============================================================================

/// A time of day with minute precision, written as `HH:mm` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ModelError::InvalidClockTime(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// A same-day window of wall-clock time. Windows crossing midnight are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: ClockTime,
    end: ClockTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: ClockTime,
    end: ClockTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = ModelError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, ModelError> {
        if start >= end {
            return Err(ModelError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a window from hour/minute pairs, for static tables.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        let start = ClockTime::from_hm(start.0, start.1)?;
        let end = ClockTime::from_hm(end.0, end.1)?;
        Self::new(start, end).ok()
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }
}

// ============================================================================
// Time slots
// ============================================================================

/// A concrete interval of time. Always satisfies `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = ModelError;

    fn try_from(raw: RawTimeSlot) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ModelError> {
        if start >= end {
            return Err(ModelError::EmptySlot { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test: slots that only touch do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The common part of two slots, if any.
    pub fn intersect(&self, other: &TimeSlot) -> Option<TimeSlot> {
        TimeSlot::new(self.start.max(other.start), self.end.min(other.end)).ok()
    }
}

/// A busy period reported by a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Degenerate intervals (`start >= end`) block nothing and yield `None`.
    pub fn as_slot(&self) -> Option<TimeSlot> {
        TimeSlot::new(self.start, self.end).ok()
    }
}

// ============================================================================
// Event templates
// ============================================================================

/// How the meeting takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Video,
    InPerson,
}

/// Named meeting purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Coffee,
    Lunch,
    Dinner,
    QuickCall,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Coffee,
        Intent::Lunch,
        Intent::Dinner,
        Intent::QuickCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Coffee => "coffee",
            Intent::Lunch => "lunch",
            Intent::Dinner => "dinner",
            Intent::QuickCall => "quick-call",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| ModelError::UnknownIntent(s.to_string()))
    }
}

/// Commute time reserved around an in-person meeting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelBuffer {
    pub before_minutes: u32,
    pub after_minutes: u32,
}

impl TravelBuffer {
    pub const NONE: TravelBuffer = TravelBuffer {
        before_minutes: 0,
        after_minutes: 0,
    };

    pub fn before(&self) -> Duration {
        Duration::minutes(i64::from(self.before_minutes))
    }

    pub fn after(&self) -> Duration {
        Duration::minutes(i64::from(self.after_minutes))
    }
}

/// Static meeting configuration keyed by intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTemplate {
    pub id: String,
    pub name: String,
    /// Length in minutes
    pub duration: u32,
    pub event_type: EventType,
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time_window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_buffer: Option<TravelBuffer>,
    /// Social plans may land on a weekend; work-style ones may not.
    #[serde(default)]
    pub allow_weekends: bool,
}

impl EventTemplate {
    pub fn is_in_person(&self) -> bool {
        self.event_type == EventType::InPerson
    }

    /// Buffer to apply when searching; video events never carry one.
    pub fn effective_buffer(&self) -> TravelBuffer {
        match self.event_type {
            EventType::InPerson => self.travel_buffer.unwrap_or_default(),
            EventType::Video => TravelBuffer::NONE,
        }
    }
}

// ============================================================================
// User preferences
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub enabled: bool,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl DaySchedule {
    /// The usable window, or `None` when the day is off or the hours are empty.
    pub fn window(&self) -> Option<TimeWindow> {
        if !self.enabled {
            return None;
        }
        TimeWindow::new(self.start, self.end).ok()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekly working hours, one schedule per weekday.
///
/// On the wire this is an object keyed by weekday name (`"monday"` or
/// `"Mon"`). Days the object leaves out keep their default schedule, so
/// `{"friday": {...}}` only changes Friday.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<Weekday, DaySchedule>")]
pub struct WorkingHours(HashMap<Weekday, DaySchedule>);

impl WorkingHours {
    /// Hours for a complete week. Days absent from `days` are days off.
    pub fn new(days: HashMap<Weekday, DaySchedule>) -> Self {
        Self(days)
    }

    /// Working window for a weekday, `None` on a day off.
    pub fn window_for(&self, weekday: Weekday) -> Option<TimeWindow> {
        self.0.get(&weekday).and_then(DaySchedule::window)
    }

    pub fn set(&mut self, weekday: Weekday, schedule: DaySchedule) {
        self.0.insert(weekday, schedule);
    }
}

impl Default for WorkingHours {
    /// Monday to Friday, 09:00 to 17:00.
    fn default() -> Self {
        let (Some(nine), Some(five)) = (ClockTime::from_hm(9, 0), ClockTime::from_hm(17, 0)) else {
            return Self(HashMap::new());
        };
        let days = WEEK
            .into_iter()
            .map(|day| {
            let enabled = !matches!(day, Weekday::Sat | Weekday::Sun);
            (
                day,
                DaySchedule {
                    enabled,
                    start: nine,
                    end: five,
                },
            )
        })
        .collect();
        Self(days)
    }
}

impl From<HashMap<Weekday, DaySchedule>> for WorkingHours {
    fn from(overrides: HashMap<Weekday, DaySchedule>) -> Self {
        let mut hours = Self::default();
        hours.0.extend(overrides);
        hours
    }
}

impl Serialize for WorkingHours {
    /// Days are written Monday first.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            WEEK.iter()
                .filter_map(|day| self.0.get(day).map(|schedule| (day, schedule))),
        )
    }
}

/// Scheduling preferences owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub working_hours: WorkingHours,
    pub timezone: Tz,
}

impl UserPreferences {
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            working_hours: WorkingHours::default(),
            timezone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, h, m, 0).unwrap()
    }

    #[test]
    fn test_clock_time_round_trips_through_json() {
        let time: ClockTime = serde_json::from_str("\"07:30\"").unwrap();
        assert_eq!(time, ClockTime::from_hm(7, 30).unwrap());
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"07:30\"");
    }

    #[test]
    fn test_clock_time_rejects_garbage() {
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_time_window_rejects_inverted_bounds() {
        let result: Result<TimeWindow, _> =
            serde_json::from_str(r#"{"start": "14:00", "end": "11:00"}"#);
        assert!(result.is_err());
        assert!(TimeWindow::from_hm((9, 0), (9, 0)).is_none());
    }

    #[test]
    fn test_time_slot_requires_start_before_end() {
        assert!(TimeSlot::new(utc(10, 0), utc(10, 0)).is_err());
        assert!(TimeSlot::new(utc(11, 0), utc(10, 0)).is_err());

        let json = r#"{"start": "2024-01-08T11:00:00Z", "end": "2024-01-08T10:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeSlot>(json).is_err());
    }

    #[test]
    fn test_touching_slots_do_not_overlap() {
        let a = TimeSlot::new(utc(9, 0), utc(10, 0)).unwrap();
        let b = TimeSlot::new(utc(10, 0), utc(11, 0)).unwrap();
        let c = TimeSlot::new(utc(9, 30), utc(10, 30)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(
            a.intersect(&c),
            Some(TimeSlot::new(utc(9, 30), utc(10, 0)).unwrap())
        );
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn test_intent_parsing_accepts_wire_names() {
        assert_eq!("quick-call".parse::<Intent>().unwrap(), Intent::QuickCall);
        assert_eq!("coffee".parse::<Intent>().unwrap(), Intent::Coffee);
        assert!("brunch".parse::<Intent>().is_err());
        assert!("Coffee".parse::<Intent>().is_err());
        assert!("quick_call".parse::<Intent>().is_err());
        assert_eq!(
            serde_json::to_string(&Intent::QuickCall).unwrap(),
            "\"quick-call\""
        );
    }

    #[test]
    fn test_video_events_have_no_buffer() {
        let template = EventTemplate {
            id: "call".to_string(),
            name: "Call".to_string(),
            duration: 15,
            event_type: EventType::Video,
            intent: Intent::QuickCall,
            preferred_time_window: None,
            travel_buffer: Some(TravelBuffer {
                before_minutes: 10,
                after_minutes: 10,
            }),
            allow_weekends: false,
        };
        assert_eq!(template.effective_buffer(), TravelBuffer::NONE);
    }

    #[test]
    fn test_default_working_hours_skip_weekends() {
        let hours = WorkingHours::default();
        assert_eq!(
            hours.window_for(Weekday::Wed),
            TimeWindow::from_hm((9, 0), (17, 0))
        );
        assert_eq!(hours.window_for(Weekday::Sat), None);
        assert_eq!(hours.window_for(Weekday::Sun), None);
    }

    #[test]
    fn test_partial_working_hours_keep_other_defaults() {
        let prefs: UserPreferences = serde_json::from_str(
            r#"{
                "timezone": "Asia/Tokyo",
                "workingHours": {
                    "monday": {"enabled": true, "start": "10:00", "end": "18:00"},
                    "Sat": {"enabled": true, "start": "09:00", "end": "12:00"}
                }
            }"#,
        )
        .unwrap();

        let hours = &prefs.working_hours;
        assert_eq!(hours.window_for(Weekday::Mon), TimeWindow::from_hm((10, 0), (18, 0)));
        assert_eq!(hours.window_for(Weekday::Tue), TimeWindow::from_hm((9, 0), (17, 0)));
        assert_eq!(hours.window_for(Weekday::Sat), TimeWindow::from_hm((9, 0), (12, 0)));
        assert_eq!(hours.window_for(Weekday::Sun), None);
    }

    #[test]
    fn test_working_hours_serialize_monday_first() {
        let json = serde_json::to_string(&WorkingHours::default()).unwrap();
        let positions: Vec<usize> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .map(|day| json.find(&format!("\"{day}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        let back: WorkingHours = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WorkingHours::default());
    }

    #[test]
    fn test_preferences_deserialize_with_default_hours() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"timezone": "Europe/Berlin"}"#).unwrap();
        assert_eq!(prefs.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(prefs.working_hours, WorkingHours::default());
    }
}
