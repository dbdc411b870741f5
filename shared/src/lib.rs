//! Types shared between the scheduling backend and its clients.

pub mod api;
pub mod models;

pub use models::{
    BusyInterval, ClockTime, DaySchedule, EventTemplate, EventType, Intent, ModelError,
    TimeSlot, TimeWindow, TravelBuffer, UserPreferences, WorkingHours,
};
