pub mod availability;

pub use availability::{AvailabilityService, SlotQuery};
