//! Slot computation: candidate windows, constraint filtering, venues.
//!
//! Everything in here is synchronous and free of I/O. The availability
//! service feeds it provider data and the current instant.

pub mod candidates;
pub mod filter;
pub mod location;
pub mod templates;

pub use candidates::{default_dayparts, CandidateGenerator};
pub use filter::{restrict_to_working_hours, ConstraintFilter, SlotRequirements};
pub use location::VenueCatalog;
pub use templates::TemplateCatalog;
