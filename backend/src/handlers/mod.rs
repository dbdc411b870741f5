pub mod availability;
pub mod health;
pub mod locations;
pub mod templates;
