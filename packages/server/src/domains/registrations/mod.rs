//! Event registration domain
//!
//! Stored in the CRM `EventRegistrations` table and announced on the events
//! channel.

pub mod activities;
pub mod models;

pub use models::EventRegistration;
