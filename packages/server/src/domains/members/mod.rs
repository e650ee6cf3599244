//! Member domain - community sign-ups
//!
//! The CRM `Members` table is the system of record. New members are announced
//! on the introductions channel.

pub mod activities;
pub mod models;

pub use models::member::Member;
