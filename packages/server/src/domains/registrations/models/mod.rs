pub mod registration;

pub use registration::{EventRegistration, REGISTRATIONS_TABLE};
