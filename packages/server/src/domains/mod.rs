// Business domains
pub mod members;
pub mod registrations;
pub mod submissions;
