// Common types and utilities shared across the application

pub mod confirmation;
pub mod errors;
pub mod review_auth;
pub mod timestamps;

pub use confirmation::{generate_code, EVENT_REGISTRATION_PREFIX, MEMBER_PREFIX};
pub use errors::{Integration, IntegrationError, ServiceError, ValidationError};
pub use review_auth::ReviewAuthorizer;
pub use timestamps::format_timestamp;
