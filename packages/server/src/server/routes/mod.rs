// HTTP route handlers
pub mod error;
pub mod health;
pub mod members;
pub mod registrations;
pub mod submissions;
pub mod webhooks;

pub use error::ErrorBody;
pub use health::*;
pub use members::*;
pub use registrations::*;
pub use submissions::*;
pub use webhooks::*;
