// Design Gallery - API Core
//
// Backend for the design gallery: accepts design-system submissions, keeps the
// CMS as the system of record, and mirrors every change into the CRM, the
// community chat and the static-site build hook.
//
// Domains are organized under domains/*/ with models and activities.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
