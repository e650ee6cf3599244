//! Error taxonomy shared by every domain.
//!
//! `ServiceError` is what a caller sees. `IntegrationError` never reaches a
//! caller: fan-out steps hand it back as a value and the caller logs it.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Cannot move a submission from {from} back to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Failed to persist {entity}")]
    Persistence {
        entity: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A read against a system of record failed.
    #[error("Failed to fetch {entity}")]
    Fetch {
        entity: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn persistence(entity: &'static str, source: anyhow::Error) -> Self {
        Self::Persistence { entity, source }
    }

    pub fn fetch(entity: &'static str, source: anyhow::Error) -> Self {
        Self::Fetch { entity, source }
    }
}

/// Non-critical system touched after the authoritative write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    Crm,
    Notification,
    RebuildHook,
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Integration::Crm => "crm",
            Integration::Notification => "notification",
            Integration::RebuildHook => "rebuild-hook",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{integration} integration failed: {source}")]
pub struct IntegrationError {
    pub integration: Integration,
    #[source]
    pub source: anyhow::Error,
}

impl IntegrationError {
    pub fn new(integration: Integration, source: anyhow::Error) -> Self {
        Self {
            integration,
            source,
        }
    }
}
