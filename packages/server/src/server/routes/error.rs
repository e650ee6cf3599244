//! HTTP mapping of service errors.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::common::{ServiceError, ValidationError};

/// `{success: false, error, fields?}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<&'static str>>,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Persistence { .. } | ServiceError::Fetch { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        }

        let fields = match &self {
            ServiceError::Validation(ValidationError::MissingFields(fields)) => Some(fields.clone()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}

/// Raw `Authorization` header, if any.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Parse a JSON body; an empty body reads as `{}`.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ValidationError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(
            ServiceError::from(ValidationError::UnknownStatus("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ServiceError::NotFound {
                entity: "submission",
                id: "x".into()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::persistence("submission", anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn empty_body_parses_as_empty_object() {
        let value: serde_json::Value = parse_json(b"  ").unwrap();
        assert_eq!(value, serde_json::json!({}));
        assert!(parse_json::<serde_json::Value>(b"{nope").is_err());
    }
}
