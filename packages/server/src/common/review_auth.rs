use crate::common::ServiceError;

/// Bearer-token check for moderation endpoints.
///
/// With no secret configured every request is rejected.
#[derive(Clone, Default)]
pub struct ReviewAuthorizer {
    token: Option<String>,
}

impl ReviewAuthorizer {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    /// Check a raw `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ServiceError> {
        let expected = self.token.as_deref().ok_or(ServiceError::Unauthorized)?;
        let presented = authorization
            .and_then(bearer_token)
            .ok_or(ServiceError::Unauthorized)?;

        if presented == expected {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for ReviewAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewAuthorizer")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}
