// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and a JSON error body.
/// Failures are logged where they happen and rendered here; nothing is retried.
#[derive(Error, Debug)]
pub enum TravelError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden access")]
    Forbidden,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Could not read AI plan: {0}")]
    AiResponseParse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

impl TravelError {
    fn code(&self) -> &'static str {
        match self {
            TravelError::NotFound(_) => "NOT_FOUND",
            TravelError::Conflict(_) => "CONFLICT",
            TravelError::DatabaseError(_) => "DATABASE_ERROR",
            TravelError::InvalidInput(_) => "INVALID_INPUT",
            TravelError::ValidationError(_) => "VALIDATION_ERROR",
            TravelError::Unauthorized(_) => "UNAUTHORIZED",
            TravelError::Forbidden => "FORBIDDEN",
            TravelError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            TravelError::AiResponseParse(_) => "AI_RESPONSE_PARSE_ERROR",
            TravelError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            TravelError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Convert TravelError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for TravelError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TravelError::NotFound(_) => StatusCode::NOT_FOUND,
            TravelError::Conflict(_) => StatusCode::CONFLICT,
            TravelError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TravelError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TravelError::ValidationError(_) => StatusCode::BAD_REQUEST,
            TravelError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TravelError::Forbidden => StatusCode::FORBIDDEN,
            TravelError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            TravelError::AiResponseParse(_) => StatusCode::BAD_GATEWAY,
            TravelError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            TravelError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<validator::ValidationErrors> for TravelError {
    fn from(e: validator::ValidationErrors) -> Self {
        TravelError::ValidationError(e.to_string())
    }
}

/// Map a sqlx error, turning unique violations into `Conflict`
pub fn db_error(context: &str, e: sqlx::Error) -> TravelError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            log::warn!("{}: unique violation", context);
            return TravelError::Conflict(context.to_string());
        }
    }
    log::error!("{}: {}", context, e);
    TravelError::DatabaseError(format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TravelError::NotFound("Place 1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TravelError::AiResponseParse("bad".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TravelError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = TravelError::Forbidden.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "FORBIDDEN");
        assert_eq!(value["error"]["message"], "Forbidden access");
        assert!(value["error"]["timestamp"].is_string());
    }

    #[derive(Debug)]
    struct PgFailure {
        code: &'static str,
    }

    impl std::fmt::Display for PgFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "postgres error {}", self.code)
        }
    }

    impl std::error::Error for PgFailure {}

    impl sqlx::error::DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.code.into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.code == "23505" {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    #[test]
    fn test_db_error_unique_violation_is_conflict() {
        let err = db_error(
            "Create review",
            sqlx::Error::Database(Box::new(PgFailure { code: "23505" })),
        );
        assert!(matches!(err, TravelError::Conflict(_)));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let other = db_error(
            "Create review",
            sqlx::Error::Database(Box::new(PgFailure { code: "23503" })),
        );
        assert!(matches!(other, TravelError::DatabaseError(_)));
    }

    #[test]
    fn test_db_error_row_not_found_is_database_error() {
        let err = db_error("Fetch place", sqlx::Error::RowNotFound);
        assert!(matches!(err, TravelError::DatabaseError(_)));
    }
}
