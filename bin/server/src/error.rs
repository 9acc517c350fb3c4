//! HTTP error responses.
//!
//! Handlers return [`ApiError`], which maps domain failures onto status codes
//! and small JSON bodies. Internal details are logged and never returned to
//! the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flock_authz::DenialReason;
use flock_platform_access::AuthorizationError;
use serde_json::json;
use std::fmt;

/// An error that can be turned into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// No valid session accompanied the request.
    Unauthenticated,
    /// The authorizer or a role check refused the request.
    Forbidden(DenialReason),
    /// The requested record does not exist.
    NotFound { resource: &'static str },
    /// The request body or parameters are invalid.
    BadRequest { message: String },
    /// The request conflicts with existing data.
    Conflict { message: String },
    /// Anything else. The details are logged, not returned.
    Internal { details: String },
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the JSON body sent to the client.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Unauthenticated => json!({ "error": "unauthenticated" }),
            Self::Forbidden(reason) => json!({ "error": "forbidden", "reason": reason.as_str() }),
            Self::NotFound { resource } => json!({ "error": "not_found", "resource": resource }),
            Self::BadRequest { message } => json!({ "error": "bad_request", "message": message }),
            Self::Conflict { message } => json!({ "error": "conflict", "message": message }),
            Self::Internal { .. } => json!({ "error": "internal" }),
        }
    }

    pub(crate) fn internal(details: impl fmt::Display) -> Self {
        Self::Internal {
            details: details.to_string(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::Forbidden(reason) => write!(f, "forbidden: {reason}"),
            Self::NotFound { resource } => write!(f, "{resource} not found"),
            Self::BadRequest { message } => write!(f, "bad request: {message}"),
            Self::Conflict { message } => write!(f, "conflict: {message}"),
            Self::Internal { details } => write!(f, "internal error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { details } => {
                tracing::error!(error = %details, "request failed");
            }
            Self::Forbidden(reason) => {
                tracing::debug!(%reason, "request forbidden");
            }
            _ => {}
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::NotAuthenticated => Self::Unauthenticated,
            other => Self::Forbidden(other.denial_reason()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return Self::bad_request("referenced record does not exist");
            }
            if db_err.is_unique_violation() {
                return Self::Conflict {
                    message: "record already exists".to_string(),
                };
            }
        }
        Self::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_is_401_with_fixed_body() {
        let err = ApiError::Unauthenticated;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body(), json!({ "error": "unauthenticated" }));
    }

    #[test]
    fn forbidden_reports_machine_readable_reason() {
        let cases = [
            (DenialReason::MisconfiguredScope, "misconfigured_scope"),
            (DenialReason::ScopeMismatch, "scope_mismatch"),
            (
                DenialReason::ForbiddenFieldAssignment,
                "forbidden_field_assignment",
            ),
            (
                DenialReason::InconsistentCoordinateChain,
                "inconsistent_coordinate_chain",
            ),
        ];

        for (reason, code) in cases {
            let err = ApiError::Forbidden(reason);
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
            assert_eq!(err.body(), json!({ "error": "forbidden", "reason": code }));
        }
    }

    #[test]
    fn not_found_names_the_resource() {
        let err = ApiError::NotFound { resource: "member" };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body()["resource"], "member");
        assert_eq!(err.to_string(), "member not found");
    }

    #[test]
    fn internal_details_are_not_returned() {
        let err = ApiError::internal("connection refused by 10.0.0.5");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body(), json!({ "error": "internal" }));
        assert!(err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn authorization_errors_map_to_denial_reasons() {
        let err = ApiError::from(AuthorizationError::AccessDenied {
            reason: DenialReason::InconsistentCoordinateChain,
        });
        assert_eq!(
            err.body(),
            json!({ "error": "forbidden", "reason": "inconsistent_coordinate_chain" })
        );

        let err = ApiError::from(AuthorizationError::NotAuthenticated);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn row_not_found_from_sqlx_is_internal() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn into_response_sets_status() {
        let response = ApiError::Forbidden(DenialReason::ScopeMismatch).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
