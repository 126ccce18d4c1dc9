//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::PosError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

impl From<PosError> for Problem {
    fn from(error: PosError) -> Self {
        map_domain_error(error)
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: PosError) -> Problem {
    match error {
        PosError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource))
                .with_detail(format!("{} with id '{}' was not found", resource, id))
        }

        PosError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        PosError::Validation { message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error").with_detail(message)
        }

        PosError::Forbidden { reason } => {
            Problem::new(StatusCode::FORBIDDEN, "Forbidden").with_detail(reason)
        }

        PosError::InsufficientStock {
            product_id,
            available,
            requested,
        } => Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Insufficient Stock").with_detail(
            format!(
                "product '{}' has {} on hand, {} requested",
                product_id, available, requested
            ),
        ),

        PosError::InsufficientPayment { total, paid } => {
            Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Insufficient Payment")
                .with_detail(format!("total is {}, paid {}", total, paid))
        }

        PosError::Internal => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (PosError::not_found("sale", Uuid::nil()), 404),
            (PosError::conflict("already voided"), 409),
            (PosError::validation("quantity must be positive"), 400),
            (
                PosError::Forbidden {
                    reason: "other store".to_string(),
                },
                403,
            ),
            (
                PosError::InsufficientStock {
                    product_id: Uuid::nil(),
                    available: 1,
                    requested: 3,
                },
                422,
            ),
            (
                PosError::InsufficientPayment {
                    total: Decimal::from(10),
                    paid: Decimal::from(5),
                },
                422,
            ),
            (PosError::Internal, 500),
        ];

        for (error, status) in cases {
            assert_eq!(map_domain_error(error).status, status);
        }
    }

    #[test]
    fn test_problem_serializes_type_field() {
        let problem = map_domain_error(PosError::not_found("product", "abc"));
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["type"], "https://httpstatuses.io/404");
        assert_eq!(json["title"], "product Not Found");
        assert!(json.get("instance").is_none());
    }
}
