//! Contract error types for the POS service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use rust_decimal::Decimal;
use uuid::Uuid;

/// POS service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosError {
    /// Row missing, soft-deleted, or owned by another tenant
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (product, sale, store, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },

    /// Duplicate key or an illegal state transition
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Scope does not cover the requested store
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: Uuid,
        available: i64,
        requested: i64,
    },

    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Decimal, paid: Decimal },

    /// Storage or other infrastructure failure; the cause is logged, not exposed
    #[error("Internal error")]
    Internal,
}

impl PosError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
