use axum::http::StatusCode;
use axum::response::Json;
use compute::error::ComputeError;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::schemas::ErrorResponse;

pub mod accounts;
pub mod categories;
pub mod customer_payments;
pub mod customers;
pub mod health;
pub mod journal_entries;
pub mod products;
pub mod purchase_invoices;
pub mod reports;
pub mod sales_invoices;
pub mod stock_movements;
pub mod supplier_payments;
pub mod suppliers;
pub mod warehouses;

/// Validator hook for decimals that must be strictly positive (quantities,
/// amounts).
pub(crate) fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive"))
    }
}

/// Validator hook for decimals that must not be negative (prices, rates,
/// discounts, limits).
pub(crate) fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("non_negative"))
    }
}

/// Maps a recomputation failure onto an API error: a missing aggregate row
/// is the caller's 404, anything else is a 500.
pub(crate) fn compute_error_response(err: ComputeError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("NOT_FOUND", err.to_string())),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("DATABASE_ERROR", err.to_string())),
        )
    }
}

/// Standard 400 body for request validation failures.
pub(crate) fn validation_error_response(
    errors: validator::ValidationErrors,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("VALIDATION_ERROR", errors.to_string())),
    )
}

/// Standard 404 body for a missing row.
pub(crate) fn not_found_response(entity: &str, id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "NOT_FOUND",
            format!("{} {} not found", entity, id),
        )),
    )
}

/// Standard 409 body for document-status violations (illegal transitions,
/// edits to non-draft documents).
pub(crate) fn conflict_response(
    code: &str,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::CONFLICT, Json(ErrorResponse::new(code, message)))
}

/// Standard 500 body for unexpected database failures.
pub(crate) fn db_error_response(err: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("DATABASE_ERROR", err.to_string())),
    )
}
