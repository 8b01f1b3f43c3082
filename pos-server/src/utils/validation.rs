//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use axum::extract::{
    FromRequest, FromRequestParts, Path, Query, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: section, table, waiter, vendor, category, item, tag, group
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons (cancel reason, delete reason, spoilage notes)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, payment methods
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Largest accepted stock or order quantity
pub const MAX_QUANTITY: f64 = 1_000_000.0;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a money field (finite, ≥ 0)
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    crate::utils::money::require_non_negative(value, field).map_err(AppError::validation)
}

/// Validate a stock quantity (finite, > 0, bounded)
pub fn validate_positive_quantity(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be greater than 0, got {value}"
        )));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_QUANTITY}), got {value}"
        )));
    }
    Ok(())
}

// ── JSON extractor ──────────────────────────────────────────────────

/// `Json<T>` that reports malformed bodies as [`AppError::Validation`] (400)
///
/// ```ignore
/// async fn create(ValidJson(payload): ValidJson<SectionCreate>) -> AppResult<Json<Section>>
/// ```
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}

/// `Path<T>` with rejections reported as [`AppError::Validation`]
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ValidPath(value))
            .map_err(|rejection: PathRejection| AppError::validation(rejection.body_text()))
    }
}

/// `Query<T>` with rejections reported as [`AppError::Validation`]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ValidQuery(value))
            .map_err(|rejection: QueryRejection| AppError::validation(rejection.body_text()))
    }
}

/// Parse an optional JSON body; an empty body yields `T::default()`
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Patio", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_optional_json() {
        #[derive(Default, serde::Deserialize)]
        struct Body {
            reason: Option<String>,
        }
        assert!(optional_json::<Body>(b"").unwrap().reason.is_none());
        assert_eq!(
            optional_json::<Body>(br#"{"reason":"dup"}"#).unwrap().reason.as_deref(),
            Some("dup")
        );
        assert!(optional_json::<Body>(b"{").is_err());
    }

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(0.5, "quantity").is_ok());
        assert!(validate_positive_quantity(0.0, "quantity").is_err());
        assert!(validate_positive_quantity(-2.0, "quantity").is_err());
        assert!(validate_positive_quantity(f64::INFINITY, "quantity").is_err());
    }
}
