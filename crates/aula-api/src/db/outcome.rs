//! Stored-procedure outcome protocol
//!
//! Every write procedure reports its result through a conventional output
//! row: a numeric status code plus optional context columns. Zero means
//! success; the small family of nonzero codes signals specific business
//! conditions. The code -> meaning table is fixed and shared by every
//! entity, so callers interpret outcomes through this module rather than
//! re-deriving codes per feature.

use aula_core::AulaError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success.
pub const DB_API_OK: i32 = 0;
/// Duplicate value for a unique field; `dup_field_name` names the field.
pub const DB_API_DUPLICATE: i32 = 100;
/// Optimistic-concurrency mismatch (row version changed under us).
pub const DB_API_CONCURRENCY: i32 = 200;
/// A referenced row does not exist; `reference_table` names the table.
pub const DB_API_REFERENCE_MISSING: i32 = 300;
/// Business rule rejection (capacity exceeded and similar).
pub const DB_API_REJECTED: i32 = 500;

/// Output row read back from a stored-procedure call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct OperationResult {
    /// Conventional status code; zero is success.
    pub db_api_error: i32,

    /// Name of the unique field that collided, when `db_api_error == 100`.
    pub dup_field_name: Option<String>,

    /// Table of the missing referenced row, when `db_api_error == 300`.
    pub reference_table: Option<String>,

    /// Numeric key of the affected row, when the procedure returns one.
    pub id: Option<i64>,

    /// Surrogate key of the affected row, when the procedure returns one.
    pub guid: Option<Uuid>,
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        self.db_api_error == DB_API_OK
    }

    /// Translate a nonzero status into the error taxonomy.
    ///
    /// This is the fixed interpretation table; new codes must be added
    /// here, never inferred at call sites.
    pub fn into_error(self) -> AulaError {
        match self.db_api_error {
            DB_API_DUPLICATE => AulaError::Duplicate {
                field: self
                    .dup_field_name
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            DB_API_CONCURRENCY => AulaError::ConcurrencyConflict,
            DB_API_REFERENCE_MISSING => AulaError::NotFound(
                self.reference_table
                    .unwrap_or_else(|| "referenced row".to_string()),
            ),
            code => AulaError::BusinessRejection(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_code(code: i32) -> OperationResult {
        OperationResult {
            db_api_error: code,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_is_success() {
        assert!(result_with_code(DB_API_OK).is_success());
        assert!(!result_with_code(DB_API_DUPLICATE).is_success());
    }

    #[test]
    fn test_duplicate_carries_field_name() {
        let result = OperationResult {
            db_api_error: DB_API_DUPLICATE,
            dup_field_name: Some("email".to_string()),
            ..Default::default()
        };

        match result.into_error() {
            AulaError::Duplicate { field } => assert_eq!(field, "email"),
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrency_code_maps_to_conflict() {
        assert!(matches!(
            result_with_code(DB_API_CONCURRENCY).into_error(),
            AulaError::ConcurrencyConflict
        ));
    }

    #[test]
    fn test_missing_reference_maps_to_not_found() {
        let result = OperationResult {
            db_api_error: DB_API_REFERENCE_MISSING,
            reference_table: Some("roles".to_string()),
            ..Default::default()
        };

        match result.into_error() {
            AulaError::NotFound(table) => assert_eq!(table, "roles"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_codes_fall_back_to_rejection() {
        assert!(matches!(
            result_with_code(DB_API_REJECTED).into_error(),
            AulaError::BusinessRejection(500)
        ));
        assert!(matches!(
            result_with_code(742).into_error(),
            AulaError::BusinessRejection(742)
        ));
    }
}
