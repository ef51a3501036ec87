//! Shared Diesel and pool error classification for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Broad failure class of a Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped; callers report the store as unavailable.
    Connection(&'static str),
    /// A unique constraint rejected a write.
    UniqueViolation { constraint: Option<String> },
    /// Anything else.
    Query(&'static str),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the driver detail at debug level only.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &'static str) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, operation, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error")
                }
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                },
                _ => DieselFailure::Query("database error"),
            }
        }
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        other => {
            debug!(operation, error = %other, "diesel operation failed");
            DieselFailure::Query("database error")
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound, "lookup"),
            DieselFailure::Query("record not found")
        );
    }

    #[rstest]
    fn unique_violation_keeps_constraint_name() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );
        // `String` as error information reports no constraint name.
        assert_eq!(
            classify_diesel_error(error, "insert"),
            DieselFailure::UniqueViolation { constraint: None }
        );
    }

    #[rstest]
    fn closed_connection_is_a_connection_failure() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert!(matches!(
            classify_diesel_error(error, "select"),
            DieselFailure::Connection(_)
        ));
    }

    #[rstest]
    fn pool_errors_yield_their_message() {
        assert_eq!(pool_error_message(PoolError::checkout("timed out")), "timed out");
    }
}
