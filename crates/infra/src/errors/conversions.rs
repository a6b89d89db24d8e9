//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use storefront_domain::StorefrontError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StorefrontError);

impl From<InfraError> for StorefrontError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StorefrontError> for InfraError {
    fn from(value: StorefrontError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoStorefrontError {
    fn into_storefront(self) -> StorefrontError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → StorefrontError */
/* -------------------------------------------------------------------------- */

impl IntoStorefrontError for SqlError {
    fn into_storefront(self) -> StorefrontError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        StorefrontError::StoreUnavailable("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        StorefrontError::StoreUnavailable("database is locked".into())
                    }
                    (ErrorCode::CannotOpen, _) => {
                        StorefrontError::StoreUnavailable(format!("cannot open database: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        StorefrontError::Conflict(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        StorefrontError::Conflict("foreign key constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 275) => {
                        StorefrontError::InvalidInput(format!("check constraint failed: {message}"))
                    }
                    _ => StorefrontError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => StorefrontError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                StorefrontError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                StorefrontError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::Utf8Error(_) => {
                StorefrontError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                StorefrontError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => StorefrontError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => StorefrontError::Database("invalid SQL query".into()),
            other => StorefrontError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_storefront())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → StorefrontError */
/* -------------------------------------------------------------------------- */

impl IntoStorefrontError for r2d2::Error {
    fn into_storefront(self) -> StorefrontError {
        StorefrontError::StoreUnavailable(format!("no database connection available: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_storefront())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → StorefrontError */
/* -------------------------------------------------------------------------- */

impl IntoStorefrontError for serde_json::Error {
    fn into_storefront(self) -> StorefrontError {
        StorefrontError::Database(format!("malformed JSON column: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_storefront())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → StorefrontError */
/* -------------------------------------------------------------------------- */

/// Map a failed `spawn_blocking` join into a domain error.
pub fn map_join_error(err: JoinError) -> StorefrontError {
    if err.is_cancelled() {
        StorefrontError::Internal("blocking store task cancelled".into())
    } else {
        StorefrontError::Internal(format!("blocking store task failed: {err}"))
    }
}

/// Shorthand for `?` on rusqlite results inside blocking closures.
pub fn map_sql_error(err: SqlError) -> StorefrontError {
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
