use crate::db::errors::DbError;
use crate::sync::SyncError;
use crate::sync::state_images::ImageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Actor header required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Locality synchronization error
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// State image download or storage error
    #[error(transparent)]
    Images(#[from] ImageError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn db_status_code(db_err: &DbError) -> StatusCode {
    match db_err {
        DbError::NotFound => StatusCode::NOT_FOUND,
        DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
        DbError::ForeignKeyViolation { .. } => StatusCode::CONFLICT,
        DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
        DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message and resource name for a unique violation, keyed on table and constraint
fn unique_violation_details(table: Option<&str>, constraint: Option<&str>) -> (String, &'static str) {
    match (table, constraint) {
        (Some("regions"), _) => ("A region with this IBGE code already exists".to_string(), "region"),
        (Some("states"), _) => ("A state with this IBGE code already exists".to_string(), "state"),
        (Some("municipalities"), _) => ("A municipality with this IBGE code already exists".to_string(), "municipality"),
        (Some("genders"), _) => ("A gender with this abbreviation already exists".to_string(), "gender"),
        (Some("address_types"), Some("address_types_abbreviation_unique")) => {
            ("An address type with this abbreviation already exists".to_string(), "address_type")
        }
        (Some("addresses"), Some("addresses_location_unique")) => {
            ("An address with this street, number, municipality and postal code already exists".to_string(), "address")
        }
        (Some("phones"), Some("phones_number_unique")) => ("A phone with this country and number already exists".to_string(), "phone"),
        _ => ("Resource already exists".to_string(), "unknown"),
    }
}

fn db_user_message(db_err: &DbError) -> String {
    match db_err {
        DbError::NotFound => "Resource not found".to_string(),
        DbError::UniqueViolation { constraint, table, .. } => unique_violation_details(table.as_deref(), constraint.as_deref()).0,
        DbError::ForeignKeyViolation { message, .. } => {
            // Postgres phrases the two directions differently
            if message.starts_with("update or delete") {
                "Cannot delete a record that is still referenced by other records".to_string()
            } else {
                "Invalid reference to related resource".to_string()
            }
        }
        DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
        DbError::Other(_) => "Database error occurred".to_string(),
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => db_status_code(db_err),
            Error::Sync(sync_err) => match sync_err {
                SyncError::Transport { .. } => StatusCode::BAD_GATEWAY,
                SyncError::Validation { .. } => StatusCode::BAD_REQUEST,
                SyncError::Database(db_err) => db_status_code(db_err),
            },
            Error::Images(image_err) => match image_err {
                ImageError::NotConfigured { .. } | ImageError::MissingAbbreviation { .. } => StatusCode::BAD_REQUEST,
                ImageError::Download { .. } => StatusCode::BAD_GATEWAY,
                ImageError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                ImageError::Database(db_err) => db_status_code(db_err),
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => db_user_message(db_err),
            Error::Sync(sync_err) => match sync_err {
                SyncError::Transport { level, .. } => format!("Could not fetch {level} from IBGE"),
                SyncError::Validation { .. } => sync_err.to_string(),
                SyncError::Database(db_err) => db_user_message(db_err),
            },
            Error::Images(image_err) => match image_err {
                ImageError::NotConfigured { .. } | ImageError::MissingAbbreviation { .. } | ImageError::Download { .. } => image_err.to_string(),
                ImageError::Io { .. } => "Internal server error".to_string(),
                ImageError::Database(db_err) => db_user_message(db_err),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_))
            | Error::Sync(SyncError::Database(DbError::Other(_)))
            | Error::Images(ImageError::Io { .. })
            | Error::Images(ImageError::Database(DbError::Other(_)))
            | Error::Internal { .. }
            | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::Sync(SyncError::Database(_)) | Error::Images(ImageError::Database(_)) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Sync(SyncError::Transport { .. }) | Error::Images(ImageError::Download { .. }) => {
                tracing::warn!("Upstream error: {:#}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Sync(_) | Error::Images(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            Error::Database(DbError::UniqueViolation { constraint, table, .. })
            | Error::Sync(SyncError::Database(DbError::UniqueViolation { constraint, table, .. })) => {
                let (message, resource) = unique_violation_details(table.as_deref(), constraint.as_deref());
                let body = json!({
                    "message": message,
                    "resource": resource
                });

                (status, axum::response::Json(body)).into_response()
            }
            _ => {
                let user_message = self.user_message();
                (status, user_message).into_response()
            }
        }
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::localities::FetchError;
    use crate::types::Level;

    #[test]
    fn test_sync_errors_map_to_status() {
        let transport = Error::Sync(SyncError::Transport {
            level: Level::States,
            source: FetchError::Status {
                url: "https://ibge.example/estados".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            },
        });
        assert_eq!(transport.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(transport.user_message(), "Could not fetch states from IBGE");

        let validation = Error::Sync(SyncError::Validation {
            level: Level::Municipalities,
            message: "missing id".to_string(),
        });
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert!(validation.user_message().contains("missing id"));
    }

    #[test]
    fn test_state_without_abbreviation_is_bad_request() {
        let err = Error::Images(ImageError::MissingAbbreviation { state_id: 99 });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "state 99 has no abbreviation to name its images after");
    }

    #[test]
    fn test_foreign_key_violation_is_conflict() {
        let err = Error::Database(DbError::ForeignKeyViolation {
            constraint: Some("states_region_id_fkey".to_string()),
            table: Some("states".to_string()),
            message: "update or delete on table \"regions\" violates foreign key constraint".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.user_message().starts_with("Cannot delete"));
    }

    #[test]
    fn test_unique_violation_message() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: Some("phones_number_unique".to_string()),
            table: Some("phones".to_string()),
            message: String::new(),
            conflicting_value: None,
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "A phone with this country and number already exists");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = Error::Internal {
            operation: "connect to postgres at 10.0.0.1".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
    }
}
