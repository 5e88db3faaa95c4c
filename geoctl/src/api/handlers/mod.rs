//! HTTP request handlers for the admin API.
//!
//! Handlers acquire a connection from the pool, run one or more repositories against it and
//! convert database rows into API responses. Writes record the caller resolved by
//! [`CurrentActor`](crate::auth::CurrentActor) in the audit columns.

pub mod actions;
pub mod address_types;
pub mod addresses;
pub mod colors;
pub mod genders;
pub mod municipalities;
pub mod phone_types;
pub mod phones;
pub mod regions;
pub mod states;

use crate::db::errors::DbError;
use crate::errors::Error;

pub(crate) fn missing(resource: &str, id: impl ToString) -> Error {
    Error::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}

/// Map a repository update error, turning a missing row into a 404 for `resource`.
pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> impl FnOnce(DbError) -> Error {
    let id = id.to_string();
    move |err| match err {
        DbError::NotFound => Error::NotFound {
            resource: resource.to_string(),
            id,
        },
        other => other.into(),
    }
}
