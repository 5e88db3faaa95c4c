//! Database record models matching table schemas.
//!
//! These structs correspond to table rows and are what repositories accept and return. They are
//! kept apart from the API models so storage and wire representations can evolve independently.
//!
//! # Model Categories
//!
//! ## Locality hierarchy (IBGE keyed)
//!
//! - [`regions`]: Macro regions (Norte, Nordeste, ...)
//! - [`states`]: Federative units, with flag and coat of arms paths
//! - [`municipalities`]: Municipalities
//!
//! ## Reference data
//!
//! - [`colors`], [`genders`], [`phone_types`], [`address_types`]
//! - [`addresses`], [`phones`]: contact records linked to many types
//!
//! Every table carries the same audit columns, mapped by [`AuditFields`].

use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub mod address_types;
pub mod addresses;
pub mod colors;
pub mod genders;
pub mod municipalities;
pub mod phone_types;
pub mod phones;
pub mod regions;
pub mod states;

/// Audit and soft-delete columns present on every table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub is_active: bool,
}
