//! API request/response models.
//!
//! Request bodies validate and normalize their fields when converted to the matching
//! `db::models` request; responses are built `From` database rows.

use crate::db::models::AuditFields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod actions;
pub mod address_types;
pub mod addresses;
pub mod colors;
pub mod genders;
pub mod municipalities;
pub mod pagination;
pub mod phone_types;
pub mod phones;
pub mod regions;
pub mod states;

/// Audit trail and soft-delete state, flattened into every response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    /// False once soft-deleted with `PATCH {"is_active": false}`
    pub is_active: bool,
}

impl From<AuditFields> for AuditInfo {
    fn from(audit: AuditFields) -> Self {
        Self {
            created_at: audit.created_at,
            created_by: audit.created_by,
            updated_at: audit.updated_at,
            updated_by: audit.updated_by,
            deleted_at: audit.deleted_at,
            deleted_by: audit.deleted_by,
            is_active: audit.is_active,
        }
    }
}
