use crate::db::models::AuditFields;
use crate::types::{Actor, RegionId};
use sqlx::FromRow;

/// Database request for creating a region by hand
#[derive(Debug, Clone)]
pub struct RegionCreateDBRequest {
    pub id: RegionId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    pub created_by: Actor,
}

/// Insert-or-refresh a region from an upstream payload, keyed by its IBGE id
#[derive(Debug, Clone, PartialEq)]
pub struct RegionUpsertDBRequest {
    pub id: RegionId,
    pub abbreviation: String,
    pub name: String,
    pub actor: Actor,
}

/// Database request for updating a region
#[derive(Debug, Clone, Default)]
pub struct RegionUpdateDBRequest {
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

/// Database response for a region
#[derive(Debug, Clone, FromRow)]
pub struct RegionDBResponse {
    pub id: RegionId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
