use crate::db::models::AuditFields;
use crate::types::{Actor, RegionId, StateId};
use sqlx::FromRow;

/// Database request for creating a state by hand
#[derive(Debug, Clone)]
pub struct StateCreateDBRequest {
    pub id: StateId,
    pub region_id: Option<RegionId>,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    pub created_by: Actor,
}

/// Insert-or-refresh a state from an upstream payload. The region must already exist.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpsertDBRequest {
    pub id: StateId,
    pub abbreviation: String,
    pub name: String,
    pub region_id: Option<RegionId>,
    pub actor: Actor,
}

/// Database request for updating a state
#[derive(Debug, Clone, Default)]
pub struct StateUpdateDBRequest {
    pub region_id: Option<RegionId>,
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

/// Database response for a state
#[derive(Debug, Clone, FromRow)]
pub struct StateDBResponse {
    pub id: StateId,
    pub region_id: Option<RegionId>,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    pub flag_path: Option<String>,
    pub coat_of_arms_path: Option<String>,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
