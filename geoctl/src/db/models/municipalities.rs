use crate::db::models::AuditFields;
use crate::types::{Actor, MunicipalityId, StateId};
use sqlx::FromRow;

/// Database request for creating a municipality by hand
#[derive(Debug, Clone)]
pub struct MunicipalityCreateDBRequest {
    pub id: MunicipalityId,
    pub state_id: Option<StateId>,
    pub name: String,
    pub mesh_url: String,
    pub created_by: Actor,
}

/// Insert-or-refresh a municipality from an upstream payload. `state_id` is `None` when the
/// payload carried no state reference at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityUpsertDBRequest {
    pub id: MunicipalityId,
    pub name: String,
    pub state_id: Option<StateId>,
    pub actor: Actor,
}

/// Database request for updating a municipality
#[derive(Debug, Clone, Default)]
pub struct MunicipalityUpdateDBRequest {
    pub state_id: Option<StateId>,
    pub name: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

/// Database response for a municipality
#[derive(Debug, Clone, FromRow)]
pub struct MunicipalityDBResponse {
    pub id: MunicipalityId,
    pub state_id: Option<StateId>,
    pub name: String,
    pub mesh_url: String,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
