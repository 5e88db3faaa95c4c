//! API request/response models for states.

use super::AuditInfo;
use super::pagination::Pagination;
use crate::db::models::states::{StateCreateDBRequest, StateDBResponse, StateUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Actor, RegionId, StateId};
use crate::validation;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing states
#[serde_as]
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListStatesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only states of this region (cascading dropdowns)
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub region_id: Option<RegionId>,

    /// Case-insensitive substring match on name or abbreviation
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateCreate {
    #[schema(example = 35)]
    pub id: StateId,
    #[schema(example = 3)]
    pub region_id: Option<RegionId>,
    /// Two letters; trimmed and uppercased
    #[schema(example = "SP")]
    pub abbreviation: String,
    #[schema(example = "São Paulo")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mesh_url: String,
}

impl StateCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<StateCreateDBRequest> {
        if self.id <= 0 {
            return Err(Error::BadRequest {
                message: "State id must be a positive IBGE code".to_string(),
            });
        }
        Ok(StateCreateDBRequest {
            id: self.id,
            region_id: self.region_id,
            abbreviation: validation::state_abbreviation(&self.abbreviation)?,
            name: validation::name(&self.name)?,
            description: self.description,
            mesh_url: self.mesh_url,
            created_by: actor,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StateUpdate {
    pub region_id: Option<RegionId>,
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
}

impl StateUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<StateUpdateDBRequest> {
        Ok(StateUpdateDBRequest {
            region_id: self.region_id,
            abbreviation: validation::optional(self.abbreviation.as_deref(), validation::state_abbreviation)?,
            name: validation::optional(self.name.as_deref(), validation::name)?,
            description: self.description,
            mesh_url: self.mesh_url,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    pub id: StateId,
    pub region_id: Option<RegionId>,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    /// Flag image path relative to the media root
    pub flag_path: Option<String>,
    /// Coat of arms image path relative to the media root
    pub coat_of_arms_path: Option<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<StateDBResponse> for StateResponse {
    fn from(db: StateDBResponse) -> Self {
        Self {
            id: db.id,
            region_id: db.region_id,
            abbreviation: db.abbreviation,
            name: db.name,
            description: db.description,
            mesh_url: db.mesh_url,
            flag_path: db.flag_path,
            coat_of_arms_path: db.coat_of_arms_path,
            audit: db.audit.into(),
        }
    }
}
