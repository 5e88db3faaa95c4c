//! API request/response models for municipalities.

use super::AuditInfo;
use super::pagination::Pagination;
use crate::db::handlers::municipalities::MunicipalityFilter;
use crate::db::models::municipalities::{MunicipalityCreateDBRequest, MunicipalityDBResponse, MunicipalityUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Actor, MunicipalityId, RegionId, StateId};
use crate::validation;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Municipality search form. All criteria are optional and combined with AND.
#[serde_as]
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListMunicipalitiesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring of the name; blank is ignored
    pub name: Option<String>,

    /// Municipalities whose state belongs to this region
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub region_id: Option<RegionId>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub state_id: Option<StateId>,
}

impl ListMunicipalitiesQuery {
    pub fn to_filter(&self) -> MunicipalityFilter {
        let (skip, limit) = self.pagination.params();
        let mut filter = MunicipalityFilter::new(skip, limit);
        if let Some(name) = validation::search_term(self.name.as_deref()) {
            filter = filter.name(name);
        }
        if let Some(region_id) = self.region_id {
            filter = filter.region(region_id);
        }
        if let Some(state_id) = self.state_id {
            filter = filter.state(state_id);
        }
        filter
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MunicipalityCreate {
    #[schema(example = 3550308)]
    pub id: MunicipalityId,
    #[schema(example = 35)]
    pub state_id: Option<StateId>,
    #[schema(example = "São Paulo")]
    pub name: String,
    #[serde(default)]
    pub mesh_url: String,
}

impl MunicipalityCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<MunicipalityCreateDBRequest> {
        if self.id <= 0 {
            return Err(Error::BadRequest {
                message: "Municipality id must be a positive IBGE code".to_string(),
            });
        }
        Ok(MunicipalityCreateDBRequest {
            id: self.id,
            state_id: self.state_id,
            name: validation::name(&self.name)?,
            mesh_url: self.mesh_url,
            created_by: actor,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MunicipalityUpdate {
    pub state_id: Option<StateId>,
    pub name: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
}

impl MunicipalityUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<MunicipalityUpdateDBRequest> {
        Ok(MunicipalityUpdateDBRequest {
            state_id: self.state_id,
            name: validation::optional(self.name.as_deref(), validation::name)?,
            mesh_url: self.mesh_url,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MunicipalityResponse {
    pub id: MunicipalityId,
    pub state_id: Option<StateId>,
    pub name: String,
    pub mesh_url: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<MunicipalityDBResponse> for MunicipalityResponse {
    fn from(db: MunicipalityDBResponse) -> Self {
        Self {
            id: db.id,
            state_id: db.state_id,
            name: db.name,
            mesh_url: db.mesh_url,
            audit: db.audit.into(),
        }
    }
}
