//! API request/response models for regions.

use super::AuditInfo;
use super::pagination::Pagination;
use crate::db::models::regions::{RegionCreateDBRequest, RegionDBResponse, RegionUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Actor, RegionId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing regions
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListRegionsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on name or abbreviation
    pub search: Option<String>,
}

/// Request body for creating a region by hand. The id is the IBGE code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionCreate {
    #[schema(example = 3)]
    pub id: RegionId,
    #[schema(example = "SE")]
    #[serde(default)]
    pub abbreviation: String,
    #[schema(example = "Sudeste")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mesh_url: String,
}

impl RegionCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<RegionCreateDBRequest> {
        if self.id <= 0 {
            return Err(Error::BadRequest {
                message: "Region id must be a positive IBGE code".to_string(),
            });
        }
        Ok(RegionCreateDBRequest {
            id: self.id,
            abbreviation: self.abbreviation.trim().to_uppercase(),
            name: validation::name(&self.name)?,
            description: self.description,
            mesh_url: self.mesh_url,
            created_by: actor,
        })
    }
}

/// Partial update. Omitted fields are left unchanged; `is_active: false` soft-deletes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegionUpdate {
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub mesh_url: Option<String>,
    pub is_active: Option<bool>,
}

impl RegionUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<RegionUpdateDBRequest> {
        Ok(RegionUpdateDBRequest {
            abbreviation: self.abbreviation.map(|a| a.trim().to_uppercase()),
            name: validation::optional(self.name.as_deref(), validation::name)?,
            description: self.description,
            mesh_url: self.mesh_url,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionResponse {
    pub id: RegionId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub mesh_url: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<RegionDBResponse> for RegionResponse {
    fn from(db: RegionDBResponse) -> Self {
        Self {
            id: db.id,
            abbreviation: db.abbreviation,
            name: db.name,
            description: db.description,
            mesh_url: db.mesh_url,
            audit: db.audit.into(),
        }
    }
}
