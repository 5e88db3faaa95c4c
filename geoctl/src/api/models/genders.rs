//! API request/response models for genders. Genders are keyed by their abbreviation.

use super::AuditInfo;
use crate::db::models::genders::{GenderCreateDBRequest, GenderDBResponse, GenderUpdateDBRequest};
use crate::errors::Result;
use crate::types::{Actor, ColorId, GenderId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenderCreate {
    /// Primary key, up to three characters
    #[schema(example = "F")]
    pub abbreviation: GenderId,
    #[schema(example = "Feminino")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
}

impl GenderCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<GenderCreateDBRequest> {
        Ok(GenderCreateDBRequest {
            abbreviation: validation::abbreviation(&self.abbreviation)?,
            name: validation::name(&self.name)?,
            description: self.description,
            image_path: self.image_path,
            icon_path: self.icon_path,
            color_id: self.color_id,
            created_by: actor,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenderUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: Option<ColorId>,
    pub is_active: Option<bool>,
}

impl GenderUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<GenderUpdateDBRequest> {
        Ok(GenderUpdateDBRequest {
            name: validation::optional(self.name.as_deref(), validation::name)?,
            description: self.description,
            image_path: self.image_path,
            icon_path: self.icon_path,
            color_id: self.color_id,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenderResponse {
    pub abbreviation: GenderId,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<GenderDBResponse> for GenderResponse {
    fn from(db: GenderDBResponse) -> Self {
        Self {
            abbreviation: db.abbreviation,
            name: db.name,
            description: db.description,
            image_path: db.image_path,
            icon_path: db.icon_path,
            color_id: db.color_id,
            audit: db.audit.into(),
        }
    }
}
