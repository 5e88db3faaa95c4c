//! API request/response models for phone types.

use super::AuditInfo;
use crate::db::models::phone_types::{PhoneTypeCreateDBRequest, PhoneTypeDBResponse, PhoneTypeUpdateDBRequest};
use crate::errors::Result;
use crate::types::{Actor, ColorId, PhoneTypeId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhoneTypeCreate {
    #[schema(example = "RES")]
    pub abbreviation: String,
    #[schema(example = "Residencial")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
}

impl PhoneTypeCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<PhoneTypeCreateDBRequest> {
        Ok(PhoneTypeCreateDBRequest {
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
pub struct PhoneTypeUpdate {
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: Option<ColorId>,
    pub is_active: Option<bool>,
}

impl PhoneTypeUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<PhoneTypeUpdateDBRequest> {
        Ok(PhoneTypeUpdateDBRequest {
            abbreviation: validation::optional(self.abbreviation.as_deref(), validation::abbreviation)?,
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
pub struct PhoneTypeResponse {
    pub id: PhoneTypeId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<PhoneTypeDBResponse> for PhoneTypeResponse {
    fn from(db: PhoneTypeDBResponse) -> Self {
        Self {
            id: db.id,
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
