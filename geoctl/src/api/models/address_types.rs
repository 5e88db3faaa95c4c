//! API request/response models for address types.

use super::AuditInfo;
use crate::db::models::address_types::{AddressTypeCreateDBRequest, AddressTypeDBResponse, AddressTypeUpdateDBRequest};
use crate::errors::Result;
use crate::types::{Actor, ColorId, AddressTypeId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressTypeCreate {
    #[schema(example = "COM")]
    pub abbreviation: String,
    #[schema(example = "Comercial")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
}

impl AddressTypeCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<AddressTypeCreateDBRequest> {
        Ok(AddressTypeCreateDBRequest {
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
pub struct AddressTypeUpdate {
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: Option<ColorId>,
    pub is_active: Option<bool>,
}

impl AddressTypeUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<AddressTypeUpdateDBRequest> {
        Ok(AddressTypeUpdateDBRequest {
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
pub struct AddressTypeResponse {
    pub id: AddressTypeId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<AddressTypeDBResponse> for AddressTypeResponse {
    fn from(db: AddressTypeDBResponse) -> Self {
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
