//! API request/response models for colors.

use super::AuditInfo;
use crate::db::models::colors::{ColorCreateDBRequest, ColorDBResponse, ColorUpdateDBRequest};
use crate::errors::Result;
use crate::types::{Actor, ColorId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColorCreate {
    #[schema(example = "Azul")]
    pub name: String,
    /// Hex code, at most seven characters
    #[schema(example = "#1E90FF")]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl ColorCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<ColorCreateDBRequest> {
        Ok(ColorCreateDBRequest {
            name: validation::name(&self.name)?,
            code: validation::color_code(&self.code)?,
            description: self.description,
            created_by: actor,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ColorUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ColorUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<ColorUpdateDBRequest> {
        Ok(ColorUpdateDBRequest {
            name: validation::optional(self.name.as_deref(), validation::name)?,
            code: validation::optional(self.code.as_deref(), validation::color_code)?,
            description: self.description,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColorResponse {
    pub id: ColorId,
    pub name: String,
    pub code: String,
    pub description: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<ColorDBResponse> for ColorResponse {
    fn from(db: ColorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            code: db.code,
            description: db.description,
            audit: db.audit.into(),
        }
    }
}
