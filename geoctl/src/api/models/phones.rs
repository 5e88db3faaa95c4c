//! API request/response models for phones.

use super::AuditInfo;
use super::pagination::Pagination;
use crate::db::models::phones::{PhoneCreateDBRequest, PhoneDBResponse, PhoneUpdateDBRequest};
use crate::errors::Result;
use crate::types::{Actor, PhoneId, PhoneTypeId};
use crate::validation;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListPhonesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// `BR` or `US`
    pub country: Option<String>,
}

fn default_country() -> String {
    "BR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhoneCreate {
    #[serde(default)]
    pub type_ids: Vec<PhoneTypeId>,
    #[serde(default = "default_country")]
    #[schema(example = "BR")]
    pub country: String,
    /// Digits only, area code included
    #[schema(example = "11987654321")]
    pub number: String,
    #[serde(default)]
    pub extension: String,
}

impl PhoneCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<PhoneCreateDBRequest> {
        Ok(PhoneCreateDBRequest {
            type_ids: self.type_ids,
            country: validation::phone_country(&self.country)?,
            number: validation::phone_number(&self.number)?,
            extension: self.extension.trim().to_string(),
            created_by: actor,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PhoneUpdate {
    pub type_ids: Option<Vec<PhoneTypeId>>,
    pub country: Option<String>,
    pub number: Option<String>,
    pub extension: Option<String>,
    pub is_active: Option<bool>,
}

impl PhoneUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<PhoneUpdateDBRequest> {
        Ok(PhoneUpdateDBRequest {
            type_ids: self.type_ids,
            country: validation::optional(self.country.as_deref(), validation::phone_country)?,
            number: validation::optional(self.number.as_deref(), validation::phone_number)?,
            extension: self.extension,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhoneResponse {
    pub id: PhoneId,
    pub type_ids: Vec<PhoneTypeId>,
    pub country: String,
    pub number: String,
    pub extension: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<PhoneDBResponse> for PhoneResponse {
    fn from(db: PhoneDBResponse) -> Self {
        Self {
            id: db.id,
            type_ids: db.type_ids,
            country: db.country,
            number: db.number,
            extension: db.extension,
            audit: db.audit.into(),
        }
    }
}
