//! API request/response models for addresses.

use super::AuditInfo;
use super::pagination::Pagination;
use crate::db::models::addresses::{AddressCreateDBRequest, AddressDBResponse, AddressUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Actor, AddressId, AddressTypeId, MunicipalityId};
use crate::validation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

#[serde_as]
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListAddressesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub municipality_id: Option<MunicipalityId>,
}

fn area_code(value: Option<i32>) -> Result<Option<i32>> {
    match value {
        Some(code) if code < 0 => Err(Error::BadRequest {
            message: "Area code cannot be negative".to_string(),
        }),
        other => Ok(other),
    }
}

fn notes(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::Object(_) => Ok(value),
        _ => Err(Error::BadRequest {
            message: "Notes must be a JSON object".to_string(),
        }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressCreate {
    /// Address type ids (residential, commercial, ...)
    #[serde(default)]
    pub type_ids: Vec<AddressTypeId>,
    #[schema(example = "Avenida Paulista")]
    pub street: String,
    #[serde(default)]
    pub complement: String,
    #[schema(example = "1578")]
    pub number: String,
    #[schema(example = "Bela Vista")]
    pub district: String,
    #[schema(example = 3550308)]
    pub municipality_id: MunicipalityId,
    /// CEP, `12345-678` or `12345678`
    #[schema(example = "01310-200")]
    pub postal_code: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub area_code: Option<i32>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub notes: Value,
}

impl AddressCreate {
    pub fn into_db_request(self, actor: Actor) -> Result<AddressCreateDBRequest> {
        Ok(AddressCreateDBRequest {
            type_ids: self.type_ids,
            street: validation::name(&self.street)?,
            complement: self.complement,
            number: self.number.trim().to_string(),
            district: self.district.trim().to_string(),
            municipality_id: self.municipality_id,
            postal_code: validation::postal_code(&self.postal_code)?,
            longitude: self.longitude,
            latitude: self.latitude,
            area_code: area_code(self.area_code)?,
            notes: notes(self.notes)?,
            created_by: actor,
        })
    }
}

/// Partial update. `type_ids`, when present, replaces the whole set of links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddressUpdate {
    pub type_ids: Option<Vec<AddressTypeId>>,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub municipality_id: Option<MunicipalityId>,
    pub postal_code: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub area_code: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub notes: Option<Value>,
    pub is_active: Option<bool>,
}

impl AddressUpdate {
    pub fn into_db_request(self, actor: Actor) -> Result<AddressUpdateDBRequest> {
        Ok(AddressUpdateDBRequest {
            type_ids: self.type_ids,
            street: validation::optional(self.street.as_deref(), validation::name)?,
            complement: self.complement,
            number: self.number,
            district: self.district,
            municipality_id: self.municipality_id,
            postal_code: validation::optional(self.postal_code.as_deref(), validation::postal_code)?,
            longitude: self.longitude,
            latitude: self.latitude,
            area_code: area_code(self.area_code)?,
            notes: self.notes.map(notes).transpose()?,
            is_active: self.is_active,
            updated_by: actor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: AddressId,
    pub type_ids: Vec<AddressTypeId>,
    pub street: String,
    pub complement: String,
    pub number: String,
    pub district: String,
    pub municipality_id: MunicipalityId,
    pub postal_code: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub area_code: Option<i32>,
    #[schema(value_type = Object)]
    pub notes: Value,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl From<AddressDBResponse> for AddressResponse {
    fn from(db: AddressDBResponse) -> Self {
        Self {
            id: db.id,
            type_ids: db.type_ids,
            street: db.street,
            complement: db.complement,
            number: db.number,
            district: db.district,
            municipality_id: db.municipality_id,
            postal_code: db.postal_code,
            longitude: db.longitude,
            latitude: db.latitude,
            area_code: db.area_code,
            notes: db.notes,
            audit: db.audit.into(),
        }
    }
}
