use crate::db::models::AuditFields;
use crate::types::{Actor, AddressId, AddressTypeId, MunicipalityId};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct AddressCreateDBRequest {
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
    pub notes: serde_json::Value,
    pub created_by: Actor,
}

/// `type_ids`, when present, replaces the full set of linked address types
#[derive(Debug, Clone, Default)]
pub struct AddressUpdateDBRequest {
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
    pub notes: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

#[derive(Debug, Clone, FromRow)]
pub struct AddressDBResponse {
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
    pub notes: serde_json::Value,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
