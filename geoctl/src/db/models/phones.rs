use crate::db::models::AuditFields;
use crate::types::{Actor, PhoneId, PhoneTypeId};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct PhoneCreateDBRequest {
    pub type_ids: Vec<PhoneTypeId>,
    pub country: String,
    pub number: String,
    pub extension: String,
    pub created_by: Actor,
}

/// `type_ids`, when present, replaces the full set of linked phone types
#[derive(Debug, Clone, Default)]
pub struct PhoneUpdateDBRequest {
    pub type_ids: Option<Vec<PhoneTypeId>>,
    pub country: Option<String>,
    pub number: Option<String>,
    pub extension: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

#[derive(Debug, Clone, FromRow)]
pub struct PhoneDBResponse {
    pub id: PhoneId,
    pub type_ids: Vec<PhoneTypeId>,
    pub country: String,
    pub number: String,
    pub extension: String,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
