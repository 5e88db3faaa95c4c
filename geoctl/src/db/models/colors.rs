use crate::db::models::AuditFields;
use crate::types::{Actor, ColorId};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct ColorCreateDBRequest {
    pub name: String,
    pub code: String,
    pub description: String,
    pub created_by: Actor,
}

#[derive(Debug, Clone, Default)]
pub struct ColorUpdateDBRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

#[derive(Debug, Clone, FromRow)]
pub struct ColorDBResponse {
    pub id: ColorId,
    pub name: String,
    pub code: String,
    pub description: String,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
