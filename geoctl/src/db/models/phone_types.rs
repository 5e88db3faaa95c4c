use crate::db::models::AuditFields;
use crate::types::{Actor, ColorId, PhoneTypeId};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct PhoneTypeCreateDBRequest {
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    pub created_by: Actor,
}

#[derive(Debug, Clone, Default)]
pub struct PhoneTypeUpdateDBRequest {
    pub abbreviation: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: Option<ColorId>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

#[derive(Debug, Clone, FromRow)]
pub struct PhoneTypeDBResponse {
    pub id: PhoneTypeId,
    pub abbreviation: String,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
