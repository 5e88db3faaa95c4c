use crate::db::models::AuditFields;
use crate::types::{Actor, ColorId, GenderId};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct GenderCreateDBRequest {
    pub abbreviation: GenderId,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    pub created_by: Actor,
}

#[derive(Debug, Clone, Default)]
pub struct GenderUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: Option<ColorId>,
    pub is_active: Option<bool>,
    pub updated_by: Actor,
}

#[derive(Debug, Clone, FromRow)]
pub struct GenderDBResponse {
    pub abbreviation: GenderId,
    pub name: String,
    pub description: String,
    pub image_path: Option<String>,
    pub icon_path: Option<String>,
    pub color_id: ColorId,
    #[sqlx(flatten)]
    pub audit: AuditFields,
}
