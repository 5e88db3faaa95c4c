//! Database repository for phone types.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::audit_set_clause;
use crate::db::handlers::repository::Repository;
use crate::db::models::phone_types::{PhoneTypeCreateDBRequest, PhoneTypeDBResponse, PhoneTypeUpdateDBRequest};
use crate::types::PhoneTypeId;
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct PhoneTypeFilter {
    pub skip: i64,
    pub limit: i64,
}

impl PhoneTypeFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct PhoneTypes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PhoneTypes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for PhoneTypes<'c> {
    type CreateRequest = PhoneTypeCreateDBRequest;
    type UpdateRequest = PhoneTypeUpdateDBRequest;
    type Response = PhoneTypeDBResponse;
    type Id = PhoneTypeId;
    type Filter = PhoneTypeFilter;

    #[instrument(skip(self, request), fields(abbreviation = %request.abbreviation), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, PhoneTypeDBResponse>(
            r#"
            INSERT INTO phone_types (abbreviation, name, description, image_path, icon_path, color_id, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(&request.abbreviation)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.image_path)
        .bind(&request.icon_path)
        .bind(request.color_id)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, PhoneTypeDBResponse>("SELECT * FROM phone_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PhoneTypeDBResponse>("SELECT * FROM phone_types WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.id, r)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, PhoneTypeDBResponse>("SELECT * FROM phone_types ORDER BY name, id LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows)
    }

    #[instrument(skip(self, _filter), err)]
    async fn count(&mut self, _filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM phone_types")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM phone_types WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE phone_types SET
                abbreviation = COALESCE($2, abbreviation),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                image_path = COALESCE($5, image_path),
                icon_path = COALESCE($6, icon_path),
                color_id = COALESCE($7, color_id),
                {}
            WHERE id = $1
            RETURNING *
            "#,
            audit_set_clause(8, 9)
        );

        let row = sqlx::query_as::<_, PhoneTypeDBResponse>(&sql)
            .bind(id)
            .bind(&request.abbreviation)
            .bind(&request.name)
            .bind(&request.description)
            .bind(&request.image_path)
            .bind(&request.icon_path)
            .bind(request.color_id)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(row)
    }
}
