//! Database repository for genders, keyed by abbreviation.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::audit_set_clause;
use crate::db::handlers::repository::Repository;
use crate::db::models::genders::{GenderCreateDBRequest, GenderDBResponse, GenderUpdateDBRequest};
use crate::types::GenderId;
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct GenderFilter {
    pub skip: i64,
    pub limit: i64,
}

impl GenderFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Genders<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Genders<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Genders<'c> {
    type CreateRequest = GenderCreateDBRequest;
    type UpdateRequest = GenderUpdateDBRequest;
    type Response = GenderDBResponse;
    type Id = GenderId;
    type Filter = GenderFilter;

    #[instrument(skip(self, request), fields(abbreviation = %request.abbreviation), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let gender = sqlx::query_as::<_, GenderDBResponse>(
            r#"
            INSERT INTO genders (abbreviation, name, description, image_path, icon_path, color_id, created_by, updated_by)
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

        Ok(gender)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let gender = sqlx::query_as::<_, GenderDBResponse>("SELECT * FROM genders WHERE abbreviation = $1")
            .bind(&id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(gender)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let genders = sqlx::query_as::<_, GenderDBResponse>("SELECT * FROM genders WHERE abbreviation = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(genders.into_iter().map(|g| (g.abbreviation.clone(), g)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let genders = sqlx::query_as::<_, GenderDBResponse>("SELECT * FROM genders ORDER BY name, abbreviation LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(genders)
    }

    #[instrument(skip(self, _filter), err)]
    async fn count(&mut self, _filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genders")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM genders WHERE abbreviation = $1")
            .bind(&id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE genders SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_path = COALESCE($4, image_path),
                icon_path = COALESCE($5, icon_path),
                color_id = COALESCE($6, color_id),
                {}
            WHERE abbreviation = $1
            RETURNING *
            "#,
            audit_set_clause(7, 8)
        );

        let gender = sqlx::query_as::<_, GenderDBResponse>(&sql)
            .bind(&id)
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

        Ok(gender)
    }
}
