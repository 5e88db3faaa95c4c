//! Database repository for municipalities.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::handlers::{audit_set_clause, contains_pattern};
use crate::db::models::municipalities::{
    MunicipalityCreateDBRequest, MunicipalityDBResponse, MunicipalityUpdateDBRequest, MunicipalityUpsertDBRequest,
};
use crate::types::{MunicipalityId, RegionId, StateId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Locality search: name substring plus optional region and state scoping.
#[derive(Debug, Clone)]
pub struct MunicipalityFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring, trimmed. Blank means no filter.
    pub name: Option<String>,
    /// Matches through the municipality's state
    pub region_id: Option<RegionId>,
    pub state_id: Option<StateId>,
}

impl MunicipalityFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            name: None,
            region_id: None,
            state_id: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn region(mut self, region_id: RegionId) -> Self {
        self.region_id = Some(region_id);
        self
    }

    pub fn state(mut self, state_id: StateId) -> Self {
        self.state_id = Some(state_id);
        self
    }
}

const FILTER_FROM: &str = r#"
    FROM municipalities m
    LEFT JOIN states s ON s.id = m.state_id
    WHERE ($1::text IS NULL OR m.name ILIKE $1)
      AND ($2::int IS NULL OR s.region_id = $2)
      AND ($3::int IS NULL OR m.state_id = $3)
"#;

pub struct Municipalities<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Municipalities<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert the municipality or refresh name and state if the IBGE id already exists.
    #[instrument(skip(self, request), fields(municipality_id = request.id, state_id = ?request.state_id), err)]
    pub async fn upsert(&mut self, request: &MunicipalityUpsertDBRequest) -> Result<MunicipalityDBResponse> {
        let municipality = sqlx::query_as::<_, MunicipalityDBResponse>(
            r#"
            INSERT INTO municipalities (id, name, state_id, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                state_id = EXCLUDED.state_id,
                updated_at = NOW(),
                updated_by = EXCLUDED.updated_by
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.name)
        .bind(request.state_id)
        .bind(&request.actor)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(municipality)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Municipalities<'c> {
    type CreateRequest = MunicipalityCreateDBRequest;
    type UpdateRequest = MunicipalityUpdateDBRequest;
    type Response = MunicipalityDBResponse;
    type Id = MunicipalityId;
    type Filter = MunicipalityFilter;

    #[instrument(skip(self, request), fields(municipality_id = request.id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let municipality = sqlx::query_as::<_, MunicipalityDBResponse>(
            r#"
            INSERT INTO municipalities (id, state_id, name, mesh_url, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.state_id)
        .bind(&request.name)
        .bind(&request.mesh_url)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(municipality)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let municipality = sqlx::query_as::<_, MunicipalityDBResponse>("SELECT * FROM municipalities WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(municipality)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let municipalities = sqlx::query_as::<_, MunicipalityDBResponse>("SELECT * FROM municipalities WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(municipalities.into_iter().map(|m| (m.id, m)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip, state_id = ?filter.state_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!("SELECT m.* {FILTER_FROM} ORDER BY m.name, m.id LIMIT $4 OFFSET $5");
        let municipalities = sqlx::query_as::<_, MunicipalityDBResponse>(&sql)
            .bind(contains_pattern(filter.name.as_deref()))
            .bind(filter.region_id)
            .bind(filter.state_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(municipalities)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) {FILTER_FROM}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(contains_pattern(filter.name.as_deref()))
            .bind(filter.region_id)
            .bind(filter.state_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM municipalities WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE municipalities SET
                state_id = COALESCE($2, state_id),
                name = COALESCE($3, name),
                mesh_url = COALESCE($4, mesh_url),
                {}
            WHERE id = $1
            RETURNING *
            "#,
            audit_set_clause(5, 6)
        );

        let municipality = sqlx::query_as::<_, MunicipalityDBResponse>(&sql)
            .bind(id)
            .bind(request.state_id)
            .bind(&request.name)
            .bind(&request.mesh_url)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(municipality)
    }
}
