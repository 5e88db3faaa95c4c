//! Database repository for regions.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::handlers::{audit_set_clause, contains_pattern};
use crate::db::models::regions::{RegionCreateDBRequest, RegionDBResponse, RegionUpdateDBRequest, RegionUpsertDBRequest};
use crate::types::RegionId;
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing regions
#[derive(Debug, Clone)]
pub struct RegionFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive match against name or abbreviation
    pub search: Option<String>,
}

impl RegionFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

pub struct Regions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Regions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert the region or refresh abbreviation and name if the IBGE id already exists.
    #[instrument(skip(self, request), fields(region_id = request.id), err)]
    pub async fn upsert(&mut self, request: &RegionUpsertDBRequest) -> Result<RegionDBResponse> {
        let region = sqlx::query_as::<_, RegionDBResponse>(
            r#"
            INSERT INTO regions (id, abbreviation, name, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE SET
                abbreviation = EXCLUDED.abbreviation,
                name = EXCLUDED.name,
                updated_at = NOW(),
                updated_by = EXCLUDED.updated_by
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.abbreviation)
        .bind(&request.name)
        .bind(&request.actor)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(region)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Regions<'c> {
    type CreateRequest = RegionCreateDBRequest;
    type UpdateRequest = RegionUpdateDBRequest;
    type Response = RegionDBResponse;
    type Id = RegionId;
    type Filter = RegionFilter;

    #[instrument(skip(self, request), fields(region_id = request.id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let region = sqlx::query_as::<_, RegionDBResponse>(
            r#"
            INSERT INTO regions (id, abbreviation, name, description, mesh_url, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.abbreviation)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.mesh_url)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(region)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let region = sqlx::query_as::<_, RegionDBResponse>("SELECT * FROM regions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(region)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let regions = sqlx::query_as::<_, RegionDBResponse>("SELECT * FROM regions WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(regions.into_iter().map(|r| (r.id, r)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let regions = sqlx::query_as::<_, RegionDBResponse>(
            r#"
            SELECT * FROM regions
            WHERE ($1::text IS NULL OR name ILIKE $1 OR abbreviation ILIKE $1)
            ORDER BY name, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(contains_pattern(filter.search.as_deref()))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(regions)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM regions WHERE ($1::text IS NULL OR name ILIKE $1 OR abbreviation ILIKE $1)",
        )
        .bind(contains_pattern(filter.search.as_deref()))
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE regions SET
                abbreviation = COALESCE($2, abbreviation),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                mesh_url = COALESCE($5, mesh_url),
                {}
            WHERE id = $1
            RETURNING *
            "#,
            audit_set_clause(6, 7)
        );

        let region = sqlx::query_as::<_, RegionDBResponse>(&sql)
            .bind(id)
            .bind(&request.abbreviation)
            .bind(&request.name)
            .bind(&request.description)
            .bind(&request.mesh_url)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn upsert_request(id: RegionId, abbreviation: &str, name: &str) -> RegionUpsertDBRequest {
        RegionUpsertDBRequest {
            id,
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
            actor: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_inserts_then_refreshes(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Regions::new(&mut conn);

        let created = repo.upsert(&upsert_request(3, "SE", "Sudeste")).await.unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.abbreviation, "SE");
        assert!(created.audit.is_active);

        let refreshed = repo.upsert(&upsert_request(3, "SE", "Região Sudeste")).await.unwrap();
        assert_eq!(refreshed.name, "Região Sudeste");
        assert_eq!(refreshed.audit.created_at, created.audit.created_at);

        let count = repo.count(&RegionFilter::new(0, 10)).await.unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_orders_by_name_and_searches(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Regions::new(&mut conn);

        for (id, abbreviation, name) in [(1, "N", "Norte"), (2, "NE", "Nordeste"), (3, "SE", "Sudeste"), (4, "S", "Sul")] {
            repo.upsert(&upsert_request(id, abbreviation, name)).await.unwrap();
        }

        let all = repo.list(&RegionFilter::new(0, 10)).await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Nordeste", "Norte", "Sudeste", "Sul"]);

        let filter = RegionFilter::new(0, 10).search("su");
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(repo.count(&filter).await.unwrap(), 2);

        let page = repo.list(&RegionFilter::new(1, 2)).await.unwrap();
        assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deactivate_records_deletion(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Regions::new(&mut conn);
        repo.upsert(&upsert_request(5, "CO", "Centro-Oeste")).await.unwrap();

        let deactivated = repo
            .update(
                5,
                &RegionUpdateDBRequest {
                    is_active: Some(false),
                    updated_by: Some("admin@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!deactivated.audit.is_active);
        assert!(deactivated.audit.deleted_at.is_some());
        assert_eq!(deactivated.audit.deleted_by.as_deref(), Some("admin@example.com"));
        assert_eq!(deactivated.name, "Centro-Oeste");

        let restored = repo
            .update(
                5,
                &RegionUpdateDBRequest {
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(restored.audit.is_active);
        assert!(restored.audit.deleted_at.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_region_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Regions::new(&mut conn);

        let result = repo.update(99, &RegionUpdateDBRequest::default()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
        assert!(!repo.delete(99).await.unwrap());
    }
}
