//! Database repository for states.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::handlers::{audit_set_clause, contains_pattern};
use crate::db::models::states::{StateCreateDBRequest, StateDBResponse, StateUpdateDBRequest, StateUpsertDBRequest};
use crate::types::{Actor, RegionId, StateId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing states. `region_id` drives the cascading state dropdown.
#[derive(Debug, Clone)]
pub struct StateFilter {
    pub skip: i64,
    pub limit: i64,
    pub region_id: Option<RegionId>,
    /// Case-insensitive match against name or abbreviation
    pub search: Option<String>,
}

impl StateFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            region_id: None,
            search: None,
        }
    }

    pub fn region(mut self, region_id: RegionId) -> Self {
        self.region_id = Some(region_id);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

const FILTER_CLAUSE: &str = "($1::int IS NULL OR region_id = $1) AND ($2::text IS NULL OR name ILIKE $2 OR abbreviation ILIKE $2)";

pub struct States<'c> {
    db: &'c mut PgConnection,
}

impl<'c> States<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert the state or refresh abbreviation, name and region if the IBGE id already exists.
    #[instrument(skip(self, request), fields(state_id = request.id, region_id = ?request.region_id), err)]
    pub async fn upsert(&mut self, request: &StateUpsertDBRequest) -> Result<StateDBResponse> {
        let state = sqlx::query_as::<_, StateDBResponse>(
            r#"
            INSERT INTO states (id, abbreviation, name, region_id, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (id) DO UPDATE SET
                abbreviation = EXCLUDED.abbreviation,
                name = EXCLUDED.name,
                region_id = EXCLUDED.region_id,
                updated_at = NOW(),
                updated_by = EXCLUDED.updated_by
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.abbreviation)
        .bind(&request.name)
        .bind(request.region_id)
        .bind(&request.actor)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(state)
    }

    /// Look up states by abbreviation, case-insensitively. Unknown abbreviations are skipped.
    #[instrument(skip(self, abbreviations), fields(count = abbreviations.len()), err)]
    pub async fn get_by_abbreviations(&mut self, abbreviations: &[String]) -> Result<Vec<StateDBResponse>> {
        let upper: Vec<String> = abbreviations.iter().map(|s| s.trim().to_uppercase()).collect();
        let states = sqlx::query_as::<_, StateDBResponse>("SELECT * FROM states WHERE abbreviation = ANY($1) ORDER BY name, id")
            .bind(&upper)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(states)
    }

    /// Every state, ordered by name
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<StateDBResponse>> {
        let states = sqlx::query_as::<_, StateDBResponse>("SELECT * FROM states ORDER BY name, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(states)
    }

    /// Record where the flag and coat of arms images were stored, relative to the media root.
    #[instrument(skip(self), err)]
    pub async fn set_images(&mut self, id: StateId, flag_path: &str, coat_of_arms_path: &str, actor: &Actor) -> Result<StateDBResponse> {
        let state = sqlx::query_as::<_, StateDBResponse>(
            r#"
            UPDATE states SET
                flag_path = $2,
                coat_of_arms_path = $3,
                updated_at = NOW(),
                updated_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(flag_path)
        .bind(coat_of_arms_path)
        .bind(actor)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(state)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for States<'c> {
    type CreateRequest = StateCreateDBRequest;
    type UpdateRequest = StateUpdateDBRequest;
    type Response = StateDBResponse;
    type Id = StateId;
    type Filter = StateFilter;

    #[instrument(skip(self, request), fields(state_id = request.id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let state = sqlx::query_as::<_, StateDBResponse>(
            r#"
            INSERT INTO states (id, region_id, abbreviation, name, description, mesh_url, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.region_id)
        .bind(&request.abbreviation)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.mesh_url)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(state)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let state = sqlx::query_as::<_, StateDBResponse>("SELECT * FROM states WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(state)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let states = sqlx::query_as::<_, StateDBResponse>("SELECT * FROM states WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(states.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip, region_id = ?filter.region_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!("SELECT * FROM states WHERE {FILTER_CLAUSE} ORDER BY name, id LIMIT $3 OFFSET $4");
        let states = sqlx::query_as::<_, StateDBResponse>(&sql)
            .bind(filter.region_id)
            .bind(contains_pattern(filter.search.as_deref()))
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(states)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM states WHERE {FILTER_CLAUSE}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.region_id)
            .bind(contains_pattern(filter.search.as_deref()))
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM states WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE states SET
                region_id = COALESCE($2, region_id),
                abbreviation = COALESCE($3, abbreviation),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                mesh_url = COALESCE($6, mesh_url),
                {}
            WHERE id = $1
            RETURNING *
            "#,
            audit_set_clause(7, 8)
        );

        let state = sqlx::query_as::<_, StateDBResponse>(&sql)
            .bind(id)
            .bind(request.region_id)
            .bind(&request.abbreviation)
            .bind(&request.name)
            .bind(&request.description)
            .bind(&request.mesh_url)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Regions;
    use crate::db::models::regions::RegionUpsertDBRequest;
    use sqlx::PgPool;

    async fn seed_region(conn: &mut PgConnection, id: RegionId, name: &str) {
        Regions::new(conn)
            .upsert(&RegionUpsertDBRequest {
                id,
                abbreviation: name[..1].to_string(),
                name: name.to_string(),
                actor: None,
            })
            .await
            .unwrap();
    }

    fn state(id: StateId, abbreviation: &str, name: &str, region_id: Option<RegionId>) -> StateUpsertDBRequest {
        StateUpsertDBRequest {
            id,
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
            region_id,
            actor: Some("sync".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_requires_existing_region(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = States::new(&mut conn).upsert(&state(35, "SP", "São Paulo", Some(3))).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_moves_state_between_regions(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_region(&mut conn, 3, "Sudeste").await;
        seed_region(&mut conn, 4, "Sul").await;

        let mut repo = States::new(&mut conn);
        let created = repo.upsert(&state(35, "SP", "São Paulo", Some(3))).await.unwrap();
        assert_eq!(created.region_id, Some(3));
        assert_eq!(created.audit.created_by.as_deref(), Some("sync"));

        let moved = repo.upsert(&state(35, "SP", "São Paulo", Some(4))).await.unwrap();
        assert_eq!(moved.region_id, Some(4));

        let detached = repo.upsert(&state(35, "SP", "São Paulo", None)).await.unwrap();
        assert_eq!(detached.region_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_region(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_region(&mut conn, 3, "Sudeste").await;
        seed_region(&mut conn, 4, "Sul").await;

        let mut repo = States::new(&mut conn);
        repo.upsert(&state(35, "SP", "São Paulo", Some(3))).await.unwrap();
        repo.upsert(&state(33, "RJ", "Rio de Janeiro", Some(3))).await.unwrap();
        repo.upsert(&state(43, "RS", "Rio Grande do Sul", Some(4))).await.unwrap();

        let southeast = repo.list(&StateFilter::new(0, 10).region(3)).await.unwrap();
        assert_eq!(southeast.iter().map(|s| s.id).collect::<Vec<_>>(), vec![33, 35]);

        let rio = StateFilter::new(0, 10).search("rio");
        assert_eq!(repo.count(&rio).await.unwrap(), 2);

        let by_abbreviation = repo.get_by_abbreviations(&["sp".to_string(), "rs".to_string(), "XX".to_string()]).await.unwrap();
        assert_eq!(by_abbreviation.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_region_with_states_cannot_be_deleted(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_region(&mut conn, 3, "Sudeste").await;
        States::new(&mut conn).upsert(&state(35, "SP", "São Paulo", Some(3))).await.unwrap();

        let result = Regions::new(&mut conn).delete(3).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

        assert!(States::new(&mut conn).delete(35).await.unwrap());
        assert!(Regions::new(&mut conn).delete(3).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_set_images(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        seed_region(&mut conn, 3, "Sudeste").await;
        let mut repo = States::new(&mut conn);
        repo.upsert(&state(35, "SP", "São Paulo", Some(3))).await.unwrap();

        let updated = repo
            .set_images(35, "estados/bandeiras/sp_bandeira.png", "estados/brasoes/sp_brasao.png", &None)
            .await
            .unwrap();
        assert_eq!(updated.flag_path.as_deref(), Some("estados/bandeiras/sp_bandeira.png"));
        assert_eq!(updated.coat_of_arms_path.as_deref(), Some("estados/brasoes/sp_brasao.png"));

        let missing = repo.set_images(99, "a", "b", &None).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }
}
