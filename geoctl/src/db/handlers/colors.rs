//! Database repository for colors.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::audit_set_clause;
use crate::db::handlers::repository::Repository;
use crate::db::models::colors::{ColorCreateDBRequest, ColorDBResponse, ColorUpdateDBRequest};
use crate::types::ColorId;
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing colors
#[derive(Debug, Clone)]
pub struct ColorFilter {
    pub skip: i64,
    pub limit: i64,
}

impl ColorFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Colors<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Colors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Colors<'c> {
    type CreateRequest = ColorCreateDBRequest;
    type UpdateRequest = ColorUpdateDBRequest;
    type Response = ColorDBResponse;
    type Id = ColorId;
    type Filter = ColorFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let color = sqlx::query_as::<_, ColorDBResponse>(
            r#"
            INSERT INTO colors (name, code, description, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.code)
        .bind(&request.description)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(color)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let color = sqlx::query_as::<_, ColorDBResponse>("SELECT * FROM colors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(color)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let colors = sqlx::query_as::<_, ColorDBResponse>("SELECT * FROM colors WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(colors.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Newest first
        let colors = sqlx::query_as::<_, ColorDBResponse>("SELECT * FROM colors ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(colors)
    }

    #[instrument(skip(self, _filter), err)]
    async fn count(&mut self, _filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM colors")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM colors WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE colors SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                description = COALESCE($4, description),
                {}
            WHERE id = $1
            RETURNING *
            "#,
            audit_set_clause(5, 6)
        );

        let color = sqlx::query_as::<_, ColorDBResponse>(&sql)
            .bind(id)
            .bind(&request.name)
            .bind(&request.code)
            .bind(&request.description)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_color_crud(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Colors::new(&mut conn);

        let red = repo
            .create(&ColorCreateDBRequest {
                name: "Vermelho".to_string(),
                code: "#FF0000".to_string(),
                description: String::new(),
                created_by: Some("admin".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(red.audit.created_by.as_deref(), Some("admin"));
        assert_eq!(red.audit.updated_by.as_deref(), Some("admin"));

        let updated = repo
            .update(
                red.id,
                &ColorUpdateDBRequest {
                    code: Some("#EE0000".to_string()),
                    updated_by: Some("editor".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.code, "#EE0000");
        assert_eq!(updated.name, "Vermelho");
        assert_eq!(updated.audit.updated_by.as_deref(), Some("editor"));

        assert_eq!(repo.count(&ColorFilter::new(0, 10)).await.unwrap(), 1);
        assert!(repo.delete(red.id).await.unwrap());
        assert!(repo.get_by_id(red.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_code_length_is_enforced(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = Colors::new(&mut conn)
            .create(&ColorCreateDBRequest {
                name: "Azul".to_string(),
                code: "#0000FFFF".to_string(),
                description: String::new(),
                created_by: None,
            })
            .await;
        assert!(result.is_err());
    }
}
