//! Database repository for phones and their phone type links.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::audit_set_clause;
use crate::db::handlers::repository::Repository;
use crate::db::models::phones::{PhoneCreateDBRequest, PhoneDBResponse, PhoneUpdateDBRequest};
use crate::types::{PhoneId, PhoneTypeId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct PhoneFilter {
    pub skip: i64,
    pub limit: i64,
    pub country: Option<String>,
}

impl PhoneFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, country: None }
    }
}

const SELECT_PHONE: &str = r#"
    SELECT p.*,
        ARRAY(
            SELECT l.phone_type_id FROM phone_type_links l
            WHERE l.phone_id = p.id
            ORDER BY l.phone_type_id
        ) AS type_ids
    FROM phones p
"#;

pub struct Phones<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Phones<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    async fn replace_types(&mut self, id: PhoneId, type_ids: &[PhoneTypeId]) -> Result<()> {
        sqlx::query("DELETE FROM phone_type_links WHERE phone_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO phone_type_links (phone_id, phone_type_id)
            SELECT $1, UNNEST($2::int[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(type_ids)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    async fn fetch(&mut self, id: PhoneId) -> Result<Option<PhoneDBResponse>> {
        let sql = format!("{SELECT_PHONE} WHERE p.id = $1");
        let phone = sqlx::query_as::<_, PhoneDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(phone)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Phones<'c> {
    type CreateRequest = PhoneCreateDBRequest;
    type UpdateRequest = PhoneUpdateDBRequest;
    type Response = PhoneDBResponse;
    type Id = PhoneId;
    type Filter = PhoneFilter;

    #[instrument(skip(self, request), fields(country = %request.country), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = sqlx::query_scalar::<_, PhoneId>(
            r#"
            INSERT INTO phones (country, number, extension, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(&request.country)
        .bind(&request.number)
        .bind(&request.extension)
        .bind(&request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        self.replace_types(id, &request.type_ids).await?;
        self.fetch(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.fetch(id).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!("{SELECT_PHONE} WHERE p.id = ANY($1)");
        let phones = sqlx::query_as::<_, PhoneDBResponse>(&sql)
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(phones.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!("{SELECT_PHONE} WHERE ($1::text IS NULL OR p.country = $1) ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3");
        let phones = sqlx::query_as::<_, PhoneDBResponse>(&sql)
            .bind(&filter.country)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(phones)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM phones WHERE ($1::text IS NULL OR country = $1)")
            .bind(&filter.country)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM phones WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE phones SET
                country = COALESCE($2, country),
                number = COALESCE($3, number),
                extension = COALESCE($4, extension),
                {}
            WHERE id = $1
            RETURNING id
            "#,
            audit_set_clause(5, 6)
        );

        sqlx::query_scalar::<_, PhoneId>(&sql)
            .bind(id)
            .bind(&request.country)
            .bind(&request.number)
            .bind(&request.extension)
            .bind(request.is_active)
            .bind(&request.updated_by)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        if let Some(type_ids) = &request.type_ids {
            self.replace_types(id, type_ids).await?;
        }

        self.fetch(id).await?.ok_or(DbError::NotFound)
    }
}
