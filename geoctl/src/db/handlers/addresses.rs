//! Database repository for addresses and their address type links.
//!
//! Links live in `address_type_links`; responses carry them as `type_ids`. Writes touch two
//! tables, so callers should run them inside a transaction.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::audit_set_clause;
use crate::db::handlers::repository::Repository;
use crate::db::models::addresses::{AddressCreateDBRequest, AddressDBResponse, AddressUpdateDBRequest};
use crate::types::{AddressId, AddressTypeId, MunicipalityId};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct AddressFilter {
    pub skip: i64,
    pub limit: i64,
    pub municipality_id: Option<MunicipalityId>,
}

impl AddressFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            municipality_id: None,
        }
    }

    pub fn municipality(mut self, municipality_id: MunicipalityId) -> Self {
        self.municipality_id = Some(municipality_id);
        self
    }
}

const SELECT_ADDRESS: &str = r#"
    SELECT a.*,
        ARRAY(
            SELECT l.address_type_id FROM address_type_links l
            WHERE l.address_id = a.id
            ORDER BY l.address_type_id
        ) AS type_ids
    FROM addresses a
"#;

pub struct Addresses<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Addresses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    async fn replace_types(&mut self, id: AddressId, type_ids: &[AddressTypeId]) -> Result<()> {
        sqlx::query("DELETE FROM address_type_links WHERE address_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO address_type_links (address_id, address_type_id)
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

    async fn fetch(&mut self, id: AddressId) -> Result<Option<AddressDBResponse>> {
        let sql = format!("{SELECT_ADDRESS} WHERE a.id = $1");
        let address = sqlx::query_as::<_, AddressDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(address)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Addresses<'c> {
    type CreateRequest = AddressCreateDBRequest;
    type UpdateRequest = AddressUpdateDBRequest;
    type Response = AddressDBResponse;
    type Id = AddressId;
    type Filter = AddressFilter;

    #[instrument(skip(self, request), fields(municipality_id = request.municipality_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = sqlx::query_scalar::<_, AddressId>(
            r#"
            INSERT INTO addresses (
                street, complement, number, district, municipality_id, postal_code,
                longitude, latitude, area_code, notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING id
            "#,
        )
        .bind(&request.street)
        .bind(&request.complement)
        .bind(&request.number)
        .bind(&request.district)
        .bind(request.municipality_id)
        .bind(&request.postal_code)
        .bind(request.longitude)
        .bind(request.latitude)
        .bind(request.area_code)
        .bind(&request.notes)
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

        let sql = format!("{SELECT_ADDRESS} WHERE a.id = ANY($1)");
        let addresses = sqlx::query_as::<_, AddressDBResponse>(&sql)
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(addresses.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = format!(
            "{SELECT_ADDRESS} WHERE ($1::int IS NULL OR a.municipality_id = $1) ORDER BY a.created_at DESC, a.id DESC LIMIT $2 OFFSET $3"
        );
        let addresses = sqlx::query_as::<_, AddressDBResponse>(&sql)
            .bind(filter.municipality_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(addresses)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM addresses WHERE ($1::int IS NULL OR municipality_id = $1)")
            .bind(filter.municipality_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let sql = format!(
            r#"
            UPDATE addresses SET
                street = COALESCE($2, street),
                complement = COALESCE($3, complement),
                number = COALESCE($4, number),
                district = COALESCE($5, district),
                municipality_id = COALESCE($6, municipality_id),
                postal_code = COALESCE($7, postal_code),
                longitude = COALESCE($8, longitude),
                latitude = COALESCE($9, latitude),
                area_code = COALESCE($10, area_code),
                notes = COALESCE($11, notes),
                {}
            WHERE id = $1
            RETURNING id
            "#,
            audit_set_clause(12, 13)
        );

        sqlx::query_scalar::<_, AddressId>(&sql)
            .bind(id)
            .bind(&request.street)
            .bind(&request.complement)
            .bind(&request.number)
            .bind(&request.district)
            .bind(request.municipality_id)
            .bind(&request.postal_code)
            .bind(request.longitude)
            .bind(request.latitude)
            .bind(request.area_code)
            .bind(&request.notes)
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
