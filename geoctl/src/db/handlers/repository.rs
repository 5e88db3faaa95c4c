//! Base repository trait shared by every table-backed entity.

use crate::db::errors::Result;
use std::collections::HashMap;

/// Data access for one postgres table.
///
/// Each repository borrows a connection (possibly inside a transaction) and exposes CRUD plus a
/// typed filter for listing. Create, update and response shapes are separate associated types so
/// that audit columns never leak into requests.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list and count operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get lots of entities by their IDs, keyed by ID
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// List entities matching the filter, honouring its skip/limit
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Count entities matching the filter, ignoring skip/limit
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64>;

    /// Hard-delete an entity by ID. Parents with children fail with a foreign key violation.
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
