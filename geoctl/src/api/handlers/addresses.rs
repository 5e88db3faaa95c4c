use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::addresses::{AddressCreate, AddressResponse, AddressUpdate, ListAddressesQuery};
use crate::api::models::pagination::PaginatedResponse;
use crate::auth::CurrentActor;
use crate::db::handlers::{Addresses, Repository, addresses::AddressFilter};
use crate::errors::{Error, Result};
use crate::types::AddressId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/addresses",
    tag = "reference",
    summary = "List addresses",
    params(ListAddressesQuery),
    responses((status = 200, description = "Page of addresses, newest first", body = PaginatedResponse<AddressResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(query): Query<ListAddressesQuery>,
) -> Result<Json<PaginatedResponse<AddressResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = AddressFilter::new(skip, limit);
    if let Some(municipality_id) = query.municipality_id {
        filter = filter.municipality(municipality_id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Addresses::new(&mut conn);
    let addresses = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        addresses.into_iter().map(AddressResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/addresses/{id}",
    tag = "reference",
    summary = "Get address",
    responses(
        (status = 200, description = "Address with its type ids", body = AddressResponse),
        (status = 404, description = "Address not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_address(State(state): State<AppState>, Path(id): Path<AddressId>) -> Result<Json<AddressResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let address = Addresses::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("Address", id))?;

    Ok(Json(address.into()))
}

#[utoipa::path(
    post,
    path = "/addresses",
    tag = "reference",
    summary = "Create address",
    request_body = AddressCreate,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 400, description = "Invalid postal code or fields"),
        (status = 409, description = "Duplicate address, unknown municipality or unknown type")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_address(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<AddressCreate>,
) -> Result<(StatusCode, Json<AddressResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;

    // Row and type links are written together
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let address = Addresses::new(&mut tx).create(&request).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(address.into())))
}

#[utoipa::path(
    patch,
    path = "/addresses/{id}",
    tag = "reference",
    summary = "Update address",
    request_body = AddressUpdate,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 404, description = "Address not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    actor: CurrentActor,
    Json(update): Json<AddressUpdate>,
) -> Result<Json<AddressResponse>> {
    let request = update.into_db_request(actor.into_actor())?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let address = Addresses::new(&mut tx).update(id, &request).await.map_err(not_found("Address", id))?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(address.into()))
}

#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = "reference",
    summary = "Delete address",
    responses(
        (status = 204, description = "Address and its type links deleted"),
        (status = 404, description = "Address not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_address(State(state): State<AppState>, Path(id): Path<AddressId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Addresses::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Address", id))
    }
}
