use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::municipalities::{ListMunicipalitiesQuery, MunicipalityCreate, MunicipalityResponse, MunicipalityUpdate};
use crate::api::models::pagination::PaginatedResponse;
use crate::auth::CurrentActor;
use crate::db::handlers::{Municipalities, Repository};
use crate::errors::{Error, Result};
use crate::sync::locality_sync::{SyncRequest, SyncSummary, sync_municipalities};
use crate::types::{Level, MunicipalityId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/municipalities",
    tag = "municipalities",
    summary = "Search municipalities",
    description = "Filters by name substring (case-insensitive), region (through the state) and state.",
    params(ListMunicipalitiesQuery),
    responses(
        (status = 200, description = "Page of municipalities ordered by name", body = PaginatedResponse<MunicipalityResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_municipalities(
    State(state): State<AppState>,
    Query(query): Query<ListMunicipalitiesQuery>,
) -> Result<Json<PaginatedResponse<MunicipalityResponse>>> {
    let filter = query.to_filter();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Municipalities::new(&mut conn);
    let municipalities = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        municipalities.into_iter().map(MunicipalityResponse::from).collect(),
        total_count,
        filter.skip,
        filter.limit,
    )))
}

#[utoipa::path(
    get,
    path = "/municipalities/{id}",
    tag = "municipalities",
    summary = "Get municipality",
    params(("id" = i32, Path, description = "IBGE municipality code")),
    responses(
        (status = 200, description = "Municipality", body = MunicipalityResponse),
        (status = 404, description = "Municipality not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_municipality(State(state): State<AppState>, Path(id): Path<MunicipalityId>) -> Result<Json<MunicipalityResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let municipality = Municipalities::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("Municipality", id))?;

    Ok(Json(municipality.into()))
}

#[utoipa::path(
    post,
    path = "/municipalities",
    tag = "municipalities",
    summary = "Create municipality",
    request_body = MunicipalityCreate,
    responses(
        (status = 201, description = "Municipality created", body = MunicipalityResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "IBGE code already exists or unknown state")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_municipality(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<MunicipalityCreate>,
) -> Result<(StatusCode, Json<MunicipalityResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let municipality = Municipalities::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(municipality.into())))
}

#[utoipa::path(
    patch,
    path = "/municipalities/{id}",
    tag = "municipalities",
    summary = "Update municipality",
    params(("id" = i32, Path, description = "IBGE municipality code")),
    request_body = MunicipalityUpdate,
    responses(
        (status = 200, description = "Municipality updated", body = MunicipalityResponse),
        (status = 404, description = "Municipality not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_municipality(
    State(state): State<AppState>,
    Path(id): Path<MunicipalityId>,
    actor: CurrentActor,
    Json(update): Json<MunicipalityUpdate>,
) -> Result<Json<MunicipalityResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let municipality = Municipalities::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(not_found("Municipality", id))?;

    Ok(Json(municipality.into()))
}

#[utoipa::path(
    delete,
    path = "/municipalities/{id}",
    tag = "municipalities",
    summary = "Delete municipality",
    params(("id" = i32, Path, description = "IBGE municipality code")),
    responses(
        (status = 204, description = "Municipality deleted"),
        (status = 404, description = "Municipality not found"),
        (status = 409, description = "Municipality is referenced by addresses")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_municipality(
    State(state): State<AppState>,
    Path(id): Path<MunicipalityId>,
    _actor: CurrentActor,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Municipalities::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Municipality", id))
    }
}

#[utoipa::path(
    post,
    path = "/municipalities/sync",
    tag = "sync",
    summary = "Synchronize municipalities from IBGE",
    description = "Upserts the requested municipalities together with their states and regions, in one transaction.",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Municipalities upserted", body = SyncSummary),
        (status = 400, description = "Malformed upstream payload"),
        (status = 502, description = "IBGE unreachable or returned an error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn synchronize_municipalities(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(mut request): Json<SyncRequest>,
) -> Result<Json<SyncSummary>> {
    request.actor = actor.into_actor();
    request.verify.get_or_insert(state.config.ibge.verify_certificates);
    let municipalities = sync_municipalities(&state.db, state.localities.as_ref(), &request).await?;

    Ok(Json(SyncSummary::new(
        Level::Municipalities,
        municipalities.iter().map(|m| m.id).collect(),
    )))
}
