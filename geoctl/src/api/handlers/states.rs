use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::states::{ListStatesQuery, StateCreate, StateResponse, StateUpdate};
use crate::auth::CurrentActor;
use crate::db::handlers::{Repository, States, states::StateFilter};
use crate::errors::{Error, Result};
use crate::sync::locality_sync::{SyncRequest, SyncSummary, sync_states};
use crate::sync::state_images::StateSelection;
use crate::types::{Level, StateId};
use crate::validation;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[utoipa::path(
    get,
    path = "/states",
    tag = "states",
    summary = "List states",
    params(ListStatesQuery),
    responses(
        (status = 200, description = "Page of states ordered by name", body = PaginatedResponse<StateResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_states(
    State(state): State<AppState>,
    Query(query): Query<ListStatesQuery>,
) -> Result<Json<PaginatedResponse<StateResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = StateFilter::new(skip, limit);
    if let Some(region_id) = query.region_id {
        filter = filter.region(region_id);
    }
    if let Some(search) = validation::search_term(query.search.as_deref()) {
        filter = filter.search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = States::new(&mut conn);
    let states = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        states.into_iter().map(StateResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/states/{id}",
    tag = "states",
    summary = "Get state",
    params(("id" = i32, Path, description = "IBGE state code")),
    responses(
        (status = 200, description = "State", body = StateResponse),
        (status = 404, description = "State not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_state(State(state): State<AppState>, Path(id): Path<StateId>) -> Result<Json<StateResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let found = States::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("State", id))?;

    Ok(Json(found.into()))
}

#[utoipa::path(
    post,
    path = "/states",
    tag = "states",
    summary = "Create state",
    request_body = StateCreate,
    responses(
        (status = 201, description = "State created", body = StateResponse),
        (status = 400, description = "Invalid abbreviation or name"),
        (status = 409, description = "IBGE code already exists or unknown region")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_state(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<StateCreate>,
) -> Result<(StatusCode, Json<StateResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = States::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/states/{id}",
    tag = "states",
    summary = "Update state",
    params(("id" = i32, Path, description = "IBGE state code")),
    request_body = StateUpdate,
    responses(
        (status = 200, description = "State updated", body = StateResponse),
        (status = 400, description = "Invalid abbreviation or name"),
        (status = 404, description = "State not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_state(
    State(state): State<AppState>,
    Path(id): Path<StateId>,
    actor: CurrentActor,
    Json(update): Json<StateUpdate>,
) -> Result<Json<StateResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let updated = States::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(not_found("State", id))?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/states/{id}",
    tag = "states",
    summary = "Delete state",
    params(("id" = i32, Path, description = "IBGE state code")),
    responses(
        (status = 204, description = "State deleted"),
        (status = 404, description = "State not found"),
        (status = 409, description = "State still has municipalities")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_state(State(state): State<AppState>, Path(id): Path<StateId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if States::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("State", id))
    }
}

#[utoipa::path(
    post,
    path = "/states/sync",
    tag = "sync",
    summary = "Synchronize states from IBGE",
    description = "Upserts the requested states and the regions they belong to, in one transaction.",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "States upserted", body = SyncSummary),
        (status = 400, description = "Malformed upstream payload"),
        (status = 502, description = "IBGE unreachable or returned an error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn synchronize_states(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(mut request): Json<SyncRequest>,
) -> Result<Json<SyncSummary>> {
    request.actor = actor.into_actor();
    request.verify.get_or_insert(state.config.ibge.verify_certificates);
    let states = sync_states(&state.db, state.localities.as_ref(), &request).await?;

    Ok(Json(SyncSummary::new(Level::States, states.iter().map(|s| s.id).collect())))
}

/// Which states to refresh and whether to verify the image host's certificate
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateImagesRequest {
    pub selection: StateSelection,
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

#[utoipa::path(
    post,
    path = "/states/images",
    tag = "states",
    summary = "Download flag and coat of arms images",
    request_body = UpdateImagesRequest,
    responses(
        (status = 200, description = "States with refreshed image paths", body = Vec<StateResponse>),
        (status = 400, description = "Image URL templates are not configured"),
        (status = 502, description = "An image download failed")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_images(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(request): Json<UpdateImagesRequest>,
) -> Result<Json<Vec<StateResponse>>> {
    let updated = state
        .state_images
        .sync_state_images(&state.db, &request.selection, request.verify, &actor.into_actor())
        .await?;

    Ok(Json(updated.into_iter().map(StateResponse::from).collect()))
}
