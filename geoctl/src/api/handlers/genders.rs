use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::genders::{GenderCreate, GenderResponse, GenderUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::auth::CurrentActor;
use crate::db::handlers::{Genders, Repository, genders::GenderFilter};
use crate::errors::{Error, Result};
use crate::types::GenderId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/genders",
    tag = "reference",
    summary = "List genders",
    params(Pagination),
    responses((status = 200, description = "Page of genders ordered by name", body = PaginatedResponse<GenderResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_genders(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<PaginatedResponse<GenderResponse>>> {
    let (skip, limit) = pagination.params();
    let filter = GenderFilter::new(skip, limit);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Genders::new(&mut conn);
    let genders = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        genders.into_iter().map(GenderResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/genders/{abbreviation}",
    tag = "reference",
    summary = "Get gender",
    responses(
        (status = 200, description = "Gender", body = GenderResponse),
        (status = 404, description = "Gender not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_gender(State(state): State<AppState>, Path(abbreviation): Path<GenderId>) -> Result<Json<GenderResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let gender = Genders::new(&mut conn)
        .get_by_id(abbreviation.clone())
        .await?
        .ok_or_else(|| missing("Gender", &abbreviation))?;

    Ok(Json(gender.into()))
}

#[utoipa::path(
    post,
    path = "/genders",
    tag = "reference",
    summary = "Create gender",
    request_body = GenderCreate,
    responses(
        (status = 201, description = "Gender created", body = GenderResponse),
        (status = 400, description = "Invalid abbreviation or name"),
        (status = 409, description = "Abbreviation taken or unknown color")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_gender(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<GenderCreate>,
) -> Result<(StatusCode, Json<GenderResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let gender = Genders::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(gender.into())))
}

#[utoipa::path(
    patch,
    path = "/genders/{abbreviation}",
    tag = "reference",
    summary = "Update gender",
    request_body = GenderUpdate,
    responses(
        (status = 200, description = "Gender updated", body = GenderResponse),
        (status = 404, description = "Gender not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_gender(
    State(state): State<AppState>,
    Path(abbreviation): Path<GenderId>,
    actor: CurrentActor,
    Json(update): Json<GenderUpdate>,
) -> Result<Json<GenderResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let gender = Genders::new(&mut conn)
        .update(abbreviation.clone(), &request)
        .await
        .map_err(not_found("Gender", &abbreviation))?;

    Ok(Json(gender.into()))
}

#[utoipa::path(
    delete,
    path = "/genders/{abbreviation}",
    tag = "reference",
    summary = "Delete gender",
    responses(
        (status = 204, description = "Gender deleted"),
        (status = 404, description = "Gender not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_gender(State(state): State<AppState>, Path(abbreviation): Path<GenderId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Genders::new(&mut conn).delete(abbreviation.clone()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Gender", &abbreviation))
    }
}
