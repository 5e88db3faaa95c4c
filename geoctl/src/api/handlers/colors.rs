use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::colors::{ColorCreate, ColorResponse, ColorUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::auth::CurrentActor;
use crate::db::handlers::{Colors, Repository, colors::ColorFilter};
use crate::errors::{Error, Result};
use crate::types::ColorId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/colors",
    tag = "reference",
    summary = "List colors",
    params(Pagination),
    responses((status = 200, description = "Page of colors, newest first", body = PaginatedResponse<ColorResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_colors(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<PaginatedResponse<ColorResponse>>> {
    let (skip, limit) = pagination.params();
    let filter = ColorFilter::new(skip, limit);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Colors::new(&mut conn);
    let colors = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        colors.into_iter().map(ColorResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/colors/{id}",
    tag = "reference",
    summary = "Get color",
    responses(
        (status = 200, description = "Color", body = ColorResponse),
        (status = 404, description = "Color not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_color(State(state): State<AppState>, Path(id): Path<ColorId>) -> Result<Json<ColorResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let color = Colors::new(&mut conn).get_by_id(id).await?.ok_or_else(|| missing("Color", id))?;

    Ok(Json(color.into()))
}

#[utoipa::path(
    post,
    path = "/colors",
    tag = "reference",
    summary = "Create color",
    request_body = ColorCreate,
    responses(
        (status = 201, description = "Color created", body = ColorResponse),
        (status = 400, description = "Invalid name or code")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_color(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<ColorCreate>,
) -> Result<(StatusCode, Json<ColorResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let color = Colors::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(color.into())))
}

#[utoipa::path(
    patch,
    path = "/colors/{id}",
    tag = "reference",
    summary = "Update color",
    request_body = ColorUpdate,
    responses(
        (status = 200, description = "Color updated", body = ColorResponse),
        (status = 404, description = "Color not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_color(
    State(state): State<AppState>,
    Path(id): Path<ColorId>,
    actor: CurrentActor,
    Json(update): Json<ColorUpdate>,
) -> Result<Json<ColorResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let color = Colors::new(&mut conn).update(id, &request).await.map_err(not_found("Color", id))?;

    Ok(Json(color.into()))
}

#[utoipa::path(
    delete,
    path = "/colors/{id}",
    tag = "reference",
    summary = "Delete color",
    responses(
        (status = 204, description = "Color deleted"),
        (status = 404, description = "Color not found"),
        (status = 409, description = "Color still used by a gender or type")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_color(State(state): State<AppState>, Path(id): Path<ColorId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Colors::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Color", id))
    }
}
