use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::phone_types::{PhoneTypeCreate, PhoneTypeResponse, PhoneTypeUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::auth::CurrentActor;
use crate::db::handlers::{PhoneTypes, Repository, phone_types::PhoneTypeFilter};
use crate::errors::{Error, Result};
use crate::types::PhoneTypeId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/phone-types",
    tag = "reference",
    summary = "List phone types",
    params(Pagination),
    responses((status = 200, description = "Page of phone types ordered by name", body = PaginatedResponse<PhoneTypeResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_phone_types(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<PhoneTypeResponse>>> {
    let (skip, limit) = pagination.params();
    let filter = PhoneTypeFilter::new(skip, limit);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PhoneTypes::new(&mut conn);
    let rows = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        rows.into_iter().map(PhoneTypeResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/phone-types/{id}",
    tag = "reference",
    summary = "Get phone type",
    responses(
        (status = 200, description = "Phone type", body = PhoneTypeResponse),
        (status = 404, description = "Phone type not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_phone_type(State(state): State<AppState>, Path(id): Path<PhoneTypeId>) -> Result<Json<PhoneTypeResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = PhoneTypes::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("Phone type", id))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    post,
    path = "/phone-types",
    tag = "reference",
    summary = "Create phone type",
    request_body = PhoneTypeCreate,
    responses(
        (status = 201, description = "Phone type created", body = PhoneTypeResponse),
        (status = 400, description = "Invalid abbreviation or name"),
        (status = 409, description = "Unknown color")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_phone_type(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<PhoneTypeCreate>,
) -> Result<(StatusCode, Json<PhoneTypeResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = PhoneTypes::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    patch,
    path = "/phone-types/{id}",
    tag = "reference",
    summary = "Update phone type",
    request_body = PhoneTypeUpdate,
    responses(
        (status = 200, description = "Phone type updated", body = PhoneTypeResponse),
        (status = 404, description = "Phone type not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_phone_type(
    State(state): State<AppState>,
    Path(id): Path<PhoneTypeId>,
    actor: CurrentActor,
    Json(update): Json<PhoneTypeUpdate>,
) -> Result<Json<PhoneTypeResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = PhoneTypes::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(not_found("Phone type", id))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/phone-types/{id}",
    tag = "reference",
    summary = "Delete phone type",
    responses(
        (status = 204, description = "Phone type deleted"),
        (status = 404, description = "Phone type not found"),
        (status = 409, description = "Phone type still linked to a phone")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_phone_type(State(state): State<AppState>, Path(id): Path<PhoneTypeId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if PhoneTypes::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Phone type", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::colors::ColorResponse;
    use crate::api::models::pagination::PaginatedResponse;
    use crate::api::models::phone_types::PhoneTypeResponse;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_phone_type_requires_known_color_and_short_code(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;

        app.post("/admin/api/v1/phone-types")
            .json(&json!({"abbreviation": "CEL", "name": "Celular", "color_id": 999}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let color: ColorResponse = app
            .post("/admin/api/v1/colors")
            .json(&json!({"name": "Cinza", "code": "#808080"}))
            .await
            .json();
        app.post("/admin/api/v1/phone-types")
            .json(&json!({"abbreviation": "CELL", "name": "Celular", "color_id": color.id}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let created: PhoneTypeResponse = app
            .post("/admin/api/v1/phone-types")
            .json(&json!({"abbreviation": "CEL", "name": "Celular", "color_id": color.id}))
            .await
            .json();
        let page: PaginatedResponse<PhoneTypeResponse> = app.get("/admin/api/v1/phone-types").await.json();
        assert_eq!(page.data[0].id, created.id);

        // The color is now in use
        app.delete(&format!("/admin/api/v1/colors/{}", color.id))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
