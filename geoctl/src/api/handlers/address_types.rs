use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::address_types::{AddressTypeCreate, AddressTypeResponse, AddressTypeUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::auth::CurrentActor;
use crate::db::handlers::{AddressTypes, Repository, address_types::AddressTypeFilter};
use crate::errors::{Error, Result};
use crate::types::AddressTypeId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/address-types",
    tag = "reference",
    summary = "List address types",
    params(Pagination),
    responses((status = 200, description = "Page of address types ordered by name", body = PaginatedResponse<AddressTypeResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_address_types(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<AddressTypeResponse>>> {
    let (skip, limit) = pagination.params();
    let filter = AddressTypeFilter::new(skip, limit);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = AddressTypes::new(&mut conn);
    let rows = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        rows.into_iter().map(AddressTypeResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/address-types/{id}",
    tag = "reference",
    summary = "Get address type",
    responses(
        (status = 200, description = "Address type", body = AddressTypeResponse),
        (status = 404, description = "Address type not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_address_type(State(state): State<AppState>, Path(id): Path<AddressTypeId>) -> Result<Json<AddressTypeResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = AddressTypes::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("Address type", id))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    post,
    path = "/address-types",
    tag = "reference",
    summary = "Create address type",
    request_body = AddressTypeCreate,
    responses(
        (status = 201, description = "Address type created", body = AddressTypeResponse),
        (status = 400, description = "Invalid abbreviation or name"),
        (status = 409, description = "Unknown color")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_address_type(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<AddressTypeCreate>,
) -> Result<(StatusCode, Json<AddressTypeResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = AddressTypes::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    patch,
    path = "/address-types/{id}",
    tag = "reference",
    summary = "Update address type",
    request_body = AddressTypeUpdate,
    responses(
        (status = 200, description = "Address type updated", body = AddressTypeResponse),
        (status = 404, description = "Address type not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_address_type(
    State(state): State<AppState>,
    Path(id): Path<AddressTypeId>,
    actor: CurrentActor,
    Json(update): Json<AddressTypeUpdate>,
) -> Result<Json<AddressTypeResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = AddressTypes::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(not_found("Address type", id))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/address-types/{id}",
    tag = "reference",
    summary = "Delete address type",
    responses(
        (status = 204, description = "Address type deleted"),
        (status = 404, description = "Address type not found"),
        (status = 409, description = "Address type still linked to a address")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_address_type(State(state): State<AppState>, Path(id): Path<AddressTypeId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if AddressTypes::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Address type", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::address_types::AddressTypeResponse;
    use crate::api::models::colors::ColorResponse;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_address_type_abbreviation_is_unique(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;
        let color: ColorResponse = app
            .post("/admin/api/v1/colors")
            .json(&json!({"name": "Azul", "code": "#0000FF"}))
            .await
            .json();

        let body = json!({"abbreviation": "COM", "name": "Comercial", "color_id": color.id});
        let created: AddressTypeResponse = app.post("/admin/api/v1/address-types").json(&body).await.json();

        let response = app.post("/admin/api/v1/address-types").json(&body).await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["resource"], "address_type");

        let updated: AddressTypeResponse = app
            .patch(&format!("/admin/api/v1/address-types/{}", created.id))
            .json(&json!({"is_active": false}))
            .await
            .json();
        assert!(!updated.audit.is_active);
        assert!(updated.audit.deleted_at.is_some());

        app.get("/admin/api/v1/address-types/999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
