use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::phones::{ListPhonesQuery, PhoneCreate, PhoneResponse, PhoneUpdate};
use crate::auth::CurrentActor;
use crate::db::handlers::{Phones, Repository, phones::PhoneFilter};
use crate::errors::{Error, Result};
use crate::types::PhoneId;
use crate::validation;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/phones",
    tag = "reference",
    summary = "List phones",
    params(ListPhonesQuery),
    responses(
        (status = 200, description = "Page of phones, newest first", body = PaginatedResponse<PhoneResponse>),
        (status = 400, description = "Unknown country")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_phones(State(state): State<AppState>, Query(query): Query<ListPhonesQuery>) -> Result<Json<PaginatedResponse<PhoneResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = PhoneFilter::new(skip, limit);
    filter.country = validation::optional(query.country.as_deref(), validation::phone_country)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Phones::new(&mut conn);
    let phones = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        phones.into_iter().map(PhoneResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/phones/{id}",
    tag = "reference",
    summary = "Get phone",
    responses(
        (status = 200, description = "Phone with its type ids", body = PhoneResponse),
        (status = 404, description = "Phone not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_phone(State(state): State<AppState>, Path(id): Path<PhoneId>) -> Result<Json<PhoneResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let phone = Phones::new(&mut conn).get_by_id(id).await?.ok_or_else(|| missing("Phone", id))?;

    Ok(Json(phone.into()))
}

#[utoipa::path(
    post,
    path = "/phones",
    tag = "reference",
    summary = "Create phone",
    request_body = PhoneCreate,
    responses(
        (status = 201, description = "Phone created", body = PhoneResponse),
        (status = 400, description = "Invalid country or number"),
        (status = 409, description = "Number already registered or unknown type")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_phone(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<PhoneCreate>,
) -> Result<(StatusCode, Json<PhoneResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let phone = Phones::new(&mut tx).create(&request).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(phone.into())))
}

#[utoipa::path(
    patch,
    path = "/phones/{id}",
    tag = "reference",
    summary = "Update phone",
    request_body = PhoneUpdate,
    responses(
        (status = 200, description = "Phone updated", body = PhoneResponse),
        (status = 404, description = "Phone not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_phone(
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
    actor: CurrentActor,
    Json(update): Json<PhoneUpdate>,
) -> Result<Json<PhoneResponse>> {
    let request = update.into_db_request(actor.into_actor())?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let phone = Phones::new(&mut tx).update(id, &request).await.map_err(not_found("Phone", id))?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(phone.into()))
}

#[utoipa::path(
    delete,
    path = "/phones/{id}",
    tag = "reference",
    summary = "Delete phone",
    responses(
        (status = 204, description = "Phone and its type links deleted"),
        (status = 404, description = "Phone not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_phone(State(state): State<AppState>, Path(id): Path<PhoneId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Phones::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Phone", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::colors::ColorResponse;
    use crate::api::models::pagination::PaginatedResponse;
    use crate::api::models::phone_types::PhoneTypeResponse;
    use crate::api::models::phones::PhoneResponse;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_phone_lifecycle(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;
        let color: ColorResponse = app
            .post("/admin/api/v1/colors")
            .json(&json!({"name": "Verde", "code": "#00FF00"}))
            .await
            .json();
        let mobile: PhoneTypeResponse = app
            .post("/admin/api/v1/phone-types")
            .json(&json!({"abbreviation": "CEL", "name": "Celular", "color_id": color.id}))
            .await
            .json();

        app.post("/admin/api/v1/phones")
            .json(&json!({"number": "(11) 98765-4321"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.post("/admin/api/v1/phones")
            .json(&json!({"country": "PT", "number": "912345678"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .post("/admin/api/v1/phones")
            .json(&json!({"number": "11987654321", "type_ids": [mobile.id]}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let phone: PhoneResponse = response.json();
        assert_eq!(phone.country, "BR");
        assert_eq!(phone.type_ids, vec![mobile.id]);

        app.post("/admin/api/v1/phones")
            .json(&json!({"number": "11987654321"}))
            .await
            .assert_status(StatusCode::CONFLICT);
        app.post("/admin/api/v1/phones")
            .json(&json!({"country": "us", "number": "2025550123"}))
            .await
            .assert_status(StatusCode::CREATED);

        let page: PaginatedResponse<PhoneResponse> = app.get("/admin/api/v1/phones?country=us").await.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].country, "US");

        let cleared: PhoneResponse = app
            .patch(&format!("/admin/api/v1/phones/{}", phone.id))
            .json(&json!({"type_ids": []}))
            .await
            .json();
        assert!(cleared.type_ids.is_empty());

        app.delete(&format!("/admin/api/v1/phone-types/{}", mobile.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.delete(&format!("/admin/api/v1/phones/{}", phone.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}
