use crate::AppState;
use crate::api::handlers::{missing, not_found};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::regions::{ListRegionsQuery, RegionCreate, RegionResponse, RegionUpdate};
use crate::auth::CurrentActor;
use crate::db::handlers::{Regions, Repository, regions::RegionFilter};
use crate::errors::{Error, Result};
use crate::sync::locality_sync::{SyncRequest, SyncSummary, sync_regions};
use crate::types::{Level, RegionId};
use crate::validation;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/regions",
    tag = "regions",
    summary = "List regions",
    params(ListRegionsQuery),
    responses(
        (status = 200, description = "Page of regions ordered by name", body = PaginatedResponse<RegionResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_regions(
    State(state): State<AppState>,
    Query(query): Query<ListRegionsQuery>,
) -> Result<Json<PaginatedResponse<RegionResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = RegionFilter::new(skip, limit);
    if let Some(search) = validation::search_term(query.search.as_deref()) {
        filter = filter.search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Regions::new(&mut conn);
    let regions = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        regions.into_iter().map(RegionResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    get,
    path = "/regions/{id}",
    tag = "regions",
    summary = "Get region",
    params(("id" = i32, Path, description = "IBGE region code")),
    responses(
        (status = 200, description = "Region", body = RegionResponse),
        (status = 404, description = "Region not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_region(State(state): State<AppState>, Path(id): Path<RegionId>) -> Result<Json<RegionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let region = Regions::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| missing("Region", id))?;

    Ok(Json(region.into()))
}

#[utoipa::path(
    post,
    path = "/regions",
    tag = "regions",
    summary = "Create region",
    request_body = RegionCreate,
    responses(
        (status = 201, description = "Region created", body = RegionResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Actor header missing"),
        (status = 409, description = "IBGE code already exists")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_region(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(create): Json<RegionCreate>,
) -> Result<(StatusCode, Json<RegionResponse>)> {
    let request = create.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let region = Regions::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(region.into())))
}

#[utoipa::path(
    patch,
    path = "/regions/{id}",
    tag = "regions",
    summary = "Update region",
    params(("id" = i32, Path, description = "IBGE region code")),
    request_body = RegionUpdate,
    responses(
        (status = 200, description = "Region updated", body = RegionResponse),
        (status = 404, description = "Region not found")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_region(
    State(state): State<AppState>,
    Path(id): Path<RegionId>,
    actor: CurrentActor,
    Json(update): Json<RegionUpdate>,
) -> Result<Json<RegionResponse>> {
    let request = update.into_db_request(actor.into_actor())?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let region = Regions::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(not_found("Region", id))?;

    Ok(Json(region.into()))
}

#[utoipa::path(
    delete,
    path = "/regions/{id}",
    tag = "regions",
    summary = "Delete region",
    params(("id" = i32, Path, description = "IBGE region code")),
    responses(
        (status = 204, description = "Region deleted"),
        (status = 404, description = "Region not found"),
        (status = 409, description = "Region still has states")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_region(State(state): State<AppState>, Path(id): Path<RegionId>, _actor: CurrentActor) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Regions::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing("Region", id))
    }
}

#[utoipa::path(
    post,
    path = "/regions/sync",
    tag = "sync",
    summary = "Synchronize regions from IBGE",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Regions upserted", body = SyncSummary),
        (status = 400, description = "Malformed upstream payload"),
        (status = 502, description = "IBGE unreachable or returned an error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn synchronize_regions(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(mut request): Json<SyncRequest>,
) -> Result<Json<SyncSummary>> {
    request.actor = actor.into_actor();
    request.verify.get_or_insert(state.config.ibge.verify_certificates);
    let regions = sync_regions(&state.db, state.localities.as_ref(), &request).await?;

    Ok(Json(SyncSummary::new(Level::Regions, regions.iter().map(|r| r.id).collect())))
}

#[cfg(test)]
mod tests {
    use crate::api::models::pagination::PaginatedResponse;
    use crate::api::models::regions::RegionResponse;
    use crate::sync::locality_sync::SyncSummary;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_region_crud(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;

        let response = app
            .post("/admin/api/v1/regions")
            .json(&json!({"id": 3, "abbreviation": "se", "name": "Sudeste"}))
            .add_header("x-geoctl-user", "admin@example.com")
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: RegionResponse = response.json();
        assert_eq!(created.abbreviation, "SE");
        assert_eq!(created.audit.created_by.as_deref(), Some("admin@example.com"));

        let response = app.get("/admin/api/v1/regions/3").await;
        response.assert_status_ok();

        let response = app
            .patch("/admin/api/v1/regions/3")
            .json(&json!({"description": "Região Sudeste", "is_active": false}))
            .await;
        response.assert_status_ok();
        let updated: RegionResponse = response.json();
        assert_eq!(updated.description, "Região Sudeste");
        assert!(!updated.audit.is_active);
        assert!(updated.audit.deleted_at.is_some());

        app.delete("/admin/api/v1/regions/3").await.assert_status(StatusCode::NO_CONTENT);
        app.get("/admin/api/v1/regions/3").await.assert_status(StatusCode::NOT_FOUND);
        app.delete("/admin/api/v1/regions/3").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_region_conflicts(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;
        let body = json!({"id": 1, "abbreviation": "N", "name": "Norte"});

        app.post("/admin/api/v1/regions").json(&body).await.assert_status(StatusCode::CREATED);
        let response = app.post("/admin/api/v1/regions").json(&body).await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<serde_json::Value>()["resource"], "region");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_regions_endpoint(pool: PgPool) {
        let (app, localities) = create_test_app(pool).await;
        localities.respond("regioes", five_regions());

        let response = app.post("/admin/api/v1/regions/sync").json(&json!({})).await;
        response.assert_status_ok();
        let summary: SyncSummary = response.json();
        assert_eq!(summary.count, 5);

        let page: PaginatedResponse<RegionResponse> = app.get("/admin/api/v1/regions?search=nor").await.json();
        let names: Vec<_> = page.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Nordeste", "Norte"]);
        assert_eq!(page.total_count, 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_upstream_failure_is_bad_gateway(pool: PgPool) {
        let (app, _localities) = create_test_app(pool).await;

        let response = app.post("/admin/api/v1/regions/sync").json(&json!({"id": 9})).await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_writes_require_actor_when_enabled(pool: PgPool) {
        let mut config = create_test_config();
        config.auth.proxy_header.enabled = true;
        let (app, _) = create_test_app_with_config(pool, config).await;

        let body = json!({"id": 2, "abbreviation": "NE", "name": "Nordeste"});
        app.post("/admin/api/v1/regions")
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        app.post("/admin/api/v1/regions")
            .json(&body)
            .add_header("x-geoctl-user", "ops")
            .await
            .assert_status(StatusCode::CREATED);

        // Reads stay open
        app.get("/admin/api/v1/regions").await.assert_status_ok();
    }
}
