//! Bulk commands over a selection of ids, dispatched by `(entity, action)`.
//!
//! The router mounts [`run_action`] once per entity with the entity's [`Level`] attached as an
//! extension.
//!
//! Upstream requests made by actions skip certificate verification, matching the admin
//! screens they back.

use crate::AppState;
use crate::api::models::actions::{ActionRequest, ActionResponse};
use crate::auth::CurrentActor;
use crate::errors::{Error, Result};
use crate::sync::locality_sync::{SyncRequest, SyncSummary, sync_municipalities, sync_regions, sync_states};
use crate::sync::state_images::StateSelection;
use crate::types::{Actor, Level};
use axum::{
    Json,
    Extension,
    extract::{Path, State},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkAction {
    Synchronize(Level),
    UpdateStateImages,
}

impl BulkAction {
    fn resolve(entity: Level, action: &str) -> Option<Self> {
        match (entity, action) {
            (level, "synchronize") => Some(Self::Synchronize(level)),
            (Level::States, "update-images") => Some(Self::UpdateStateImages),
            _ => None,
        }
    }

    async fn run(self, state: &AppState, ids: Vec<i32>, actor: Actor) -> Result<(usize, String)> {
        match self {
            Self::Synchronize(level) => {
                let mut request = SyncRequest::many(ids).with_verify(false);
                request.actor = actor;
                let fetcher = state.localities.as_ref();
                let synced: Vec<i32> = match level {
                    Level::Regions => sync_regions(&state.db, fetcher, &request).await?.iter().map(|r| r.id).collect(),
                    Level::States => sync_states(&state.db, fetcher, &request).await?.iter().map(|s| s.id).collect(),
                    Level::Municipalities => sync_municipalities(&state.db, fetcher, &request)
                        .await?
                        .iter()
                        .map(|m| m.id)
                        .collect(),
                };
                let summary = SyncSummary::new(level, synced);
                Ok((summary.count, format!("{} {level} synchronized from IBGE", summary.count)))
            }
            Self::UpdateStateImages => {
                let updated = state
                    .state_images
                    .sync_state_images(&state.db, &StateSelection::Ids(ids), false, &actor)
                    .await?;
                Ok((updated.len(), format!("Images updated for {} states", updated.len())))
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/{entity}/actions/{action}",
    tag = "actions",
    summary = "Run a bulk action",
    description = "Registered actions: `regions/synchronize`, `states/synchronize`, \
                   `municipalities/synchronize` and `states/update-images`.",
    params(
        ("entity" = String, Path, description = "regions, states or municipalities"),
        ("action" = String, Path, description = "synchronize or update-images")
    ),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action completed", body = ActionResponse),
        (status = 400, description = "Empty selection"),
        (status = 404, description = "No such action for this entity"),
        (status = 502, description = "Upstream request failed")
    )
)]
#[tracing::instrument(skip_all, fields(entity = %entity, action = %action))]
pub async fn run_action(
    State(state): State<AppState>,
    Extension(entity): Extension<Level>,
    Path(action): Path<String>,
    actor: CurrentActor,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>> {
    let bulk = BulkAction::resolve(entity, &action).ok_or_else(|| Error::NotFound {
        resource: "Action".to_string(),
        id: format!("{entity}/{action}"),
    })?;
    if request.ids.is_empty() {
        return Err(Error::BadRequest {
            message: "Select at least one item".to_string(),
        });
    }

    let (processed, message) = bulk.run(&state, request.ids, actor.into_actor()).await?;

    Ok(Json(ActionResponse {
        entity: entity.to_string(),
        action,
        processed,
        message,
    }))
}
