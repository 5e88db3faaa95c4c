//! Reconciliation of fetched payloads into local records.
//!
//! Parents are always ensured before children: a state payload upserts its embedded region first,
//! and a municipality payload upserts its embedded state (and that state's region) first. Every
//! step is an upsert keyed by IBGE id, so running the same payload twice is a no-op apart from
//! `updated_at`.

use crate::db::errors::Result as DbResult;
use crate::db::handlers::{Municipalities, Regions, States};
use crate::db::models::{
    municipalities::{MunicipalityDBResponse, MunicipalityUpsertDBRequest},
    regions::{RegionDBResponse, RegionUpsertDBRequest},
    states::{StateDBResponse, StateUpsertDBRequest},
};
use crate::sync::SyncError;
use crate::sync::localities::payloads::{MunicipalityPayload, RegionPayload, StatePayload};
use crate::types::{Actor, Level};
use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::{instrument, warn};

/// Write access the reconciler needs. Implemented for a postgres connection (usually inside the
/// sync transaction) and by an in-memory store in tests.
#[async_trait]
pub trait LocalityStore: Send {
    async fn upsert_region(&mut self, request: &RegionUpsertDBRequest) -> DbResult<RegionDBResponse>;
    async fn upsert_state(&mut self, request: &StateUpsertDBRequest) -> DbResult<StateDBResponse>;
    async fn upsert_municipality(&mut self, request: &MunicipalityUpsertDBRequest) -> DbResult<MunicipalityDBResponse>;
}

#[async_trait]
impl LocalityStore for PgConnection {
    async fn upsert_region(&mut self, request: &RegionUpsertDBRequest) -> DbResult<RegionDBResponse> {
        Regions::new(self).upsert(request).await
    }

    async fn upsert_state(&mut self, request: &StateUpsertDBRequest) -> DbResult<StateDBResponse> {
        States::new(self).upsert(request).await
    }

    async fn upsert_municipality(&mut self, request: &MunicipalityUpsertDBRequest) -> DbResult<MunicipalityDBResponse> {
        Municipalities::new(self).upsert(request).await
    }
}

/// Upsert a region by id with its abbreviation and name.
#[instrument(skip(store, payload, actor), fields(region_id = payload.id), err)]
pub async fn ensure_region<S>(store: &mut S, payload: &RegionPayload, actor: &Actor) -> Result<RegionDBResponse, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let request = RegionUpsertDBRequest {
        id: payload.id,
        abbreviation: payload.abbreviation.clone(),
        name: payload.name.clone(),
        actor: actor.clone(),
    };
    Ok(store.upsert_region(&request).await?)
}

/// Upsert a state, ensuring its embedded region first. No embedded region means no region link.
#[instrument(skip(store, payload, actor), fields(state_id = payload.id), err)]
pub async fn ensure_state<S>(store: &mut S, payload: &StatePayload, actor: &Actor) -> Result<StateDBResponse, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let region_id = match &payload.region {
        Some(region) => Some(ensure_region(store, region, actor).await?.id),
        None => None,
    };

    let request = StateUpsertDBRequest {
        id: payload.id,
        abbreviation: payload.abbreviation.clone(),
        name: payload.name.clone(),
        region_id,
        actor: actor.clone(),
    };
    Ok(store.upsert_state(&request).await?)
}

/// Upsert a municipality, ensuring the state it references first.
///
/// A state reference that is not an object with a numeric `id` is rejected. A payload with no
/// state reference at all is stored without a state.
#[instrument(skip(store, payload, actor), fields(municipality_id = payload.id), err)]
pub async fn ensure_municipality<S>(store: &mut S, payload: &MunicipalityPayload, actor: &Actor) -> Result<MunicipalityDBResponse, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let state_id = match payload.state_reference() {
        Some(reference) => {
            let state = StatePayload::parse(reference).map_err(|e| SyncError::Validation {
                level: Level::Municipalities,
                message: format!("municipality {} has an unusable state reference {reference}: {e}", payload.id),
            })?;
            Some(ensure_state(store, &state, actor).await?.id)
        }
        None => {
            warn!("Municipality {} carries no state reference, storing without state", payload.id);
            None
        }
    };

    let request = MunicipalityUpsertDBRequest {
        id: payload.id,
        name: payload.name.clone(),
        state_id,
        actor: actor.clone(),
    };
    Ok(store.upsert_municipality(&request).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLocalityStore;
    use serde_json::json;

    fn municipality(value: serde_json::Value) -> MunicipalityPayload {
        MunicipalityPayload::parse(&value).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_state_creates_region_first() {
        let mut store = MockLocalityStore::new();
        let payload = StatePayload::parse(&json!({
            "id": 35,
            "sigla": "SP",
            "nome": "São Paulo",
            "regiao": {"id": 3, "sigla": "SE", "nome": "Sudeste"}
        }))
        .unwrap();

        let state = ensure_state(&mut store, &payload, &None).await.unwrap();
        assert_eq!(state.abbreviation, "SP");
        assert_eq!(state.region_id, Some(3));
        assert_eq!(store.region(3).unwrap().name, "Sudeste");
        assert_eq!(store.writes(), vec!["region:3", "state:35"]);
    }

    #[tokio::test]
    async fn test_ensure_region_is_idempotent() {
        let mut store = MockLocalityStore::new();
        let payload = RegionPayload::parse(&json!({"id": 1, "sigla": "N", "nome": "Norte"})).unwrap();

        ensure_region(&mut store, &payload, &None).await.unwrap();
        ensure_region(&mut store, &payload, &None).await.unwrap();

        assert_eq!(store.region_count(), 1);
        assert_eq!(store.region(1).unwrap().abbreviation, "N");
    }

    #[tokio::test]
    async fn test_ensure_municipality_via_micro_region() {
        let mut store = MockLocalityStore::new();
        let payload = municipality(json!({
            "id": 3550308,
            "nome": "São Paulo",
            "microrregiao": {"mesorregiao": {"UF": {
                "id": 35, "sigla": "SP", "nome": "São Paulo",
                "regiao": {"id": 3, "sigla": "SE", "nome": "Sudeste"}
            }}}
        }));

        let saved = ensure_municipality(&mut store, &payload, &Some("sync".to_string())).await.unwrap();
        assert_eq!(saved.state_id, Some(35));
        assert_eq!(store.state(35).unwrap().region_id, Some(3));
        assert_eq!(store.writes(), vec!["region:3", "state:35", "municipality:3550308"]);
    }

    #[tokio::test]
    async fn test_ensure_municipality_via_immediate_region() {
        let mut store = MockLocalityStore::new();
        let payload = municipality(json!({
            "id": 5300108,
            "nome": "Brasília",
            "microrregiao": null,
            "regiao-imediata": {"regiao-intermediaria": {"UF": {
                "id": 53, "sigla": "DF", "nome": "Distrito Federal",
                "regiao": {"id": 5, "sigla": "CO", "nome": "Centro-Oeste"}
            }}}
        }));

        let saved = ensure_municipality(&mut store, &payload, &None).await.unwrap();
        assert_eq!(saved.state_id, Some(53));
        assert_eq!(store.region(5).unwrap().abbreviation, "CO");
    }

    #[tokio::test]
    async fn test_ensure_municipality_without_reference_has_no_state() {
        let mut store = MockLocalityStore::new();
        let payload = municipality(json!({"id": 1, "nome": "Sem UF"}));

        let saved = ensure_municipality(&mut store, &payload, &None).await.unwrap();
        assert_eq!(saved.state_id, None);
        assert_eq!(store.state_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_municipality_rejects_bare_state_code() {
        let mut store = MockLocalityStore::new();
        let payload = municipality(json!({
            "id": 3550308,
            "nome": "São Paulo",
            "microrregiao": {"mesorregiao": {"UF": 35}}
        }));

        let err = ensure_municipality(&mut store, &payload, &None).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation { level: Level::Municipalities, .. }));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_municipality_rejects_state_without_id() {
        let mut store = MockLocalityStore::new();
        let payload = municipality(json!({
            "id": 3550308,
            "microrregiao": {"mesorregiao": {"UF": {"sigla": "SP"}}}
        }));

        assert!(ensure_municipality(&mut store, &payload, &None).await.is_err());
    }
}
