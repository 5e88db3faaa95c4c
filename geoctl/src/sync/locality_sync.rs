use crate::db::models::{municipalities::MunicipalityDBResponse, regions::RegionDBResponse, states::StateDBResponse};
use crate::sync::SyncError;
use crate::sync::localities::{
    FetchLocalities, LocalityStore, MunicipalityPayload, RegionPayload, StatePayload, ensure_municipality, ensure_region,
    ensure_state, normalize_payload,
};
use crate::types::{Actor, Level};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// What to fetch from IBGE for one sync call.
///
/// `ids` takes priority: each id is fetched on its own. Otherwise a single request is made for
/// `id`, else for everything under `parent_id`, else for the whole level. `parent_id` is ignored
/// for regions.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub id: Option<i32>,
    pub parent_id: Option<i32>,
    #[serde(default)]
    pub ids: Vec<i32>,
    /// Verify upstream TLS certificates. The API fills in `ibge.verify_certificates` when absent;
    /// library callers that leave it unset get verification.
    pub verify: Option<bool>,
    #[serde(skip)]
    pub actor: Actor,
}

impl SyncRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn one(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn under(parent_id: i32) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn many(ids: Vec<i32>) -> Self {
        Self { ids, ..Self::default() }
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn verifies_certificates(&self) -> bool {
        self.verify.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncSummary {
    pub level: Level,
    /// Number of entities upserted, in fetch order (duplicates included)
    pub count: usize,
    pub ids: Vec<i32>,
    pub synced_at: DateTime<Utc>,
}

impl SyncSummary {
    pub fn new(level: Level, ids: Vec<i32>) -> Self {
        let summary = Self {
            level,
            count: ids.len(),
            ids,
            synced_at: Utc::now(),
        };
        info!("Synchronized {} {} from IBGE", summary.count, summary.level);
        summary
    }
}

/// Fetch every payload a request asks for, flattened in request order.
///
/// Requests are sequential and nothing is written, so a transport failure leaves the database
/// untouched.
#[instrument(skip(fetcher, request), fields(ids = request.ids.len()), err)]
pub async fn fetch_payloads<F>(fetcher: &F, level: Level, request: &SyncRequest) -> Result<Vec<Value>, SyncError>
where
    F: FetchLocalities + ?Sized,
{
    let parent_id = match level {
        Level::Regions => None,
        _ => request.parent_id,
    };
    let verify = request.verifies_certificates();

    let documents = if request.ids.is_empty() {
        vec![fetch_one(fetcher, level, request.id, parent_id, verify).await?]
    } else {
        let mut documents = Vec::with_capacity(request.ids.len());
        for id in &request.ids {
            documents.push(fetch_one(fetcher, level, Some(*id), None, verify).await?);
        }
        documents
    };

    let mut payloads = Vec::new();
    for document in documents {
        payloads.extend(normalize_payload(level, document)?);
    }
    Ok(payloads)
}

async fn fetch_one<F>(fetcher: &F, level: Level, id: Option<i32>, parent_id: Option<i32>, verify: bool) -> Result<Value, SyncError>
where
    F: FetchLocalities + ?Sized,
{
    fetcher
        .fetch(level, id, parent_id, verify)
        .await
        .map_err(|source| SyncError::Transport { level, source })
}

pub async fn reconcile_regions<S>(store: &mut S, payloads: &[Value], actor: &Actor) -> Result<Vec<RegionDBResponse>, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let mut regions = Vec::with_capacity(payloads.len());
    for payload in payloads {
        regions.push(ensure_region(store, &RegionPayload::parse(payload)?, actor).await?);
    }
    Ok(regions)
}

pub async fn reconcile_states<S>(store: &mut S, payloads: &[Value], actor: &Actor) -> Result<Vec<StateDBResponse>, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let mut states = Vec::with_capacity(payloads.len());
    for payload in payloads {
        states.push(ensure_state(store, &StatePayload::parse(payload)?, actor).await?);
    }
    Ok(states)
}

pub async fn reconcile_municipalities<S>(store: &mut S, payloads: &[Value], actor: &Actor) -> Result<Vec<MunicipalityDBResponse>, SyncError>
where
    S: LocalityStore + ?Sized,
{
    let mut municipalities = Vec::with_capacity(payloads.len());
    for payload in payloads {
        municipalities.push(ensure_municipality(store, &MunicipalityPayload::parse(payload)?, actor).await?);
    }
    Ok(municipalities)
}

/// Synchronize regions from IBGE. All-or-nothing: any failure leaves no partial writes.
#[instrument(skip(pool, fetcher, request), err)]
pub async fn sync_regions<F>(pool: &PgPool, fetcher: &F, request: &SyncRequest) -> Result<Vec<RegionDBResponse>, SyncError>
where
    F: FetchLocalities + ?Sized,
{
    let payloads = fetch_payloads(fetcher, Level::Regions, request).await?;

    let mut tx = pool.begin().await?;
    let regions = reconcile_regions(&mut *tx, &payloads, &request.actor).await?;
    tx.commit().await?;

    Ok(regions)
}

/// Synchronize states (and their regions) from IBGE in one transaction.
#[instrument(skip(pool, fetcher, request), err)]
pub async fn sync_states<F>(pool: &PgPool, fetcher: &F, request: &SyncRequest) -> Result<Vec<StateDBResponse>, SyncError>
where
    F: FetchLocalities + ?Sized,
{
    let payloads = fetch_payloads(fetcher, Level::States, request).await?;

    let mut tx = pool.begin().await?;
    let states = reconcile_states(&mut *tx, &payloads, &request.actor).await?;
    tx.commit().await?;

    Ok(states)
}

/// Synchronize municipalities (and their states and regions) from IBGE in one transaction.
#[instrument(skip(pool, fetcher, request), err)]
pub async fn sync_municipalities<F>(
    pool: &PgPool,
    fetcher: &F,
    request: &SyncRequest,
) -> Result<Vec<MunicipalityDBResponse>, SyncError>
where
    F: FetchLocalities + ?Sized,
{
    let payloads = fetch_payloads(fetcher, Level::Municipalities, request).await?;

    let mut tx = pool.begin().await?;
    let municipalities = reconcile_municipalities(&mut *tx, &payloads, &request.actor).await?;
    tx.commit().await?;

    Ok(municipalities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::municipalities::MunicipalityFilter;
    use crate::db::handlers::regions::RegionFilter;
    use crate::db::handlers::{Municipalities, Regions, Repository, States};
    use crate::sync::localities::FetchError;
    use crate::test_utils::{MockLocalities, MockLocalityStore, five_regions, sao_paulo_state};
    use serde_json::json;
    use sqlx::PgPool;

    fn municipality(id: i32, name: &str) -> Value {
        json!({
            "id": id,
            "nome": name,
            "microrregiao": {"mesorregiao": {"UF": sao_paulo_state()}}
        })
    }

    #[tokio::test]
    async fn test_fetch_payloads_with_ids_fetches_each() {
        let fetcher = MockLocalities::new();
        fetcher.respond("estados/35", sao_paulo_state());
        fetcher.respond("estados/33", json!({"id": 33, "sigla": "RJ", "nome": "Rio de Janeiro"}));

        let payloads = fetch_payloads(&fetcher, Level::States, &SyncRequest::many(vec![35, 33]))
            .await
            .unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0]["sigla"], "SP");
        assert_eq!(payloads[1]["sigla"], "RJ");
        assert_eq!(fetcher.calls(), vec!["estados/35", "estados/33"]);
    }

    #[tokio::test]
    async fn test_fetch_payloads_id_wins_over_parent() {
        let fetcher = MockLocalities::new();
        fetcher.respond("estados/35", sao_paulo_state());

        let request = SyncRequest {
            id: Some(35),
            parent_id: Some(3),
            ..SyncRequest::default()
        };
        let payloads = fetch_payloads(&fetcher, Level::States, &request).await.unwrap();

        assert_eq!(payloads.len(), 1);
        assert_eq!(fetcher.calls(), vec!["estados/35"]);
    }

    #[tokio::test]
    async fn test_fetch_payloads_ignores_parent_for_regions() {
        let fetcher = MockLocalities::new();
        fetcher.respond("regioes", five_regions());

        let payloads = fetch_payloads(&fetcher, Level::Regions, &SyncRequest::under(3)).await.unwrap();

        assert_eq!(payloads.len(), 5);
        assert_eq!(fetcher.calls(), vec!["regioes"]);
    }

    #[tokio::test]
    async fn test_fetch_payloads_reads_verify_from_request() {
        let fetcher = MockLocalities::new();
        fetcher.respond("regioes", five_regions());

        fetch_payloads(&fetcher, Level::Regions, &SyncRequest::all()).await.unwrap();
        fetch_payloads(&fetcher, Level::Regions, &SyncRequest::all().with_verify(false))
            .await
            .unwrap();
        fetch_payloads(&fetcher, Level::Regions, &SyncRequest::all().with_verify(true))
            .await
            .unwrap();

        assert_eq!(fetcher.verify_flags(), vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_fetch_payloads_stops_at_first_transport_error() {
        let fetcher = MockLocalities::new();
        fetcher.respond("municipios/1", municipality(1, "Um"));
        fetcher.respond("municipios/2", municipality(2, "Dois"));

        let err = fetch_payloads(&fetcher, Level::Municipalities, &SyncRequest::many(vec![1, 2, 3, 4, 5]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Transport {
                level: Level::Municipalities,
                source: FetchError::Status { .. }
            }
        ));
        assert_eq!(fetcher.calls(), vec!["municipios/1", "municipios/2", "municipios/3"]);
    }

    #[tokio::test]
    async fn test_reconcile_keeps_fetch_order_and_duplicates() {
        let mut store = MockLocalityStore::new();
        let payloads = vec![
            json!({"id": 2, "sigla": "NE", "nome": "Nordeste"}),
            json!({"id": 1, "sigla": "N", "nome": "Norte"}),
            json!({"id": 2, "sigla": "NE", "nome": "Região Nordeste"}),
        ];

        let regions = reconcile_regions(&mut store, &payloads, &None).await.unwrap();

        assert_eq!(regions.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1, 2]);
        assert_eq!(store.region_count(), 2);
        assert_eq!(store.region(2).unwrap().name, "Região Nordeste");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_regions_fixed_five(pool: PgPool) {
        let fetcher = MockLocalities::new();
        fetcher.respond("regioes", five_regions());

        let regions = sync_regions(&pool, &fetcher, &SyncRequest::all()).await.unwrap();
        assert_eq!(regions.len(), 5);

        // Second run refreshes in place
        sync_regions(&pool, &fetcher, &SyncRequest::all()).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(Regions::new(&mut conn).count(&RegionFilter::new(0, 10)).await.unwrap(), 5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_state_by_id_creates_region(pool: PgPool) {
        let fetcher = MockLocalities::new();
        fetcher.respond("estados/35", sao_paulo_state());

        let request = SyncRequest {
            actor: Some("admin@example.com".to_string()),
            ..SyncRequest::one(35).with_verify(false)
        };
        let states = sync_states(&pool, &fetcher, &request).await.unwrap();

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].abbreviation, "SP");
        assert_eq!(states[0].audit.created_by.as_deref(), Some("admin@example.com"));
        assert_eq!(fetcher.verify_flags(), vec![false]);

        let mut conn = pool.acquire().await.unwrap();
        let region = Regions::new(&mut conn).get_by_id(3).await.unwrap().unwrap();
        assert_eq!(region.abbreviation, "SE");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_municipalities_of_state(pool: PgPool) {
        let fetcher = MockLocalities::new();
        let listed: Vec<Value> = (0..12).map(|i| municipality(3500100 + i, &format!("Municipio {i:02}"))).collect();
        fetcher.respond("estados/35/municipios", Value::Array(listed));

        let municipalities = sync_municipalities(&pool, &fetcher, &SyncRequest::under(35)).await.unwrap();

        assert!(municipalities.len() > 10);
        assert!(municipalities.iter().all(|m| m.state_id == Some(35)));

        let mut conn = pool.acquire().await.unwrap();
        let state = States::new(&mut conn).get_by_id(35).await.unwrap().unwrap();
        assert_eq!(state.region_id, Some(3));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_is_atomic_when_third_of_five_is_invalid(pool: PgPool) {
        let fetcher = MockLocalities::new();
        let mut listed: Vec<Value> = (1..=5).map(|i| municipality(i, &format!("Municipio {i}"))).collect();
        listed[2] = json!({"id": 3, "nome": "Quebrado", "microrregiao": {"mesorregiao": {"UF": 35}}});
        fetcher.respond("estados/35/municipios", Value::Array(listed));

        let err = sync_municipalities(&pool, &fetcher, &SyncRequest::under(35)).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));

        let mut conn = pool.acquire().await.unwrap();
        let count = Municipalities::new(&mut conn).count(&MunicipalityFilter::new(0, 10)).await.unwrap();
        assert_eq!(count, 0);
        assert!(States::new(&mut conn).get_by_id(35).await.unwrap().is_none());
        assert!(Regions::new(&mut conn).get_by_id(3).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_is_atomic_when_third_fetch_fails(pool: PgPool) {
        let fetcher = MockLocalities::new();
        for id in [1, 2, 4, 5] {
            fetcher.respond(&format!("municipios/{id}"), municipality(id, "Ok"));
        }

        let err = sync_municipalities(&pool, &fetcher, &SyncRequest::many(vec![1, 2, 3, 4, 5]))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Transport { .. }));

        let mut conn = pool.acquire().await.unwrap();
        let count = Municipalities::new(&mut conn).count(&MunicipalityFilter::new(0, 10)).await.unwrap();
        assert_eq!(count, 0);
    }
}
