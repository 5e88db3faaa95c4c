//! Test doubles and app constructors shared by unit and handler tests.

use crate::config::Config;
use crate::db::errors::Result as DbResult;
use crate::db::models::AuditFields;
use crate::db::models::{
    municipalities::{MunicipalityDBResponse, MunicipalityUpsertDBRequest},
    regions::{RegionDBResponse, RegionUpsertDBRequest},
    states::{StateDBResponse, StateUpsertDBRequest},
};
use crate::sync::localities::{FetchError, FetchLocalities, LocalityStore, endpoint_path};
use crate::sync::state_images::StateImages;
use crate::types::{Actor, Level, MunicipalityId, RegionId, StateId};
use crate::{AppState, build_router};
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "postgres://localhost/geoctl_test".to_string();
    config.auth.proxy_header.enabled = false;
    config
}

pub async fn create_test_app(pool: PgPool) -> (TestServer, Arc<MockLocalities>) {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Build the full router over `pool` with IBGE replaced by a [`MockLocalities`].
pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> (TestServer, Arc<MockLocalities>) {
    let localities = Arc::new(MockLocalities::new());
    let state_images = StateImages::new(&config.images).expect("Failed to build image client");

    let state = AppState::builder()
        .db(pool)
        .config(config)
        .localities(localities.clone())
        .state_images(Arc::new(state_images))
        .build();
    let router = build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, localities)
}

/// The five macro-regions as IBGE returns them from `regioes`.
pub fn five_regions() -> Value {
    json!([
        {"id": 1, "sigla": "N", "nome": "Norte"},
        {"id": 2, "sigla": "NE", "nome": "Nordeste"},
        {"id": 3, "sigla": "SE", "nome": "Sudeste"},
        {"id": 4, "sigla": "S", "nome": "Sul"},
        {"id": 5, "sigla": "CO", "nome": "Centro-Oeste"}
    ])
}

/// São Paulo as IBGE returns it from `estados/35`.
pub fn sao_paulo_state() -> Value {
    json!({
        "id": 35,
        "sigla": "SP",
        "nome": "São Paulo",
        "regiao": {"id": 3, "sigla": "SE", "nome": "Sudeste"}
    })
}

/// Canned IBGE responses keyed by endpoint path (`regioes`, `estados/35`, ...).
///
/// Unknown paths answer 404. Every call is recorded along with its `verify` flag.
#[derive(Default)]
pub struct MockLocalities {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MockLocalities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(path, _)| path.clone()).collect()
    }

    pub fn verify_flags(&self) -> Vec<bool> {
        self.calls.lock().unwrap().iter().map(|(_, verify)| *verify).collect()
    }
}

#[async_trait]
impl FetchLocalities for MockLocalities {
    async fn fetch(&self, level: Level, id: Option<i32>, parent_id: Option<i32>, verify: bool) -> Result<Value, FetchError> {
        let path = endpoint_path(level, id, parent_id);
        self.calls.lock().unwrap().push((path.clone(), verify));

        self.responses
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("mock://ibge/{path}"),
                status: reqwest::StatusCode::NOT_FOUND,
                body: "[]".to_string(),
            })
    }
}

fn audit(actor: &Actor) -> AuditFields {
    let now = Utc::now();
    AuditFields {
        created_at: now,
        created_by: actor.clone(),
        updated_at: now,
        updated_by: actor.clone(),
        deleted_at: None,
        deleted_by: None,
        is_active: true,
    }
}

/// In-memory [`LocalityStore`] that records the order of writes as `level:id`.
#[derive(Default)]
pub struct MockLocalityStore {
    regions: HashMap<RegionId, RegionDBResponse>,
    states: HashMap<StateId, StateDBResponse>,
    municipalities: HashMap<MunicipalityId, MunicipalityDBResponse>,
    writes: Vec<String>,
}

impl MockLocalityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, id: RegionId) -> Option<&RegionDBResponse> {
        self.regions.get(&id)
    }

    pub fn state(&self, id: StateId) -> Option<&StateDBResponse> {
        self.states.get(&id)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.clone()
    }
}

#[async_trait]
impl LocalityStore for MockLocalityStore {
    async fn upsert_region(&mut self, request: &RegionUpsertDBRequest) -> DbResult<RegionDBResponse> {
        self.writes.push(format!("region:{}", request.id));
        let region = RegionDBResponse {
            id: request.id,
            abbreviation: request.abbreviation.clone(),
            name: request.name.clone(),
            description: String::new(),
            mesh_url: String::new(),
            audit: audit(&request.actor),
        };
        self.regions.insert(region.id, region.clone());
        Ok(region)
    }

    async fn upsert_state(&mut self, request: &StateUpsertDBRequest) -> DbResult<StateDBResponse> {
        self.writes.push(format!("state:{}", request.id));
        let state = StateDBResponse {
            id: request.id,
            region_id: request.region_id,
            abbreviation: request.abbreviation.clone(),
            name: request.name.clone(),
            description: String::new(),
            mesh_url: String::new(),
            flag_path: None,
            coat_of_arms_path: None,
            audit: audit(&request.actor),
        };
        self.states.insert(state.id, state.clone());
        Ok(state)
    }

    async fn upsert_municipality(&mut self, request: &MunicipalityUpsertDBRequest) -> DbResult<MunicipalityDBResponse> {
        self.writes.push(format!("municipality:{}", request.id));
        let municipality = MunicipalityDBResponse {
            id: request.id,
            state_id: request.state_id,
            name: request.name.clone(),
            mesh_url: String::new(),
            audit: audit(&request.actor),
        };
        self.municipalities.insert(municipality.id, municipality.clone());
        Ok(municipality)
    }
}
