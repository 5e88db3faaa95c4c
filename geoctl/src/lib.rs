//! # geoctl: Brazilian locality administration
//!
//! `geoctl` keeps a local copy of the Brazilian territorial hierarchy (macro-region, state,
//! municipality) in PostgreSQL, synchronized on demand from the
//! [IBGE locality API](https://servicodados.ibge.gov.br/api/docs/localidades), and exposes an
//! admin HTTP API for browsing, correcting and extending it alongside a handful of reference
//! entities (colors, genders, phone and address types, addresses, phones).
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); all persistence goes through
//! PostgreSQL via sqlx, with the schema applied from `migrations/` at startup.
//!
//! The **API layer** ([`api`]) serves `/admin/api/v1/*`. List endpoints are paginated with
//! `skip`/`limit` and the locality lists carry the filters needed for cascading region → state →
//! municipality selects.
//!
//! The **sync layer** ([`sync`]) fetches JSON from IBGE and upserts it bottom-up: a municipality
//! payload carries its state, which carries its region, and every missing or stale parent is
//! written before the child. All fetching happens before the transaction opens, so a failed
//! request never leaves a partial sync behind.
//!
//! The **database layer** ([`db`]) uses one repository per table, each wrapping a borrowed
//! `PgConnection` so the same code runs on a pool connection or inside a transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use geoctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = geoctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     geoctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config).await?.serve(async {
//!         tokio::signal::ctrl_c().await.ok();
//!     }).await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
use crate::config::CorsOrigin;

#[cfg(test)]
pub mod test_utils;

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod sync;
pub mod telemetry;
pub mod types;
pub mod validation;

use crate::openapi::AdminApiDoc;
use crate::sync::localities::{FetchLocalities, FetchLocalitiesReqwest};
use crate::sync::state_images::StateImages;
use axum::http::HeaderValue;
use axum::{
    Extension, Json, Router, http,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use types::Level as Entity;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .localities(Arc::new(FetchLocalitiesReqwest::new(&config.ibge)?))
///     .state_images(Arc::new(StateImages::new(&config.images)?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// IBGE client; swapped for an in-memory double in tests
    pub localities: Arc<dyn FetchLocalities>,
    pub state_images: Arc<StateImages>,
}

/// Get the geoctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn seconds_or_none(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Connect using the configured pool settings and apply pending migrations.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds_or_none(settings.idle_timeout_secs))
        .max_lifetime(seconds_or_none(settings.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Create CORS layer from configuration. A `*` entry allows any origin.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::HeaderName::try_from(config.auth.proxy_header.header_name.as_str())?,
        ])
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the router: the admin API under `/admin/api/v1`, its OpenAPI document and interactive
/// docs, the health check, CORS and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{actions, address_types, addresses, colors, genders, municipalities, phone_types, phones, regions, states};

    let api_routes = Router::new()
        // Localities
        .route("/regions", get(regions::list_regions).post(regions::create_region))
        .route("/regions/sync", post(regions::synchronize_regions))
        .route(
            "/regions/{id}",
            get(regions::get_region).patch(regions::update_region).delete(regions::delete_region),
        )
        .route("/states", get(states::list_states).post(states::create_state))
        .route("/states/sync", post(states::synchronize_states))
        .route("/states/images", post(states::update_images))
        .route(
            "/states/{id}",
            get(states::get_state).patch(states::update_state).delete(states::delete_state),
        )
        .route(
            "/municipalities",
            get(municipalities::list_municipalities).post(municipalities::create_municipality),
        )
        .route("/municipalities/sync", post(municipalities::synchronize_municipalities))
        .route(
            "/municipalities/{id}",
            get(municipalities::get_municipality)
                .patch(municipalities::update_municipality)
                .delete(municipalities::delete_municipality),
        )
        // Bulk actions, one mount per entity
        .route(
            "/regions/actions/{action}",
            post(actions::run_action).layer(Extension(Entity::Regions)),
        )
        .route(
            "/states/actions/{action}",
            post(actions::run_action).layer(Extension(Entity::States)),
        )
        .route(
            "/municipalities/actions/{action}",
            post(actions::run_action).layer(Extension(Entity::Municipalities)),
        )
        // Reference data
        .route("/colors", get(colors::list_colors).post(colors::create_color))
        .route(
            "/colors/{id}",
            get(colors::get_color).patch(colors::update_color).delete(colors::delete_color),
        )
        .route("/genders", get(genders::list_genders).post(genders::create_gender))
        .route(
            "/genders/{abbreviation}",
            get(genders::get_gender).patch(genders::update_gender).delete(genders::delete_gender),
        )
        .route("/phone-types", get(phone_types::list_phone_types).post(phone_types::create_phone_type))
        .route(
            "/phone-types/{id}",
            get(phone_types::get_phone_type)
                .patch(phone_types::update_phone_type)
                .delete(phone_types::delete_phone_type),
        )
        .route(
            "/address-types",
            get(address_types::list_address_types).post(address_types::create_address_type),
        )
        .route(
            "/address-types/{id}",
            get(address_types::get_address_type)
                .patch(address_types::update_address_type)
                .delete(address_types::delete_address_type),
        )
        .route("/addresses", get(addresses::list_addresses).post(addresses::create_address))
        .route(
            "/addresses/{id}",
            get(addresses::get_address).patch(addresses::update_address).delete(addresses::delete_address),
        )
        .route("/phones", get(phones::list_phones).post(phones::create_phone))
        .route(
            "/phones/{id}",
            get(phones::get_phone).patch(phones::update_phone).delete(phones::delete_phone),
        )
        .route("/openapi.json", get(|| async { Json(AdminApiDoc::openapi()) }))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/admin/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", AdminApiDoc::openapi()));

    let router = router.layer(create_cors_layer(&state.config)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Connect to the database, run migrations and build the router
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting geoctl with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Build the application around an existing, already migrated pool
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let localities = FetchLocalitiesReqwest::new(&config.ibge)?;
        let state_images = StateImages::new(&config.images)?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .localities(Arc::new(localities))
            .state_images(Arc::new(state_images))
            .build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "geoctl listening on http://{}, docs at http://localhost:{}/admin/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![
            CorsOrigin::Wildcard,
            CorsOrigin::Url(url::Url::parse("http://localhost:5173").unwrap()),
        ];
        assert!(create_cors_layer(&config).is_ok());

        config.auth.proxy_header.header_name = "not a header".to_string();
        assert!(create_cors_layer(&config).is_err());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_docs_and_health_are_served(pool: PgPool) {
        let app = Application::new_with_pool(create_test_config(), pool).unwrap();
        let server = axum_test::TestServer::new(app.router).unwrap();

        server.get("/healthz").await.assert_status_ok();
        server.get("/admin/docs").await.assert_status_ok();

        let doc = server.get("/admin/api/v1/openapi.json").await;
        doc.assert_status_ok();
        assert!(doc.text().contains("geoctl Admin API"));
    }
}
