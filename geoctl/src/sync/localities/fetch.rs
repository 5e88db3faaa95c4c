//! Remote locality client for the IBGE locality API.

use crate::config::IbgeConfig;
use crate::sync::http::{HttpClients, ensure_slash};
use crate::types::Level;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

/// Public IBGE locality service
pub const IBGE_LOCALITIES_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build locality URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Relative endpoint for a level. The entity id wins over the parent id; regions have no parent.
pub fn endpoint_path(level: Level, id: Option<i32>, parent_id: Option<i32>) -> String {
    match (level, id, parent_id) {
        (level, Some(id), _) => format!("{}/{id}", level.segment()),
        (Level::Regions, None, _) => "regioes".to_string(),
        (Level::States, None, Some(region_id)) => format!("regioes/{region_id}/estados"),
        (Level::Municipalities, None, Some(state_id)) => format!("estados/{state_id}/municipios"),
        (level, None, None) => level.segment().to_string(),
    }
}

/// Read-only access to the upstream locality hierarchy.
///
/// Returns the raw JSON document: a single object when an entity id is given, otherwise an array.
/// Shape checks are left to the reconciler.
#[async_trait]
pub trait FetchLocalities: Send + Sync {
    async fn fetch(&self, level: Level, id: Option<i32>, parent_id: Option<i32>, verify: bool) -> Result<Value, FetchError>;
}

/// The concrete implementation of `FetchLocalities`, over reqwest.
#[derive(Debug, Clone)]
pub struct FetchLocalitiesReqwest {
    clients: HttpClients,
    base_url: Url,
}

impl FetchLocalitiesReqwest {
    pub fn new(config: &IbgeConfig) -> reqwest::Result<Self> {
        Ok(Self {
            clients: HttpClients::new(config.request_timeout)?,
            base_url: ensure_slash(&config.base_url),
        })
    }

    fn url_for(&self, level: Level, id: Option<i32>, parent_id: Option<i32>) -> Result<Url, FetchError> {
        let mut url = self.base_url.join(&endpoint_path(level, id, parent_id))?;
        url.query_pairs_mut().append_pair("orderBy", "nome");
        Ok(url)
    }
}

#[async_trait]
impl FetchLocalities for FetchLocalitiesReqwest {
    #[instrument(skip(self), err)]
    async fn fetch(&self, level: Level, id: Option<i32>, parent_id: Option<i32>, verify: bool) -> Result<Value, FetchError> {
        let url = self.url_for(level, id, parent_id)?;
        debug!("Fetching {} from {}", level, url);

        let response = self
            .clients
            .get(verify)
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("IBGE request to {} failed with status {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| {
            error!("Failed to parse IBGE response as JSON: {}", source);
            debug!("Response body was: {}", body);
            FetchError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}
