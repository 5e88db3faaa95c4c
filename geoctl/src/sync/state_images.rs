//! Flag and coat of arms images for states.
//!
//! URLs come from the `images.*_url_template` settings. Both images are downloaded before anything
//! is written, then stored under `images.media_root` at
//! `estados/bandeiras/{sigla}_bandeira.png` and `estados/brasoes/{sigla}_brasao.png`, and the
//! relative paths are recorded on the state row.

use crate::config::ImagesConfig;
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, States};
use crate::db::models::states::StateDBResponse;
use crate::sync::http::HttpClients;
use crate::sync::localities::FetchError;
use crate::types::{Actor, StateId};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

const FLAG_DIR: &str = "estados/bandeiras";
const COAT_OF_ARMS_DIR: &str = "estados/brasoes";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("state images are not configured: set images.{field}")]
    NotConfigured { field: &'static str },

    #[error("state {state_id} has no abbreviation to name its images after")]
    MissingAbbreviation { state_id: StateId },

    #[error("failed to download image for state {state}: {source}")]
    Download {
        state: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for ImageError {
    fn from(err: sqlx::Error) -> Self {
        ImageError::Database(err.into())
    }
}

/// Which states to refresh images for
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StateSelection {
    Ids(Vec<StateId>),
    Abbreviations(Vec<String>),
    All,
}

/// Substitute `{sigla}`, `{SIGLA}` and `{size}` in an image URL template.
pub fn render_template(template: &str, abbreviation: &str, size: u32) -> String {
    template
        .replace("{sigla}", &abbreviation.to_lowercase())
        .replace("{SIGLA}", &abbreviation.to_uppercase())
        .replace("{size}", &size.to_string())
}

/// Relative storage paths for a state's flag and coat of arms
pub fn image_paths(abbreviation: &str) -> (String, String) {
    let sigla = abbreviation.to_lowercase();
    (
        format!("{FLAG_DIR}/{sigla}_bandeira.png"),
        format!("{COAT_OF_ARMS_DIR}/{sigla}_brasao.png"),
    )
}

#[derive(Debug, Clone)]
pub struct StateImages {
    clients: HttpClients,
    config: ImagesConfig,
}

impl StateImages {
    pub fn new(config: &ImagesConfig) -> reqwest::Result<Self> {
        Ok(Self {
            clients: HttpClients::new(config.request_timeout)?,
            config: config.clone(),
        })
    }

    pub fn media_root(&self) -> &Path {
        &self.config.media_root
    }

    fn templates(&self) -> Result<(&str, &str), ImageError> {
        let flag = self
            .config
            .flag_url_template
            .as_deref()
            .ok_or(ImageError::NotConfigured { field: "flag_url_template" })?;
        let coat_of_arms = self
            .config
            .coat_of_arms_url_template
            .as_deref()
            .ok_or(ImageError::NotConfigured {
                field: "coat_of_arms_url_template",
            })?;
        Ok((flag, coat_of_arms))
    }

    async fn download(&self, url: &str, verify: bool) -> Result<Vec<u8>, FetchError> {
        debug!("Downloading state image from {}", url);
        let response = self
            .clients
            .get(verify)
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, relative: &str, contents: &[u8]) -> Result<(), ImageError> {
        let path = self.config.media_root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| ImageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| ImageError::Io { path, source })
    }

    /// Download both images for one state and write them under the media root. Returns the
    /// relative flag and coat of arms paths. Nothing is written unless both downloads succeed.
    async fn fetch_and_store(&self, state: &StateDBResponse, size: u32, verify: bool) -> Result<(String, String), ImageError> {
        let (flag_template, coat_of_arms_template) = self.templates()?;
        let abbreviation = state.abbreviation.trim();
        if abbreviation.is_empty() {
            return Err(ImageError::MissingAbbreviation { state_id: state.id });
        }
        let download_error = |source| ImageError::Download {
            state: abbreviation.to_string(),
            source,
        };

        let flag = self
            .download(&render_template(flag_template, abbreviation, size), verify)
            .await
            .map_err(download_error)?;
        let coat_of_arms = self
            .download(&render_template(coat_of_arms_template, abbreviation, size), verify)
            .await
            .map_err(download_error)?;

        let (flag_path, coat_of_arms_path) = image_paths(abbreviation);
        self.write(&flag_path, &flag).await?;
        self.write(&coat_of_arms_path, &coat_of_arms).await?;
        Ok((flag_path, coat_of_arms_path))
    }

    /// Download and store both images for one state. `size` defaults to `images.size`.
    #[instrument(skip(self, conn, state, actor), fields(state_id = state.id, abbreviation = %state.abbreviation), err)]
    pub async fn update_state_images(
        &self,
        conn: &mut PgConnection,
        state: &StateDBResponse,
        size: Option<u32>,
        verify: bool,
        actor: &Actor,
    ) -> Result<StateDBResponse, ImageError> {
        let (flag_path, coat_of_arms_path) = self.fetch_and_store(state, size.unwrap_or(self.config.size), verify).await?;

        let updated = States::new(conn)
            .set_images(state.id, &flag_path, &coat_of_arms_path, actor)
            .await?;
        Ok(updated)
    }

    /// Refresh images for every selected state, in name order. Unknown ids and abbreviations are
    /// skipped. Stops at the first failure; states already processed keep their new images.
    ///
    /// A connection is only held while reading the selection and while recording each state's
    /// paths, never across a download.
    #[instrument(skip(self, pool, actor), err)]
    pub async fn sync_state_images(
        &self,
        pool: &PgPool,
        selection: &StateSelection,
        verify: bool,
        actor: &Actor,
    ) -> Result<Vec<StateDBResponse>, ImageError> {
        self.templates()?;

        let states = {
            let mut conn = pool.acquire().await?;
            let mut repo = States::new(&mut conn);
            match selection {
                StateSelection::Ids(ids) => {
                    let mut states: Vec<_> = repo.get_bulk(ids.clone()).await?.into_values().collect();
                    states.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                    states
                }
                StateSelection::Abbreviations(abbreviations) => repo.get_by_abbreviations(abbreviations).await?,
                StateSelection::All => repo.list_all().await?,
            }
        };

        let mut updated = Vec::with_capacity(states.len());
        for state in &states {
            let (flag_path, coat_of_arms_path) = self.fetch_and_store(state, self.config.size, verify).await?;

            let mut conn = pool.acquire().await?;
            let state = States::new(&mut conn)
                .set_images(state.id, &flag_path, &coat_of_arms_path, actor)
                .await?;
            updated.push(state);
        }

        info!("Updated images for {} states", updated.len());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::states::StateUpsertDBRequest;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

    fn images_config(server: &MockServer, media_root: &Path) -> ImagesConfig {
        ImagesConfig {
            media_root: media_root.to_path_buf(),
            size: 100,
            flag_url_template: Some(format!("{}/bandeiras/{{SIGLA}}.png?w={{size}}", server.uri())),
            coat_of_arms_url_template: Some(format!("{}/brasoes/{{sigla}}.png", server.uri())),
            request_timeout: Duration::from_secs(5),
        }
    }

    async fn seed_state(pool: &PgPool, id: StateId, abbreviation: &str, name: &str) -> StateDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        States::new(&mut conn)
            .upsert(&StateUpsertDBRequest {
                id,
                abbreviation: abbreviation.to_string(),
                name: name.to_string(),
                region_id: None,
                actor: None,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_render_template() {
        assert_eq!(
            render_template("https://img.example.com/{SIGLA}/{sigla}.png?w={size}", "Sp", 64),
            "https://img.example.com/SP/sp.png?w=64"
        );
    }

    #[test]
    fn test_image_paths() {
        let (flag, coat_of_arms) = image_paths("RJ");
        assert_eq!(flag, "estados/bandeiras/rj_bandeira.png");
        assert_eq!(coat_of_arms, "estados/brasoes/rj_brasao.png");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_state_images_writes_files(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bandeiras/SP.png"))
            .and(query_param("w", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"flag".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/brasoes/sp.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"coat".to_vec()))
            .mount(&server)
            .await;

        let media = tempfile::tempdir().unwrap();
        let images = StateImages::new(&images_config(&server, media.path())).unwrap();
        let state = seed_state(&pool, 35, "SP", "São Paulo").await;

        let mut conn = pool.acquire().await.unwrap();
        let updated = images
            .update_state_images(&mut conn, &state, None, true, &Some("admin".to_string()))
            .await
            .unwrap();

        assert_eq!(updated.flag_path.as_deref(), Some("estados/bandeiras/sp_bandeira.png"));
        assert_eq!(updated.coat_of_arms_path.as_deref(), Some("estados/brasoes/sp_brasao.png"));
        assert_eq!(updated.audit.updated_by.as_deref(), Some("admin"));
        assert_eq!(std::fs::read(media.path().join("estados/bandeiras/sp_bandeira.png")).unwrap(), b"flag");
        assert_eq!(std::fs::read(media.path().join("estados/brasoes/sp_brasao.png")).unwrap(), b"coat");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_failed_download_leaves_state_untouched(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bandeiras/RJ.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"flag".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/brasoes/rj.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let media = tempfile::tempdir().unwrap();
        let images = StateImages::new(&images_config(&server, media.path())).unwrap();
        let state = seed_state(&pool, 33, "RJ", "Rio de Janeiro").await;

        let mut conn = pool.acquire().await.unwrap();
        let err = images.update_state_images(&mut conn, &state, None, true, &None).await.unwrap_err();
        assert!(matches!(
            err,
            ImageError::Download {
                source: FetchError::Status { .. },
                ..
            }
        ));

        let stored = States::new(&mut conn).get_by_id(33).await.unwrap().unwrap();
        assert!(stored.flag_path.is_none());
        assert!(!media.path().join("estados/bandeiras/rj_bandeira.png").exists());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_state_images_by_abbreviation(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;

        let media = tempfile::tempdir().unwrap();
        let images = StateImages::new(&images_config(&server, media.path())).unwrap();
        seed_state(&pool, 35, "SP", "São Paulo").await;
        seed_state(&pool, 33, "RJ", "Rio de Janeiro").await;
        seed_state(&pool, 31, "MG", "Minas Gerais").await;

        let selection = StateSelection::Abbreviations(vec!["sp".to_string(), "mg".to_string(), "XX".to_string()]);
        let updated = images.sync_state_images(&pool, &selection, false, &None).await.unwrap();

        assert_eq!(updated.iter().map(|s| s.abbreviation.as_str()).collect::<Vec<_>>(), vec!["MG", "SP"]);
        assert!(media.path().join("estados/brasoes/mg_brasao.png").exists());
        assert!(!media.path().join("estados/brasoes/rj_brasao.png").exists());

        let all = images.sync_state_images(&pool, &StateSelection::All, false, &None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unconfigured_templates_rejected(pool: PgPool) {
        let media = tempfile::tempdir().unwrap();
        let config = ImagesConfig {
            media_root: media.path().to_path_buf(),
            ..ImagesConfig::default()
        };
        let images = StateImages::new(&config).unwrap();

        let err = images
            .sync_state_images(&pool, &StateSelection::Ids(vec![35]), true, &None)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::NotConfigured { field: "flag_url_template" }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_blank_abbreviation_rejected_before_download(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let media = tempfile::tempdir().unwrap();
        let images = StateImages::new(&images_config(&server, media.path())).unwrap();
        let state = seed_state(&pool, 99, "  ", "Sem Sigla").await;

        let mut conn = pool.acquire().await.unwrap();
        let err = images.update_state_images(&mut conn, &state, None, true, &None).await.unwrap_err();
        assert!(matches!(err, ImageError::MissingAbbreviation { state_id: 99 }));

        let err = images
            .sync_state_images(&pool, &StateSelection::Ids(vec![99]), true, &None)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::MissingAbbreviation { state_id: 99 }));

        assert!(!media.path().join("estados/bandeiras/_bandeira.png").exists());
        let stored = States::new(&mut conn).get_by_id(99).await.unwrap().unwrap();
        assert!(stored.flag_path.is_none());
    }

    /// Answers every image request and records how many pool connections were checked out
    /// while it was being served.
    struct RecordCheckedOut {
        pool: PgPool,
        checked_out: Arc<Mutex<Vec<usize>>>,
    }

    impl Respond for RecordCheckedOut {
        fn respond(&self, _: &wiremock::Request) -> ResponseTemplate {
            let checked_out = self.pool.size() as usize - self.pool.num_idle();
            self.checked_out.lock().unwrap().push(checked_out);
            ResponseTemplate::new(200).set_body_bytes(b"png".to_vec())
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sync_state_images_downloads_without_holding_a_connection(pool: PgPool) {
        let server = MockServer::start().await;
        let checked_out = Arc::new(Mutex::new(Vec::new()));
        Mock::given(method("GET"))
            .respond_with(RecordCheckedOut {
                pool: pool.clone(),
                checked_out: checked_out.clone(),
            })
            .mount(&server)
            .await;

        let media = tempfile::tempdir().unwrap();
        let images = StateImages::new(&images_config(&server, media.path())).unwrap();
        seed_state(&pool, 35, "SP", "São Paulo").await;
        seed_state(&pool, 33, "RJ", "Rio de Janeiro").await;

        let updated = images.sync_state_images(&pool, &StateSelection::All, false, &None).await.unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(*checked_out.lock().unwrap(), vec![0, 0, 0, 0]);
    }
}
